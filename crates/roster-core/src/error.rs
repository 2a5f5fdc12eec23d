//! Error types for `roster-core`.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("invalid value for `{param}`: {value:?}")]
  InvalidFilter { param: &'static str, value: String },

  #[error("Username already exists")]
  UsernameTaken(String),

  #[error("Email already exists")]
  EmailTaken(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Field-level validation errors ───────────────────────────────────────────

/// A single rejected field and the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

/// Every problem found while validating one input, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
    self.0.push(FieldError { field, message: message.into() });
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = &FieldError> { self.0.iter() }

  /// True if at least one error was recorded against `field`.
  pub fn has(&self, field: &str) -> bool {
    self.0.iter().any(|e| e.field == field)
  }

  /// `Ok(())` when nothing was recorded, otherwise [`Error::Validation`].
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() {
      Ok(())
    } else {
      Err(Error::Validation(self))
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, e) in self.0.iter().enumerate() {
      if i > 0 {
        f.write_str("; ")?;
      }
      write!(f, "{}: {}", e.field, e.message)?;
    }
    Ok(())
  }
}

// ─── Backend error classification ────────────────────────────────────────────

/// Implemented by storage backend errors so HTTP layers can recognise domain
/// failures (not found, validation, conflicts) without knowing the backend.
pub trait AsDomainError {
  /// The wrapped domain error, if this is one.
  fn as_domain(&self) -> Option<&Error>;
}

impl AsDomainError for Error {
  fn as_domain(&self) -> Option<&Error> { Some(self) }
}
