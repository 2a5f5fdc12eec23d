//! Error type for `roster-store-sqlite`.

use roster_core::AsDomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value outside the domain enum it encodes.
  #[error("decode error: {0}")]
  Decode(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl AsDomainError for Error {
  fn as_domain(&self) -> Option<&roster_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}
