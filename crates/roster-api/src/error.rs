//! API error type and [`axum::response::IntoResponse`] implementation.

use std::collections::BTreeMap;

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use roster_core::{AsDomainError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("authentication required")]
  Unauthenticated,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// An extractor refused the request (malformed body, query or path).
  #[error("{message}")]
  Rejected { status: StatusCode, message: String },

  #[error("validation failed: {0}")]
  Validation(ValidationErrors),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a store error: domain failures map to client errors, anything
  /// else is logged and becomes a 500.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + AsDomainError + Send + Sync + 'static,
  {
    match e.as_domain() {
      Some(domain) => Self::from(domain),
      None => {
        tracing::error!(error = %e, "store error");
        ApiError::Store(Box::new(e))
      }
    }
  }
}

impl From<&roster_core::Error> for ApiError {
  fn from(e: &roster_core::Error) -> Self {
    use roster_core::Error as E;
    match e {
      E::ContactNotFound(id) => ApiError::NotFound(format!("contact {id} not found")),
      E::Validation(errors) => ApiError::Validation(errors.clone()),
      E::InvalidFilter { .. } | E::UsernameTaken(_) | E::EmailTaken(_) => {
        ApiError::BadRequest(e.to_string())
      }
    }
  }
}

impl From<roster_core::Error> for ApiError {
  fn from(e: roster_core::Error) -> Self { Self::from(&e) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Unauthenticated => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": "authentication required" })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"roster\""),
        );
        res
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response(),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Rejected { status, message } => {
        (status, Json(json!({ "error": message }))).into_response()
      }
      ApiError::Validation(errors) => {
        let mut fields: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for e in errors.iter() {
          fields.entry(e.field).or_default().push(e.message.as_str());
        }
        (
          StatusCode::UNPROCESSABLE_ENTITY,
          Json(json!({ "error": "validation failed", "fields": fields })),
        )
          .into_response()
      }
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
