//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use roster_api::ApiError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Login with an unknown username or a wrong password.
  #[error("Invalid username or password")]
  InvalidCredentials,

  #[error("invalid configuration: {0}")]
  Config(String),

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error(transparent)]
  Api(#[from] ApiError),
}

impl Error {
  pub fn bad_request(msg: impl Into<String>) -> Self {
    Error::Api(ApiError::BadRequest(msg.into()))
  }
}

impl From<roster_core::Error> for Error {
  fn from(e: roster_core::Error) -> Self { Error::Api(e.into()) }
}

impl From<argon2::password_hash::Error> for Error {
  fn from(e: argon2::password_hash::Error) -> Self { Error::Hash(e.to_string()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::InvalidCredentials => (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "Invalid username or password" })),
      )
        .into_response(),
      Error::Hash(msg) => {
        tracing::error!(error = %msg, "password hashing failed");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
      }
      Error::Config(msg) => {
        tracing::error!(error = %msg, "invalid configuration");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": msg }))).into_response()
      }
      Error::Api(e) => e.into_response(),
    }
  }
}
