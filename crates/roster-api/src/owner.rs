//! The `Owner` extractor: the "login required" gate for every API handler.

use axum::{extract::FromRequestParts, http::request::Parts};
use roster_core::user::UserId;

use crate::ApiError;

/// The authenticated caller. Every contact operation is scoped to it.
///
/// Reads the [`UserId`] an upstream authentication layer stored in the request
/// extensions; rejects with [`ApiError::Unauthenticated`] when there is none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub UserId);

impl<S> FromRequestParts<S> for Owner
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<UserId>()
      .copied()
      .map(Owner)
      .ok_or(ApiError::Unauthenticated)
  }
}
