//! Identity resolution: password hashing, session tokens, and the middleware
//! that turns request credentials into an [`Identity`].
//!
//! Accepted credentials, in order of precedence:
//!
//! 1. `Authorization: Bearer <token>`: a session token from `/auth/login`.
//! 2. `Authorization: Basic <user:password>`: checked against the stored
//!    argon2 hash on every request.
//! 3. Cookie `roster_session=<token>`: the same session token.
//!
//! The middleware never rejects a request. It only attaches what it could
//! resolve; handlers decide whether an identity is required.

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, header, request::Parts},
  middleware::Next,
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD as B64, URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use roster_api::ApiError;
use roster_core::{store::UserStore, user::User};
use sha2::{Digest, Sha256};

use crate::{AppState, error::Error};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "roster_session";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
}

/// `false` for a wrong password and for an unparseable stored hash alike.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

// ─── Session tokens ──────────────────────────────────────────────────────────

/// A fresh 256-bit token, URL-safe base64 without padding.
pub fn generate_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  URL_SAFE_NO_PAD.encode(bytes)
}

/// Lowercase hex SHA-256 of `token`; the only form a token is stored in.
pub fn hash_token(token: &str) -> String { hex::encode(Sha256::digest(token.as_bytes())) }

// ─── Header parsing ──────────────────────────────────────────────────────────

/// Decode an `Authorization: Basic` value into `(username, password)`.
pub fn parse_basic(value: &str) -> Option<(String, String)> {
  let encoded = value.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded.trim()).ok()?;
  let creds   = String::from_utf8(decoded).ok()?;
  let (user, pass) = creds.split_once(':')?;
  Some((user.to_owned(), pass.to_owned()))
}

/// The value of cookie `name`, if present in any `Cookie` header.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v)
    .filter(|v| !v.is_empty())
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// The caller behind a request.
#[derive(Debug, Clone)]
pub struct Identity {
  pub user:       User,
  /// Set when the caller presented a session token rather than a password.
  pub token_hash: Option<String>,
}

impl<S> FromRequestParts<S> for Identity
where
  S: Send + Sync,
{
  type Rejection = Error;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Identity>()
      .cloned()
      .ok_or(Error::Api(ApiError::Unauthenticated))
  }
}

/// Middleware: resolve the caller and insert both the [`Identity`] and its
/// [`roster_core::user::UserId`] into the request extensions.
pub async fn resolve_identity<S>(
  State(state): State<AppState<S>>,
  mut request: Request,
  next: Next,
) -> Response
where
  S: UserStore + 'static,
{
  match identify(&state, request.headers(), Utc::now()).await {
    Ok(Some(identity)) => {
      request.extensions_mut().insert(identity.user.user_id);
      request.extensions_mut().insert(identity);
    }
    Ok(None) => {}
    Err(e) => return e.into_response(),
  }
  next.run(request).await
}

async fn identify<S>(
  state: &AppState<S>,
  headers: &HeaderMap,
  now: DateTime<Utc>,
) -> Result<Option<Identity>, Error>
where
  S: UserStore,
{
  let authorization = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());

  if let Some(token) = authorization.and_then(|v| v.strip_prefix("Bearer ")) {
    return session_identity(state, token.trim(), now).await;
  }

  if let Some((username, password)) = authorization.and_then(parse_basic) {
    let user = state
      .store
      .find_user_by_username(&username)
      .await
      .map_err(ApiError::store)?;
    return Ok(
      user
        .filter(|u| verify_password(&password, &u.password_hash))
        .map(|user| Identity { user, token_hash: None }),
    );
  }

  match cookie_value(headers, SESSION_COOKIE) {
    Some(token) => session_identity(state, token, now).await,
    None => Ok(None),
  }
}

async fn session_identity<S>(
  state: &AppState<S>,
  token: &str,
  now: DateTime<Utc>,
) -> Result<Option<Identity>, Error>
where
  S: UserStore,
{
  let token_hash = hash_token(token);
  let user = state
    .store
    .session_user(&token_hash, now)
    .await
    .map_err(ApiError::store)?;
  Ok(user.map(|user| Identity { user, token_hash: Some(token_hash) }))
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn password_hash_verifies() {
    let phc = hash_password("s3cret").unwrap();
    assert!(phc.starts_with("$argon2"));
    assert!(verify_password("s3cret", &phc));
    assert!(!verify_password("wrong", &phc));
    assert!(!verify_password("s3cret", "not-a-phc-string"));
  }

  #[test]
  fn tokens_are_unique_and_hash_stably() {
    let a = generate_token();
    let b = generate_token();
    assert_ne!(a, b);
    assert_eq!(a.len(), 43);
    assert_eq!(hash_token(&a), hash_token(&a));
    assert_eq!(hash_token(&a).len(), 64);
    assert_eq!(
      hash_token(""),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }

  #[test]
  fn basic_credentials() {
    let header = format!("Basic {}", B64.encode("alice:pa:ss"));
    assert_eq!(parse_basic(&header), Some(("alice".into(), "pa:ss".into())));
    assert_eq!(parse_basic("Basic !!!not-base64!!!"), None);
    assert_eq!(parse_basic(&format!("Basic {}", B64.encode("no-colon"))), None);
    assert_eq!(parse_basic("Bearer abc"), None);
  }

  #[test]
  fn cookie_lookup() {
    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; roster_session=tok123"));
    assert_eq!(cookie_value(&headers, SESSION_COOKIE), Some("tok123"));
    assert_eq!(cookie_value(&headers, "missing"), None);

    let mut headers = HeaderMap::new();
    headers.append(header::COOKIE, HeaderValue::from_static("roster_session="));
    assert_eq!(cookie_value(&headers, SESSION_COOKIE), None);
  }
}
