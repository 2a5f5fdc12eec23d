//! Handlers for `/auth` endpoints: registration, login, logout.

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use roster_api::{ApiError, ApiJson};
use roster_core::{
  ValidationErrors,
  store::UserStore,
  user::{NewUser, Session, User},
  validate,
};
use serde::{Deserialize, Serialize};

use crate::{
  AppState, ServerConfig,
  auth::{Identity, SESSION_COOKIE, generate_token, hash_password, hash_token, verify_password},
  error::Error,
};

// ─── Register ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegisterForm {
  pub username:         String,
  pub first_name:       String,
  pub email:            String,
  pub password:         String,
  pub confirm_password: String,
}

/// `POST /auth/register`: returns 201 + the new [`User`].
pub async fn register<S>(
  State(state): State<AppState<S>>,
  ApiJson(form): ApiJson<RegisterForm>,
) -> Result<impl IntoResponse, Error>
where
  S: UserStore,
{
  let input = validate_registration(form)?;
  let user = state.store.create_user(input).await.map_err(ApiError::store)?;
  tracing::info!(username = %user.username, "account registered");
  Ok((StatusCode::CREATED, Json(user)))
}

/// Check a registration form and hash its password.
pub fn validate_registration(form: RegisterForm) -> Result<NewUser, Error> {
  let required = [&form.username, &form.email, &form.password, &form.confirm_password];
  if required.iter().any(|v| v.trim().is_empty()) {
    return Err(Error::bad_request("All fields are required"));
  }
  if form.password != form.confirm_password {
    return Err(Error::bad_request("Passwords do not match"));
  }

  let mut errors = ValidationErrors::new();
  let username   = validate::username(&mut errors, "username", &form.username);
  let email      = validate::required_email(&mut errors, "email", &form.email);
  let first_name = validate::optional_text(Some(&form.first_name)).unwrap_or_default();
  if first_name.chars().count() > validate::USERNAME_MAX_CHARS {
    errors.add(
      "first_name",
      format!("Ensure this value has at most {} characters.", validate::USERNAME_MAX_CHARS),
    );
  }
  errors.into_result()?;

  Ok(NewUser { username, email, first_name, password_hash: hash_password(&form.password)? })
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub user:       User,
}

/// `POST /auth/login`: issues a session token, also set as a cookie.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(form): ApiJson<LoginForm>,
) -> Result<Response, Error>
where
  S: UserStore,
{
  let user = state
    .store
    .find_user_by_username(&form.username)
    .await
    .map_err(ApiError::store)?
    .filter(|u| verify_password(&form.password, &u.password_hash));

  let Some(user) = user else {
    tracing::warn!(username = %form.username, "login failed");
    return Err(Error::InvalidCredentials);
  };

  let now = Utc::now();
  let purged = state.store.purge_expired_sessions(now).await.map_err(ApiError::store)?;
  if purged > 0 {
    tracing::debug!(purged, "removed expired sessions");
  }

  let ttl   = state.config.session_ttl()?;
  let token = generate_token();
  let session = Session {
    token_hash: hash_token(&token),
    user_id:    user.user_id,
    created_at: now,
    expires_at: now + ttl,
  };
  let expires_at = session.expires_at;
  state.store.create_session(session).await.map_err(ApiError::store)?;
  tracing::info!(username = %user.username, "logged in");

  let cookie = session_cookie(&state.config, &token, ttl.num_seconds());
  Ok(
    (
      [(header::SET_COOKIE, cookie)],
      Json(LoginResponse { token, expires_at, user }),
    )
      .into_response(),
  )
}

// ─── Logout ──────────────────────────────────────────────────────────────────

/// `POST /auth/logout`: ends the presented session and clears the cookie.
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  identity: Identity,
) -> Result<Response, Error>
where
  S: UserStore,
{
  if let Some(token_hash) = &identity.token_hash {
    state.store.delete_session(token_hash).await.map_err(ApiError::store)?;
  }
  tracing::info!(username = %identity.user.username, "logged out");

  let cookie = session_cookie(&state.config, "", 0);
  Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response())
}

// ─── Me ──────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me(identity: Identity) -> Json<User> { Json(identity.user) }

fn session_cookie(config: &ServerConfig, token: &str, max_age: i64) -> String {
  let secure = if config.secure_cookies { "; Secure" } else { "" };
  format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}{secure}")
}
