//! HTTP server for Roster: accounts, sessions, and the contact API.
//!
//! Mounts the `/auth` endpoints defined here and the [`roster_api`] router
//! under `/api`, behind a middleware that resolves the caller's identity.

pub mod account;
pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router, middleware,
  routing::{get, post},
};
use roster_core::store::{ContactStore, UserStore};
use chrono::Duration;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Contacts per page on `GET /api/contacts`.
  pub page_size:         usize,
  /// Between 1 and [`MAX_SESSION_TTL_HOURS`].
  pub session_ttl_hours: i64,
  /// Mark the session cookie `Secure`; enable when served over HTTPS.
  pub secure_cookies:    bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "127.0.0.1".to_string(),
      port:              8000,
      store_path:        PathBuf::from("roster.db"),
      page_size:         10,
      session_ttl_hours: 24 * 14,
      secure_cookies:    false,
    }
  }
}

/// Ten years.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

impl ServerConfig {
  /// Lifetime of a login session, rejecting values outside
  /// `1..=MAX_SESSION_TTL_HOURS`.
  pub fn session_ttl(&self) -> Result<Duration, Error> {
    match self.session_ttl_hours {
      hours @ 1..=MAX_SESSION_TTL_HOURS => Ok(Duration::hours(hours)),
      hours => Err(Error::Config(format!(
        "session_ttl_hours must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
      ))),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the `/auth` handlers and the identity layer.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: ContactStore + UserStore + 'static,
{
  let auth_routes = Router::new()
    .route("/register", post(account::register::<S>))
    .route("/login",    post(account::login::<S>))
    .route("/logout",   post(account::logout::<S>))
    .route("/me",       get(account::me))
    .with_state(state.clone());

  let api_routes = roster_api::api_router(Arc::clone(&state.store), state.config.page_size);

  Router::new()
    .nest("/auth", auth_routes)
    .nest("/api", api_routes)
    .layer(middleware::from_fn_with_state(state, auth::resolve_identity::<S>))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────
