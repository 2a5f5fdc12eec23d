//! JSON REST API for Roster contacts.
//!
//! Exposes an axum [`Router`] backed by any
//! [`roster_core::store::ContactStore`]. Authentication is the caller's
//! responsibility: a layer in front of this router must insert the resolved
//! [`roster_core::user::UserId`] into the request extensions. Every handler
//! extracts it as an [`Owner`] and answers 401 without touching the store when
//! it is missing.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", roster_api::api_router(store.clone(), 10))
//! ```

pub mod contacts;
pub mod dashboard;
pub mod error;
pub mod extract;
pub mod owner;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::store::ContactStore;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use owner::Owner;

/// State shared by every API handler.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  /// Contacts per page on `GET /contacts`; at least 1.
  pub page_size: usize,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, page_size: usize) -> Self {
    Self { store, page_size: page_size.max(1) }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), page_size: self.page_size }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, page_size: usize) -> Router<()>
where
  S: ContactStore + 'static,
{
  Router::new()
    .route("/dashboard", get(dashboard::handler::<S>))
    .route("/categories", get(dashboard::categories))
    .route("/contacts", get(contacts::list::<S>).post(contacts::create::<S>))
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>)
        .put(contacts::update::<S>)
        .patch(contacts::update::<S>)
        .delete(contacts::delete_one::<S>),
    )
    .route("/contacts/{id}/toggle-favorite", post(contacts::toggle_favorite::<S>))
    .with_state(ApiState::new(store, page_size))
}
