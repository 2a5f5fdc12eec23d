//! The storage traits and their shared error contract.
//!
//! Traits are implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers (`roster-api`, `roster-server`) depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  AsDomainError,
  contact::{Contact, ContactPatch, NewContact},
  query::ContactQuery,
  user::{NewUser, Session, User, UserId},
};

// ─── Base ────────────────────────────────────────────────────────────────────

/// Common supertrait carrying the backend's error type, so a backend that
/// implements both [`ContactStore`] and [`UserStore`] has one unambiguous
/// `S::Error`.
pub trait Store: Send + Sync {
  /// Domain failures (not found, validation, conflicts) must be reachable
  /// through [`AsDomainError`].
  type Error: std::error::Error + AsDomainError + Send + Sync + 'static;
}

// ─── Contacts ────────────────────────────────────────────────────────────────

/// Owner-scoped storage of contact records.
///
/// Every method takes the requesting owner. A contact whose owner differs is
/// indistinguishable from one that does not exist: both fail with
/// [`crate::Error::ContactNotFound`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Store {
  /// Validate `input` and persist a new contact for `owner`. The id and
  /// `created_at` are assigned by the store.
  fn create(
    &self,
    owner: UserId,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Fetch one contact.
  fn get(
    &self,
    owner: UserId,
    id: Uuid,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Contacts of `owner` matching `query`, newest first.
  fn list<'a>(
    &'a self,
    owner: UserId,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<Vec<Contact>, Self::Error>> + Send + 'a;

  /// Number of contacts of `owner` matching `query`'s filters. `limit` and
  /// `offset` are ignored.
  fn count<'a>(
    &'a self,
    owner: UserId,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Apply `patch` and return the updated contact. The merged record is
  /// re-validated; nothing is written if validation fails.
  fn update(
    &self,
    owner: UserId,
    id: Uuid,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  /// Permanently remove a contact.
  fn delete(
    &self,
    owner: UserId,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Flip `is_favorite` and return the new value.
  fn toggle_favorite(
    &self,
    owner: UserId,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// Storage of accounts and login sessions.
pub trait UserStore: Store {
  /// Persist a new account. Fails with [`crate::Error::UsernameTaken`] or
  /// [`crate::Error::EmailTaken`] (checked in that order).
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn create_session(
    &self,
    session: Session,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// The account owning the session with `token_hash`, if that session has
  /// not expired at `now`.
  fn session_user<'a>(
    &'a self,
    token_hash: &'a str,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Remove a session. Removing an unknown session is not an error.
  fn delete_session<'a>(
    &'a self,
    token_hash: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete every session expired at `now`; returns how many were removed.
  fn purge_expired_sessions(
    &self,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
