//! Accounts and sessions: the identities that own contacts.
//!
//! The contact store treats a [`UserId`] as an opaque owner key and never
//! inspects the account behind it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of a registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
  /// A fresh random identifier.
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn from_uuid(id: Uuid) -> Self { Self(id) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for UserId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:       UserId,
  pub username:      String,
  pub email:         String,
  pub first_name:    String,
  /// PHC string produced by argon2. Never sent to clients.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::UserStore::create_user`]. The password must
/// already be hashed; the store never sees plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub first_name:    String,
  pub password_hash: String,
}

/// A login session. Only the digest of the bearer token is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  /// Lowercase hex SHA-256 of the token handed to the client.
  pub token_hash: String,
  pub user_id:    UserId,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
