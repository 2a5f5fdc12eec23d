//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width
//! and a `Z` suffix, so lexical order in SQL equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings; categories by name.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use roster_core::{
  contact::{Category, Contact},
  user::{User, UserId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_user_id(id: UserId) -> String { encode_uuid(id.as_uuid()) }

pub fn decode_user_id(s: &str) -> Result<UserId> { decode_uuid(s).map(UserId::from_uuid) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store keeps, so a value handed back
/// from a write compares equal to the same value read back later.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Category ────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str { c.label() }

pub fn decode_category(s: &str) -> Result<Category> {
  Category::from_str(s).map_err(|_| Error::Decode(format!("unknown category: {s:?}")))
}

// ─── LIKE patterns ───────────────────────────────────────────────────────────

/// Wrap `needle` for a substring `LIKE … ESCAPE '\'` match, escaping the
/// wildcard characters it may contain.
pub fn like_pattern(needle: &str) -> String {
  let mut out = String::with_capacity(needle.len() + 2);
  out.push('%');
  for c in needle.chars() {
    if matches!(c, '\\' | '%' | '_') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawContact::from_row`].
pub const CONTACT_COLUMNS: &str =
  "contact_id, owner_id, name, phone, email, address, category, is_favorite, created_at";

/// Raw values read directly from, or about to be written to, a `contacts` row.
pub struct RawContact {
  pub contact_id:  String,
  pub owner_id:    String,
  pub name:        String,
  pub phone:       String,
  pub email:       Option<String>,
  pub address:     Option<String>,
  pub category:    String,
  pub is_favorite: bool,
  pub created_at:  String,
}

impl RawContact {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:  row.get(0)?,
      owner_id:    row.get(1)?,
      name:        row.get(2)?,
      phone:       row.get(3)?,
      email:       row.get(4)?,
      address:     row.get(5)?,
      category:    row.get(6)?,
      is_favorite: row.get(7)?,
      created_at:  row.get(8)?,
    })
  }

  pub fn from_contact(c: &Contact) -> Self {
    Self {
      contact_id:  encode_uuid(c.contact_id),
      owner_id:    encode_user_id(c.owner_id),
      name:        c.name.clone(),
      phone:       c.phone.clone(),
      email:       c.email.clone(),
      address:     c.address.clone(),
      category:    encode_category(c.category).to_owned(),
      is_favorite: c.is_favorite,
      created_at:  encode_dt(c.created_at),
    }
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:  decode_uuid(&self.contact_id)?,
      owner_id:    decode_user_id(&self.owner_id)?,
      name:        self.name,
      phone:       self.phone,
      email:       self.email,
      address:     self.address,
      category:    decode_category(&self.category)?,
      is_favorite: self.is_favorite,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching the field order of [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "user_id, username, email, first_name, password_hash, created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub email:         String,
  pub first_name:    String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      email:         row.get(2)?,
      first_name:    row.get(3)?,
      password_hash: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_user_id(&self.user_id)?,
      username:      self.username,
      email:         self.email,
      first_name:    self.first_name,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
