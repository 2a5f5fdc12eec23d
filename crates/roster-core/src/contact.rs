//! Contact types: the records the store keeps on behalf of each account.
//!
//! A contact belongs to exactly one owner for its whole life. The owner and
//! `created_at` are fixed by the store at creation; callers only ever supply
//! the editable fields through [`NewContact`] and [`ContactPatch`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Result, ValidationErrors,
  user::UserId,
  validate::{self, NAME_MAX_CHARS, PHONE_MAX_CHARS},
};

// ─── Category ────────────────────────────────────────────────────────────────

/// The closed set of groupings a contact can be filed under.
///
/// The variant name doubles as the stored value, the wire value, and the
/// display label. Parsing is case-insensitive from query strings and JSON
/// bodies alike.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
#[serde(try_from = "String")]
pub enum Category {
  Family,
  Friend,
  Work,
  Emergency,
  #[default]
  Other,
}

impl Category {
  pub fn label(self) -> &'static str { self.into() }
}

impl TryFrom<String> for Category {
  type Error = String;

  fn try_from(raw: String) -> Result<Self, Self::Error> {
    raw.parse().map_err(|_| format!("unknown category `{raw}`"))
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
  pub contact_id:  Uuid,
  /// Set once from the authenticated caller; never reassigned.
  pub owner_id:    UserId,
  pub name:        String,
  pub phone:       String,
  pub email:       Option<String>,
  pub address:     Option<String>,
  pub category:    Category,
  pub is_favorite: bool,
  /// Server-assigned; never changes after creation.
  pub created_at:  DateTime<Utc>,
}

impl Contact {
  /// Apply the supplied fields of `patch` in place, then re-validate the
  /// merged record. On error `self` may be partially modified; callers work
  /// on a copy.
  pub fn apply(&mut self, patch: ContactPatch) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if let Some(name) = patch.name {
      self.name = validate::required_text(&mut errors, "name", &name, NAME_MAX_CHARS);
    }
    if let Some(phone) = patch.phone {
      self.phone = validate::required_text(&mut errors, "phone", &phone, PHONE_MAX_CHARS);
    }
    if let Some(email) = patch.email {
      self.email = validate::optional_email(&mut errors, "email", Some(&email));
    }
    if let Some(address) = patch.address {
      self.address = validate::optional_text(Some(&address));
    }
    if let Some(category) = patch.category {
      self.category = category;
    }
    if let Some(is_favorite) = patch.is_favorite {
      self.is_favorite = is_favorite;
    }

    errors.into_result()
  }
}

// ─── NewContact ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::create`].
///
/// `contact_id`, `owner_id` and `created_at` are always set by the store; they
/// are not accepted from callers. Missing `name`/`phone` deserialise as empty
/// strings so they surface as validation errors rather than decode errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewContact {
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub phone:       String,
  #[serde(default)]
  pub email:       Option<String>,
  #[serde(default)]
  pub address:     Option<String>,
  #[serde(default)]
  pub category:    Category,
  #[serde(default)]
  pub is_favorite: bool,
}

impl NewContact {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
    Self { name: name.into(), phone: phone.into(), ..Default::default() }
  }

  /// Trim every text field, collapse blank optionals to `None`, and check the
  /// field constraints. Returns the normalised input.
  pub fn validate(self) -> Result<Self> {
    let mut errors = ValidationErrors::new();
    let normalised = Self {
      name:        validate::required_text(&mut errors, "name", &self.name, NAME_MAX_CHARS),
      phone:       validate::required_text(&mut errors, "phone", &self.phone, PHONE_MAX_CHARS),
      email:       validate::optional_email(&mut errors, "email", self.email.as_deref()),
      address:     validate::optional_text(self.address.as_deref()),
      category:    self.category,
      is_favorite: self.is_favorite,
    };
    errors.into_result()?;
    Ok(normalised)
  }
}

// ─── ContactPatch ────────────────────────────────────────────────────────────

/// Input to [`crate::store::ContactStore::update`]. Only supplied fields
/// change. An empty `email` or `address` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
  pub name:        Option<String>,
  pub phone:       Option<String>,
  pub email:       Option<String>,
  pub address:     Option<String>,
  pub category:    Option<Category>,
  pub is_favorite: Option<bool>,
}

impl ContactPatch {
  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

#[cfg(test)]
mod tests {
  use std::str::FromStr;

  use chrono::Utc;
  use strum::IntoEnumIterator;

  use super::*;
  use crate::Error;

  fn sample() -> Contact {
    Contact {
      contact_id:  Uuid::new_v4(),
      owner_id:    UserId::new(),
      name:        "Jane Doe".into(),
      phone:       "555-1234".into(),
      email:       Some("jane@example.com".into()),
      address:     None,
      category:    Category::Other,
      is_favorite: false,
      created_at:  Utc::now(),
    }
  }

  #[test]
  fn category_defaults_to_other() {
    assert_eq!(Category::default(), Category::Other);
    assert_eq!(NewContact::new("a", "b").category, Category::Other);
  }

  #[test]
  fn category_parses_case_insensitively() {
    assert_eq!(Category::from_str("work").unwrap(), Category::Work);
    assert_eq!(Category::from_str("EMERGENCY").unwrap(), Category::Emergency);
    assert!(Category::from_str("colleague").is_err());
  }

  #[test]
  fn category_deserialises_case_insensitively() {
    let input: NewContact =
      serde_json::from_str(r#"{"name":"Jane","phone":"1","category":"work"}"#).unwrap();
    assert_eq!(input.category, Category::Work);
    assert_eq!(serde_json::to_string(&Category::Work).unwrap(), r#""Work""#);

    let err = serde_json::from_str::<NewContact>(r#"{"name":"J","phone":"1","category":"pal"}"#)
      .unwrap_err();
    assert!(err.to_string().contains("unknown category `pal`"), "{err}");
  }

  #[test]
  fn category_iterates_in_declaration_order() {
    let labels: Vec<_> = Category::iter().map(Category::label).collect();
    assert_eq!(labels, ["Family", "Friend", "Work", "Emergency", "Other"]);
  }

  #[test]
  fn new_contact_deserialises_with_defaults() {
    let input: NewContact =
      serde_json::from_str(r#"{"name":"Jane Doe","phone":"555-1234"}"#).unwrap();
    assert_eq!(input.category, Category::Other);
    assert!(!input.is_favorite);
    assert_eq!(input.email, None);
  }

  #[test]
  fn validate_normalises_fields() {
    let input = NewContact {
      name: "  Jane Doe ".into(),
      phone: " 555-1234".into(),
      email: Some("".into()),
      address: Some("  1 Main St  ".into()),
      ..Default::default()
    };
    let out = input.validate().unwrap();
    assert_eq!(out.name, "Jane Doe");
    assert_eq!(out.phone, "555-1234");
    assert_eq!(out.email, None);
    assert_eq!(out.address.as_deref(), Some("1 Main St"));
  }

  #[test]
  fn validate_reports_every_bad_field() {
    let input = NewContact {
      name: String::new(),
      phone: "1".repeat(21),
      email: Some("not-an-email".into()),
      ..Default::default()
    };
    match input.validate() {
      Err(Error::Validation(errors)) => {
        assert!(errors.has("name"));
        assert!(errors.has("phone"));
        assert!(errors.has("email"));
      }
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn apply_changes_only_supplied_fields() {
    let mut c = sample();
    let before = c.clone();
    c.apply(ContactPatch { category: Some(Category::Work), ..Default::default() })
      .unwrap();
    assert_eq!(c.category, Category::Work);
    assert_eq!(c.name, before.name);
    assert_eq!(c.email, before.email);
    assert_eq!(c.created_at, before.created_at);
  }

  #[test]
  fn apply_empty_email_clears_it() {
    let mut c = sample();
    c.apply(ContactPatch { email: Some(String::new()), ..Default::default() })
      .unwrap();
    assert_eq!(c.email, None);
  }

  #[test]
  fn apply_revalidates_changed_fields() {
    let mut c = sample();
    let err = c
      .apply(ContactPatch { name: Some("   ".into()), ..Default::default() })
      .unwrap_err();
    assert!(matches!(err, Error::Validation(ref e) if e.has("name")));
  }
}
