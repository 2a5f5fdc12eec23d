//! Account overview and the category catalogue.

use axum::{Json, extract::State};
use roster_core::{contact::{Category, Contact}, query::ContactQuery, store::ContactStore};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{ApiState, Owner, error::ApiError};

/// Number of entries in [`Dashboard::recent_contacts`].
pub const RECENT_CONTACTS: usize = 5;

#[derive(Debug, Serialize, Deserialize)]
pub struct Dashboard {
  pub total_contacts:    usize,
  pub favorite_count:    usize,
  /// Newest first.
  pub recent_contacts:   Vec<Contact>,
  pub favorite_contacts: Vec<Contact>,
}

/// `GET /dashboard`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
) -> Result<Json<Dashboard>, ApiError>
where
  S: ContactStore,
{
  let all       = ContactQuery::default();
  let favorites = ContactQuery::favorites();
  let recent    = ContactQuery::default().take(RECENT_CONTACTS);

  let total_contacts = state.store.count(owner, &all).await.map_err(ApiError::store)?;
  let favorite_contacts =
    state.store.list(owner, &favorites).await.map_err(ApiError::store)?;
  let recent_contacts = state.store.list(owner, &recent).await.map_err(ApiError::store)?;

  Ok(Json(Dashboard {
    total_contacts,
    favorite_count: favorite_contacts.len(),
    recent_contacts,
    favorite_contacts,
  }))
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntry {
  pub value: String,
  pub label: String,
}

/// `GET /categories`: every [`Category`] in declaration order.
pub async fn categories(Owner(_): Owner) -> Json<Vec<CategoryEntry>> {
  Json(
    Category::iter()
      .map(|c| CategoryEntry { value: c.as_ref().to_owned(), label: c.label().to_owned() })
      .collect(),
  )
}
