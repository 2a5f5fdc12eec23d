//! Handlers for `/contacts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/contacts` | `?search`, `?category`, `?favorites=true`, `?page` |
//! | `POST`   | `/contacts` | Body: [`NewContact`]; returns 201 + stored contact |
//! | `GET`    | `/contacts/{id}` | 404 if missing or owned by someone else |
//! | `PUT` / `PATCH` | `/contacts/{id}` | Body: [`ContactPatch`]; partial update |
//! | `DELETE` | `/contacts/{id}` | 204 |
//! | `POST`   | `/contacts/{id}/toggle-favorite` | JSON or 303 redirect, see [`toggle_favorite`] |

use axum::{
  Json,
  extract::{OriginalUri, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Redirect, Response},
};
use roster_core::{
  contact::{Contact, ContactPatch, NewContact},
  query::ContactQuery,
  store::ContactStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ApiJson, ApiPath, ApiQuery, ApiState, Owner, error::ApiError};

// ─── List ────────────────────────────────────────────────────────────────────

/// Raw query string; parsed into a [`ContactQuery`] before the store sees it.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub search:    Option<String>,
  pub category:  Option<String>,
  pub favorites: Option<String>,
  /// 1-based; defaults to the first page.
  pub page:      Option<usize>,
}

/// One page of contacts plus what a client needs to render pagination.
#[derive(Debug, Serialize, Deserialize)]
pub struct ContactPage {
  pub contacts:  Vec<Contact>,
  pub page:      usize,
  pub per_page:  usize,
  pub total:     usize,
  pub num_pages: usize,
}

/// `GET /contacts[?search=...][&category=...][&favorites=true][&page=N]`
///
/// The first page always exists (it may be empty); any other page past the
/// end is a 404.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiQuery(params): ApiQuery<ListParams>,
) -> Result<Json<ContactPage>, ApiError>
where
  S: ContactStore,
{
  let query = ContactQuery::from_params(
    params.search.as_deref(),
    params.category.as_deref(),
    params.favorites.as_deref(),
  )?;

  let per_page  = state.page_size;
  let page      = params.page.unwrap_or(1);
  let total     = state.store.count(owner, &query).await.map_err(ApiError::store)?;
  let num_pages = total.div_ceil(per_page).max(1);

  if page == 0 || page > num_pages {
    return Err(ApiError::NotFound(format!("page {page} does not exist")));
  }

  let contacts = state
    .store
    .list(owner, &query.page(page, per_page))
    .await
    .map_err(ApiError::store)?;

  Ok(Json(ContactPage { contacts, page, per_page, total, num_pages }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /contacts`: returns 201 + the stored [`Contact`].
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiJson(body): ApiJson<NewContact>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ContactStore,
{
  let contact = state.store.create(owner, body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(contact)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /contacts/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
{
  let contact = state.store.get(owner, id).await.map_err(ApiError::store)?;
  Ok(Json(contact))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT|PATCH /contacts/{id}`: only the supplied fields change.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiPath(id): ApiPath<Uuid>,
  ApiJson(patch): ApiJson<ContactPatch>,
) -> Result<Json<Contact>, ApiError>
where
  S: ContactStore,
{
  let contact = state.store.update(owner, id, patch).await.map_err(ApiError::store)?;
  Ok(Json(contact))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /contacts/{id}`
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: ContactStore,
{
  state.store.delete(owner, id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Toggle favorite ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct FavoriteState {
  pub is_favorite: bool,
}

/// `POST /contacts/{id}/toggle-favorite`
///
/// Script callers (`X-Requested-With: XMLHttpRequest` or an `Accept` header
/// naming `application/json`) get `{"is_favorite": bool}`. Anything else is a
/// plain navigation and is sent back to the contact list with a 303.
pub async fn toggle_favorite<S>(
  State(state): State<ApiState<S>>,
  Owner(owner): Owner,
  ApiPath(id): ApiPath<Uuid>,
  OriginalUri(uri): OriginalUri,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: ContactStore,
{
  let is_favorite = state
    .store
    .toggle_favorite(owner, id)
    .await
    .map_err(ApiError::store)?;

  if wants_json(&headers) {
    Ok(Json(FavoriteState { is_favorite }).into_response())
  } else {
    Ok(Redirect::to(contact_list_path(uri.path())).into_response())
  }
}

fn wants_json(headers: &HeaderMap) -> bool {
  let header_str = |name| headers.get(name).and_then(|v| v.to_str().ok());

  header_str(header::HeaderName::from_static("x-requested-with"))
    .is_some_and(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
    || header_str(header::ACCEPT).is_some_and(|v| v.contains("application/json"))
}

/// `/prefix/contacts/{id}/toggle-favorite` → `/prefix/contacts`, so the
/// redirect works wherever the router is nested.
fn contact_list_path(path: &str) -> &str {
  path
    .trim_end_matches('/')
    .rsplitn(3, '/')
    .nth(2)
    .filter(|p| !p.is_empty())
    .unwrap_or("/")
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  #[test]
  fn list_path_strips_id_and_action() {
    assert_eq!(contact_list_path("/api/contacts/abc/toggle-favorite"), "/api/contacts");
    assert_eq!(contact_list_path("/contacts/abc/toggle-favorite/"), "/contacts");
    assert_eq!(contact_list_path("/toggle-favorite"), "/");
  }

  #[test]
  fn json_preference_from_headers() {
    let mut h = HeaderMap::new();
    assert!(!wants_json(&h));

    h.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
    assert!(wants_json(&h));

    let mut h = HeaderMap::new();
    h.insert(header::ACCEPT, HeaderValue::from_static("application/json, text/plain"));
    assert!(wants_json(&h));

    let mut h = HeaderMap::new();
    h.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
    assert!(!wants_json(&h));
  }
}
