//! Async HTTP client wrapping the roster JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response, header};
use roster_core::contact::{Category, Contact};
use serde::Deserialize;
use uuid::Uuid;

/// Connection settings for the roster API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

/// One page of `GET /api/contacts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactPage {
  pub contacts:  Vec<Contact>,
  pub page:      usize,
  pub per_page:  usize,
  pub total:     usize,
  pub num_pages: usize,
}

/// Server-side list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
  pub search:         String,
  pub category:       Option<Category>,
  pub favorites_only: bool,
}

impl ListFilter {
  fn query_pairs(&self, page: usize) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("page", page.to_string())];
    if !self.search.is_empty() {
      pairs.push(("search", self.search.clone()));
    }
    if let Some(category) = self.category {
      pairs.push(("category", category.to_string()));
    }
    if self.favorites_only {
      pairs.push(("favorites", "true".to_string()));
    }
    pairs
  }
}

#[derive(Deserialize)]
struct FavoriteState {
  is_favorite: bool,
}

/// Async HTTP client for the roster JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  /// `GET /api/contacts?page=N[&search=..][&category=..][&favorites=true]`
  pub async fn list_contacts(&self, filter: &ListFilter, page: usize) -> Result<ContactPage> {
    let resp = self
      .auth(self.client.get(self.url("/contacts")))
      .query(&filter.query_pairs(page))
      .send()
      .await
      .context("GET /contacts failed")?;

    let resp = ensure_success(resp, "GET /contacts").await?;
    resp.json().await.context("deserialising contact page")
  }

  /// `POST /api/contacts/{id}/toggle-favorite`: returns the new state.
  pub async fn toggle_favorite(&self, id: Uuid) -> Result<bool> {
    let resp = self
      .auth(self.client.post(self.url(&format!("/contacts/{id}/toggle-favorite"))))
      .header(header::ACCEPT, "application/json")
      .send()
      .await
      .context("POST toggle-favorite failed")?;

    let resp = ensure_success(resp, "POST toggle-favorite").await?;
    let state: FavoriteState = resp.json().await.context("deserialising favorite state")?;
    Ok(state.is_favorite)
  }

  /// `DELETE /api/contacts/{id}`
  pub async fn delete_contact(&self, id: Uuid) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.url(&format!("/contacts/{id}"))))
      .send()
      .await
      .context("DELETE /contacts failed")?;

    ensure_success(resp, "DELETE /contacts").await?;
    Ok(())
  }
}

/// Turn a non-2xx response into an error carrying the server's message.
async fn ensure_success(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let message = resp
    .json::<serde_json::Value>()
    .await
    .ok()
    .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(str::to_owned))
    .unwrap_or_default();
  Err(anyhow!("{what} → {status} {message}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn query_pairs_skip_empty_filters() {
    let pairs = ListFilter::default().query_pairs(1);
    assert_eq!(pairs, vec![("page", "1".to_string())]);

    let filter = ListFilter {
      search:         "smith".into(),
      category:       Some(Category::Work),
      favorites_only: true,
    };
    let pairs = filter.query_pairs(3);
    assert!(pairs.contains(&("search", "smith".to_string())));
    assert!(pairs.contains(&("category", "Work".to_string())));
    assert!(pairs.contains(&("favorites", "true".to_string())));
  }
}
