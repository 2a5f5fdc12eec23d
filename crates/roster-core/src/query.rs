//! Typed list filters, built once at the request boundary.

use std::str::FromStr;

use crate::{Error, Result, contact::Category};

/// Parameters for [`crate::store::ContactStore::list`] and
/// [`crate::store::ContactStore::count`]. All filters combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactQuery {
  /// Case-insensitive substring matched against name, email, or phone.
  pub search:         Option<String>,
  /// Exact category match.
  pub category:       Option<Category>,
  /// Restrict to favorites.
  pub favorites_only: bool,
  /// Window over the ordered result. Ignored by `count`.
  pub limit:          Option<usize>,
  pub offset:         Option<usize>,
}

impl ContactQuery {
  /// Build a query from loosely-typed request parameters.
  ///
  /// Blank values mean "no filter". `category` is matched case-insensitively
  /// against the enum names; `favorites` accepts `true` or `false`.
  pub fn from_params(
    search: Option<&str>,
    category: Option<&str>,
    favorites: Option<&str>,
  ) -> Result<Self> {
    let search = search
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned);

    let category = match category.map(str::trim).filter(|s| !s.is_empty()) {
      None => None,
      Some(raw) => Some(Category::from_str(raw).map_err(|_| Error::InvalidFilter {
        param: "category",
        value: raw.to_owned(),
      })?),
    };

    let favorites_only = match favorites.map(str::trim).unwrap_or_default() {
      "" | "false" => false,
      "true" => true,
      other => {
        return Err(Error::InvalidFilter { param: "favorites", value: other.to_owned() });
      }
    };

    Ok(Self { search, category, favorites_only, limit: None, offset: None })
  }

  /// Restrict the result to one page. `page` is 1-based.
  pub fn page(mut self, page: usize, per_page: usize) -> Self {
    self.limit = Some(per_page);
    self.offset = Some(page.saturating_sub(1) * per_page);
    self
  }

  /// Just the first `n` results.
  pub fn take(mut self, n: usize) -> Self {
    self.limit = Some(n);
    self.offset = None;
    self
  }

  pub fn favorites() -> Self { Self { favorites_only: true, ..Self::default() } }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_params_mean_no_filter() {
    let q = ContactQuery::from_params(Some("  "), Some(""), Some("")).unwrap();
    assert_eq!(q, ContactQuery::default());
    assert_eq!(ContactQuery::from_params(None, None, None).unwrap(), ContactQuery::default());
  }

  #[test]
  fn parses_all_filters() {
    let q = ContactQuery::from_params(Some(" smith "), Some("work"), Some("true")).unwrap();
    assert_eq!(q.search.as_deref(), Some("smith"));
    assert_eq!(q.category, Some(Category::Work));
    assert!(q.favorites_only);
  }

  #[test]
  fn rejects_unknown_category() {
    let err = ContactQuery::from_params(None, Some("Colleague"), None).unwrap_err();
    assert!(matches!(err, Error::InvalidFilter { param: "category", .. }));
  }

  #[test]
  fn rejects_unknown_favorites_flag() {
    let err = ContactQuery::from_params(None, None, Some("yes")).unwrap_err();
    assert!(matches!(err, Error::InvalidFilter { param: "favorites", .. }));
    assert!(!ContactQuery::from_params(None, None, Some("false")).unwrap().favorites_only);
  }

  #[test]
  fn page_window() {
    let q = ContactQuery::default().page(3, 10);
    assert_eq!((q.limit, q.offset), (Some(10), Some(20)));
    let q = ContactQuery::default().page(0, 10);
    assert_eq!(q.offset, Some(0));
  }
}
