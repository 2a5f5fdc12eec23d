//! Application state machine and event dispatcher.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use roster_core::contact::{Category, Contact};
use strum::IntoEnumIterator;

use crate::client::{ApiClient, ContactPage, ListFilter};

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the contact list; the right pane previews the cursor contact.
  ContactList,
  /// Focus on the contact detail pane.
  ContactDetail,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  /// The page currently shown.
  pub page: ContactPage,

  /// 1-based page number requested from the server.
  pub page_no: usize,

  /// Filters applied server-side on every load.
  pub filter: ListFilter,

  /// Search text being typed (only while `search_active`).
  pub search_input: String,

  /// Whether the user is typing a search query.
  pub search_active: bool,

  /// Cursor position within `page.contacts`.
  pub list_cursor: usize,

  /// Set after `d`; the next key confirms (`y`) or cancels.
  pub pending_delete: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  /// Shared HTTP client.
  pub client: Arc<ApiClient>,
}

impl App {
  pub fn new(client: ApiClient) -> Self {
    Self {
      screen: Screen::ContactList,
      page: ContactPage::default(),
      page_no: 1,
      filter: ListFilter::default(),
      search_input: String::new(),
      search_active: false,
      list_cursor: 0,
      pending_delete: false,
      status_msg: String::new(),
      client: Arc::new(client),
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch `page_no` with the current filters.
  pub async fn load_contacts(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading contacts…".into();
    match self.client.list_contacts(&self.filter, self.page_no).await {
      Ok(page) => {
        self.page = page;
        self.list_cursor = self.list_cursor.min(self.page.contacts.len().saturating_sub(1));
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Reload from the first page, keeping the error in the status bar only.
  async fn reload_from_start(&mut self) {
    self.page_no = 1;
    self.list_cursor = 0;
    let _ = self.load_contacts().await;
  }

  /// The contact under the list cursor, if any.
  pub fn cursor_contact(&self) -> Option<&Contact> { self.page.contacts.get(self.list_cursor) }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if self.search_active {
      self.handle_search_key(key).await;
      return Ok(true);
    }

    if self.pending_delete {
      self.pending_delete = false;
      if key.code == KeyCode::Char('y') {
        self.delete_selected().await;
      } else {
        self.status_msg = "Delete cancelled".into();
      }
      return Ok(true);
    }

    match self.screen {
      Screen::ContactList => self.handle_list_key(key).await,
      Screen::ContactDetail => self.handle_detail_key(key).await,
    }
  }

  async fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.search_active = false;
        self.search_input.clear();
      }
      KeyCode::Enter => {
        self.search_active = false;
        self.filter.search = self.search_input.trim().to_string();
        self.reload_from_start().await;
      }
      KeyCode::Backspace => {
        self.search_input.pop();
      }
      KeyCode::Char(c) => self.search_input.push(c),
      _ => {}
    }
  }

  async fn handle_list_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.page.contacts.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if self.cursor_contact().is_some() {
          self.screen = Screen::ContactDetail;
        }
      }

      // Paging
      KeyCode::Char('n') => {
        if self.page_no < self.page.num_pages {
          self.page_no += 1;
          self.list_cursor = 0;
          let _ = self.load_contacts().await;
        }
      }
      KeyCode::Char('p') => {
        if self.page_no > 1 {
          self.page_no -= 1;
          self.list_cursor = 0;
          let _ = self.load_contacts().await;
        }
      }
      KeyCode::Char('r') => {
        let _ = self.load_contacts().await;
      }

      // Filters
      KeyCode::Char('/') => {
        self.search_active = true;
        self.search_input = self.filter.search.clone();
      }
      KeyCode::Char('c') => {
        self.filter.category = next_category(self.filter.category);
        self.reload_from_start().await;
      }
      KeyCode::Char('f') => {
        self.filter.favorites_only = !self.filter.favorites_only;
        self.reload_from_start().await;
      }

      // Actions on the selected contact
      KeyCode::Char('*') => self.toggle_selected().await,
      KeyCode::Char('d') => self.confirm_delete(),

      _ => {}
    }
    Ok(true)
  }

  async fn handle_detail_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::ContactList;
      }

      // Step through the page without leaving the detail view.
      KeyCode::Char(']') | KeyCode::Down | KeyCode::Char('j') => {
        if self.list_cursor + 1 < self.page.contacts.len() {
          self.list_cursor += 1;
        }
      }
      KeyCode::Char('[') | KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
      }

      KeyCode::Char('*') => self.toggle_selected().await,
      KeyCode::Char('d') => self.confirm_delete(),

      _ => {}
    }
    Ok(true)
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  async fn toggle_selected(&mut self) {
    let Some(id) = self.cursor_contact().map(|c| c.contact_id) else {
      return;
    };
    match self.client.toggle_favorite(id).await {
      Ok(is_favorite) => {
        if let Some(c) = self.page.contacts.get_mut(self.list_cursor) {
          c.is_favorite = is_favorite;
        }
        self.status_msg = if is_favorite { "Added to favorites" } else { "Removed from favorites" }.into();
        if self.filter.favorites_only && !is_favorite {
          let _ = self.load_contacts().await;
        }
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }

  fn confirm_delete(&mut self) {
    if let Some(c) = self.cursor_contact() {
      self.status_msg = format!("Delete {}? (y/n)", c.name);
      self.pending_delete = true;
    }
  }

  async fn delete_selected(&mut self) {
    let Some((id, name)) = self.cursor_contact().map(|c| (c.contact_id, c.name.clone())) else {
      return;
    };
    if let Err(e) = self.client.delete_contact(id).await {
      self.status_msg = format!("Error: {e}");
      return;
    }
    // The last contact on a later page: step back so the page still exists.
    if self.page.contacts.len() == 1 && self.page_no > 1 {
      self.page_no -= 1;
    }
    self.screen = Screen::ContactList;
    if self.load_contacts().await.is_ok() {
      self.status_msg = format!("Deleted {name}");
    }
  }
}

/// All categories, then back to no filter.
pub fn next_category(current: Option<Category>) -> Option<Category> {
  match current {
    None => Category::iter().next(),
    Some(c) => Category::iter().skip_while(|x| *x != c).nth(1),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_cycle_wraps_to_none() {
    let mut seen = Vec::new();
    let mut current = next_category(None);
    while let Some(c) = current {
      seen.push(c);
      current = next_category(current);
    }
    assert_eq!(seen, Category::iter().collect::<Vec<_>>());
  }
}
