//! TUI rendering: orchestrates all panes.

pub mod contact_detail;
pub mod contact_list;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(f.area());

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

/// Active filters, e.g. `search "smith" · Work · favorites`.
fn filter_summary(app: &App) -> String {
  let mut parts = Vec::new();
  if !app.filter.search.is_empty() {
    parts.push(format!("search \"{}\"", app.filter.search));
  }
  if let Some(c) = app.filter.category {
    parts.push(c.label().to_string());
  }
  if app.filter.favorites_only {
    parts.push("favorites".to_string());
  }
  parts.join(" · ")
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    " roster ",
    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
  );
  let filters = Span::styled(format!(" {}", filter_summary(app)), Style::default().fg(Color::Yellow));
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let used = (left.width() + filters.width() + right.width()) as u16;
  let pad = area.width.saturating_sub(used);

  let line = Line::from(vec![left, filters, Span::raw(" ".repeat(pad as usize)), right]);
  f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::DarkGray)), area);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  contact_list::draw(f, cols[0], app);
  contact_detail::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match &app.screen {
    _ if app.search_active => ("SEARCH", "Type to search  Enter apply  Esc cancel"),
    _ if app.pending_delete => ("DELETE", "y confirm  any other key cancels"),
    Screen::ContactList => (
      "NORMAL",
      "jk move  / search  c category  f favorites  * star  d delete  n/p page  r reload  q quit",
    ),
    Screen::ContactDetail => ("DETAIL", "jk next/prev  * star  d delete  Esc back  q quit"),
  };

  let status = if app.status_msg.is_empty() { hints } else { app.status_msg.as_str() };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), Style::default().fg(Color::Gray)),
  ]);
  f.render_widget(Paragraph::new(line).style(Style::default().bg(Color::Black)), area);
}
