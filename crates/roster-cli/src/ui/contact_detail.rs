//! Contact detail pane: right panel.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use roster_core::contact::Contact;

use crate::app::{App, Screen};

/// Render the contact under the cursor into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let contact = app.cursor_contact();

  let title = contact.map_or_else(|| " Detail ".to_string(), |c| format!(" {} ", c.name));
  let border = if app.screen == Screen::ContactDetail { Color::Cyan } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let inner = block.inner(area);
  f.render_widget(block, area);

  let Some(contact) = contact else {
    f.render_widget(
      Paragraph::new("Select a contact.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  };

  f.render_widget(Paragraph::new(detail_lines(contact)).wrap(Wrap { trim: false }), inner);
}

fn detail_lines(c: &Contact) -> Vec<Line<'static>> {
  let created = c.created_at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
  let favorite = if c.is_favorite { "★ yes" } else { "no" };

  [
    ("phone", c.phone.clone()),
    ("email", c.email.clone().unwrap_or_else(|| "—".into())),
    ("address", c.address.clone().unwrap_or_else(|| "—".into())),
    ("category", c.category.label().to_string()),
    ("favorite", favorite.to_string()),
    ("added", created),
  ]
  .into_iter()
  .map(|(label, value)| {
    Line::from(vec![
      Span::styled(
        format!("{label:<10}"),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
      ),
      Span::raw(value),
    ])
  })
  .collect()
}
