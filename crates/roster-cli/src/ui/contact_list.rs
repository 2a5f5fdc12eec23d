//! Contact list pane: left panel.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Screen};

/// Render the contact list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let page = &app.page;
  let title = format!(
    " Contacts ({}) · page {}/{} ",
    page.total,
    app.page_no,
    page.num_pages.max(1)
  );

  let border = if app.screen == Screen::ContactList { Color::Cyan } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Search bar on the last inner row while typing or when a search is applied.
  let search_text = if app.search_active {
    Some(format!("/{}_", app.search_input))
  } else if !app.filter.search.is_empty() {
    Some(format!("/{}", app.filter.search))
  } else {
    None
  };
  if let Some(text) = search_text
    && inner_area.height > 2
  {
    let bar = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;
    f.render_widget(Paragraph::new(text).style(Style::default().fg(Color::Yellow)), bar);
  }

  if page.contacts.is_empty() {
    f.render_widget(
      Paragraph::new("No contacts found.").style(Style::default().fg(Color::DarkGray)),
      inner_area,
    );
    return;
  }

  let items: Vec<ListItem> = page
    .contacts
    .iter()
    .map(|c| {
      let star = if c.is_favorite { "★ " } else { "  " };
      ListItem::new(Line::from(vec![
        Span::styled(star, Style::default().fg(Color::Yellow)),
        Span::raw(c.name.clone()),
        Span::styled(format!("  {}", c.phone), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
