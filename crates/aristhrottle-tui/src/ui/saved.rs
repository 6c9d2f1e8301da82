//! Saved pane — bookmarks remembered by the local cache.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Saved ({}) ", app.saved.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.saved.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new("No bookmarks yet. Press b on a meme to save it.")
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = app
    .saved
    .iter()
    .map(|hint| {
      // Prefer the live flag when the meme is loaded.
      let still_saved = app
        .engine
        .store()
        .counters(&hint.meme_id)
        .is_none_or(|c| c.is_bookmarked);
      let star = if still_saved {
        Style::default().fg(Color::Yellow)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      ListItem::new(Line::from(vec![
        Span::styled("★ ", star),
        Span::styled(
          hint.saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M  ").to_string(),
          Style::default().fg(Color::DarkGray),
        ),
        Span::raw(hint.name.clone()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.list_cursor.min(items.len() - 1)));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
