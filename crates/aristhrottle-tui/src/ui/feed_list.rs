//! Feed pane — left panel.

use aristhrottle_core::meme::Meme;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Input};

/// Render the filtered feed into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, visible: &[Meme]) {
  let title = if visible.len() == app.feed.len() {
    format!(" Memes ({}/{}) ", app.feed.len(), app.total)
  } else {
    format!(" Memes ({} of {}) ", visible.len(), app.feed.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = visible.iter().map(row).collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Input bar at the bottom while typing or while a query is set.
  let bar = match app.input {
    Input::Search => Some(format!("/{}_", app.search)),
    Input::Tags => Some(format!("#{}_", app.tag_input)),
    Input::Normal if !app.search.is_empty() => Some(format!("/{}", app.search)),
    Input::Normal if !app.filter.tags.is_empty() => {
      Some(format!("#{}", app.filter.tags.join(", ")))
    }
    Input::Normal => None,
  };
  if let Some(text) = bar
    && inner_area.height > 2
  {
    let bar_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height -= 1;
    f.render_widget(
      Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
      bar_area,
    );
  }

  let mut state = ListState::default();
  state.select(if visible.is_empty() {
    None
  } else {
    Some(app.list_cursor.min(visible.len() - 1))
  });

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}

fn row(meme: &Meme) -> ListItem<'static> {
  let c = meme.counters;
  let marker = |on: bool, color: Color| {
    if on {
      Style::default().fg(color).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    }
  };

  ListItem::new(Line::from(vec![
    Span::styled(format!("▲{:<4}", c.vote_count), marker(c.has_user_voted, Color::Green)),
    Span::styled(format!("★{:<3}", c.bookmark_count), marker(c.is_bookmarked, Color::Yellow)),
    Span::raw(" "),
    Span::raw(meme.name.clone()),
  ]))
}
