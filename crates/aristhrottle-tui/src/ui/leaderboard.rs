//! Leaderboard pane — left panel, ranked memes.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let window = if app.leaderboard_daily { "daily" } else { "all time" };
  let block = Block::default()
    .title(format!(" Leaderboard, {window} ({}) ", app.leaderboard.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let items: Vec<ListItem> = app
    .leaderboard
    .iter()
    .map(|entry| {
      let medal = match entry.rank {
        1 => Color::Yellow,
        2 => Color::White,
        3 => Color::LightRed,
        _ => Color::Gray,
      };
      let percentile = entry
        .meme
        .in_percentile
        .map(|p| format!("{p:>5.1}%"))
        .unwrap_or_else(|| "     -".into());
      ListItem::new(Line::from(vec![
        Span::styled(
          format!("#{:<4}", entry.rank),
          Style::default().fg(medal).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
          format!("▲{:<5}", entry.meme.counters.vote_count),
          Style::default().fg(Color::Green),
        ),
        Span::styled(percentile, Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::raw(entry.meme.name.clone()),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(if items.is_empty() {
    None
  } else {
    Some(app.list_cursor.min(items.len() - 1))
  });

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
