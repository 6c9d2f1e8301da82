//! Meme detail pane — right panel.

use aristhrottle_core::{
  engagement::{Action, Phase},
  meme::Meme,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

/// Render `meme` into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App, meme: &Meme) {
  let block = Block::default()
    .title(format!(" {} ", meme.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let label = |s: &str| {
    Span::styled(
      format!("{s:<12}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
  };
  let dim = Style::default().fg(Color::DarkGray);

  let creator = meme
    .owner
    .username
    .clone()
    .unwrap_or_else(|| meme.owner.id.to_string());
  let own = app.engine.viewer().is_some_and(|v| meme.is_owned_by(v));

  let mut lines = vec![
    Line::from(vec![
      label("Creator"),
      Span::raw(creator),
      Span::styled(if own { "  (you)" } else { "" }, dim),
    ]),
    Line::from(vec![
      label("Created"),
      Span::raw(meme.created_at.format("%Y-%m-%d %H:%M UTC").to_string()),
    ]),
    Line::from(vec![label("Image"), Span::styled(meme.image_url.clone(), dim)]),
  ];

  if let Some(p) = meme.in_percentile {
    lines.push(Line::from(vec![label("Percentile"), Span::raw(format!("{p:.1}"))]));
  }
  if meme.is_onchain {
    lines.push(Line::from(vec![label("On chain"), Span::raw("yes")]));
  }

  lines.push(Line::from(""));

  let c = meme.counters;
  for (action, count, active, verb) in [
    (Action::Vote, c.vote_count, c.has_user_voted, "voted"),
    (Action::Bookmark, c.bookmark_count, c.is_bookmarked, "bookmarked"),
    (Action::Share, c.share_count, false, ""),
  ] {
    let mut spans = vec![
      label(match action {
        Action::Vote => "Votes",
        Action::Bookmark => "Bookmarks",
        Action::Share => "Shares",
      }),
      Span::raw(count.to_string()),
    ];
    if active {
      spans.push(Span::styled(
        format!("  ✓ {verb}"),
        Style::default().fg(Color::Green),
      ));
    }
    if app.engine.phase(&meme.id, action) == Phase::Optimistic {
      spans.push(Span::styled("  …", Style::default().fg(Color::Yellow)));
    }
    lines.push(Line::from(spans));
  }

  if !meme.tags.is_empty() {
    lines.push(Line::from(""));
    let tags = meme.tag_names().collect::<Vec<_>>().join(", ");
    lines.push(Line::from(vec![label("Tags"), Span::raw(tags)]));
  }

  let is_selected = app.selected.as_ref() == Some(&meme.id);
  if is_selected && !app.related.is_empty() {
    let related = app
      .related
      .iter()
      .map(|(name, n)| format!("{name} ({n})"))
      .collect::<Vec<_>>()
      .join(", ");
    lines.push(Line::from(vec![label("Related"), Span::styled(related, dim)]));
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}
