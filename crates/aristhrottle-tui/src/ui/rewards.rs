//! Rewards pane — milestone ladders of the signed-in user.

use aristhrottle_core::milestones::{Progress, TierState};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

const BAR_WIDTH: usize = 24;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(" Rewards ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut lines = Vec::new();
  if app.rewards.is_empty() {
    lines.push(Line::styled(
      "No reward data. Sign in and press r to load it.",
      Style::default().fg(Color::DarkGray),
    ));
  }

  for summary in &app.rewards {
    lines.push(Line::styled(
      summary.track.label(),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    for progress in summary.ladders() {
      lines.extend(ladder(&progress));
    }
    lines.push(Line::from(""));
  }

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
    area,
  );
}

fn ladder(progress: &Progress) -> [Line<'static>; 2] {
  let filled = (progress.ratio() * BAR_WIDTH as f64).round() as usize;
  let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH)));

  let next = match (progress.next(), progress.remaining()) {
    (Some(tier), Some(left)) => {
      format!("  next {} (+{}) in {left}", tier.threshold, tier.reward)
    }
    _ => "  complete".to_string(),
  };

  let summary = Line::from(vec![
    Span::raw(format!("  {:<18}", progress.kind.label())),
    Span::styled(format!("{:>5} ", progress.count), Style::default().add_modifier(Modifier::BOLD)),
    Span::styled(bar, Style::default().fg(Color::Blue)),
    Span::styled(next, Style::default().fg(Color::Gray)),
  ]);

  let mut rungs = vec![Span::raw("    ")];
  for status in &progress.tiers {
    let (mark, style) = match status.state {
      TierState::Claimed => ("✓", Style::default().fg(Color::Green)),
      TierState::Reached => ("●", Style::default().fg(Color::Yellow)),
      TierState::Locked => ("○", Style::default().fg(Color::DarkGray)),
    };
    rungs.push(Span::styled(
      format!("{mark} {}→{}  ", status.tier.threshold, status.tier.reward),
      style,
    ));
  }
  let unclaimed = progress.unclaimed_reward();
  if unclaimed > 0 {
    rungs.push(Span::styled(
      format!("{unclaimed} to claim"),
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
  }

  [summary, Line::from(rungs)]
}
