//! Frame layout: header, feed and detail panes, status bar.

pub mod feed_list;
pub mod leaderboard;
pub mod meme_detail;
pub mod rewards;
pub mod saved;

use aristhrottle_core::feed::FeedTab;
use aristhrottle_engine::NoticeLevel;
use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph},
};

use crate::app::{App, Input, Screen, View};

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

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let bold = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
  let mut left = vec![Span::styled(" aristhrottle ", bold)];

  for view in View::ALL {
    let style = if app.view == view {
      Style::default().fg(Color::White).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    } else {
      Style::default().fg(Color::Gray)
    };
    left.push(Span::styled(format!(" {} ", view.label()), style));
  }
  left.push(Span::raw(" │"));

  match app.view {
    View::Feed => {
      for (key, tab) in [('1', FeedTab::Live), ('2', FeedTab::Daily), ('3', FeedTab::All)] {
        let style = if app.filter.tab == tab {
          Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
          Style::default().fg(Color::Gray)
        };
        left.push(Span::styled(format!(" {key} {} ", tab.label()), style));
      }
      left.push(Span::styled(
        format!("  sort {}", app.sort.describe()),
        Style::default().fg(Color::Gray),
      ));
    }
    View::Leaderboard => left.push(Span::styled(
      if app.leaderboard_daily { " daily" } else { " all time" },
      Style::default().fg(Color::Gray),
    )),
    View::Saved | View::Rewards => {}
  }

  if app.new_content {
    left.push(Span::styled(
      "  ● new memes [n]",
      Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ));
  }

  let who = app
    .engine
    .viewer()
    .map_or_else(|| "signed out".to_string(), |v| v.to_string());
  let date = Local::now().format("%Y-%m-%d").to_string();
  let right = Span::styled(format!("{who}  {date} "), Style::default().fg(Color::Gray));

  let left_width: usize = left.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());
  left.push(Span::raw(" ".repeat(pad)));
  left.push(right);

  f.render_widget(
    Paragraph::new(Line::from(left)).style(Style::default().bg(Color::DarkGray)),
    area,
  );
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body(f: &mut Frame, area: Rect, app: &App) {
  if app.view == View::Rewards {
    rewards::draw(f, area, app);
    return;
  }

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
    .split(area);

  match app.view {
    View::Feed => feed_list::draw(f, cols[0], app, &app.visible()),
    View::Leaderboard => leaderboard::draw(f, cols[0], app),
    View::Saved => saved::draw(f, cols[0], app),
    View::Rewards => {}
  }

  let shown = match app.screen {
    Screen::Detail => app.selected_meme(),
    Screen::Feed => app.cursor_meme(),
  };
  match shown {
    Some(meme) => meme_detail::draw(f, cols[1], app, &meme),
    None => draw_empty_detail(f, cols[1]),
  }
}

fn draw_empty_detail(f: &mut Frame, area: Rect) {
  let block = Block::default()
    .title(" Detail ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(
    Paragraph::new("Nothing to show. Press r to refresh or c to clear filters.")
      .style(Style::default().fg(Color::DarkGray)),
    inner,
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (app.input, app.screen, app.view) {
    (Input::Search, ..) => ("SEARCH", "Type to filter  Esc cancel  Enter keep"),
    (Input::Tags, ..) => ("TAGS", "Comma-separated tags  Esc cancel  Enter apply"),
    (Input::Normal, Screen::Detail, _) => (
      "DETAIL",
      "jk next/prev  Esc back  v vote  b bookmark  s share  q quit",
    ),
    (Input::Normal, Screen::Feed, View::Feed) => (
      "FEED",
      "jk move  Enter open  v vote  b bookmark  s share  / search  # tags  u unseen  t/o sort  Tab views  q quit",
    ),
    (Input::Normal, Screen::Feed, View::Leaderboard) => (
      "LEADERBOARD",
      "jk move  Enter open  d daily/all time  b bookmark  s share  r reload  Tab views  q quit",
    ),
    (Input::Normal, Screen::Feed, View::Saved) => (
      "SAVED",
      "jk move  Enter open  b bookmark  r reload  Tab views  q quit",
    ),
    (Input::Normal, Screen::Feed, View::Rewards) => (
      "REWARDS",
      "r reload  Tab views  q quit",
    ),
  };

  let (status, style) = match &app.notice {
    Some(notice) => {
      let color = match notice.level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
      };
      (notice.message.clone(), Style::default().fg(color))
    }
    None => (hints.to_string(), Style::default().fg(Color::DarkGray)),
  };

  let line = Line::from(vec![
    Span::styled(
      format!(" {mode_label} "),
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    ),
    Span::styled(format!("  {status}"), style),
  ]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
