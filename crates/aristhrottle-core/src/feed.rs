//! Local filtering and sorting over an already-fetched feed.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::meme::{Meme, UserId};

// ─── Tabs ────────────────────────────────────────────────────────────────────

/// Which slice of time the feed shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedTab {
  /// Memes created today (UTC).
  Live,
  /// The voting day that closed at 18:00 UTC today.
  Daily,
  #[default]
  All,
}

/// Hour (UTC) at which a voting day closes.
const DAILY_CUTOFF_HOUR: u32 = 18;

impl FeedTab {
  /// The half-open creation window `[start, end)` for this tab at `now`, or
  /// `None` when the tab is unbounded.
  pub fn window(self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.date_naive();
    match self {
      Self::Live => {
        let start = today.and_hms_opt(0, 0, 0)?.and_utc();
        Some((start, start + Duration::days(1)))
      }
      Self::Daily => {
        let end = today
          .and_hms_opt(DAILY_CUTOFF_HOUR, 0, 0)?
          .and_utc();
        Some((end - Duration::days(1), end))
      }
      Self::All => None,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Live => "Live",
      Self::Daily => "Daily",
      Self::All => "All",
    }
  }
}

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Inclusive calendar date range; the end date covers its whole day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<NaiveDate>,
  pub end:   Option<NaiveDate>,
}

impl DateRange {
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    let day = at.date_naive();
    self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day <= e)
  }
}

/// Criteria applied locally to fetched memes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedFilter {
  pub tab:               FeedTab,
  /// Keep memes matching any of these (case-insensitive substring of the
  /// name or of a tag name). Empty keeps everything.
  pub tags:              Vec<String>,
  pub date_range:        DateRange,
  /// Keep memes ranked at or above this percentile; `0` disables the check.
  pub min_percentile:    f64,
  /// Drop memes the viewer voted on, bookmarked or created.
  pub uninteracted_only: bool,
}

impl FeedFilter {
  pub fn matches(
    &self,
    meme: &Meme,
    viewer: Option<&UserId>,
    now: DateTime<Utc>,
  ) -> bool {
    if let Some((start, end)) = self.tab.window(now)
      && !(start <= meme.created_at && meme.created_at < end)
    {
      return false;
    }

    if !self.tags.is_empty() && !self.tags.iter().any(|t| mentions(meme, t)) {
      return false;
    }

    if !self.date_range.contains(meme.created_at) {
      return false;
    }

    if self.min_percentile > 0.0
      && meme.in_percentile.is_none_or(|p| p < self.min_percentile)
    {
      return false;
    }

    if self.uninteracted_only
      && let Some(viewer) = viewer
      && (meme.counters.has_user_voted
        || meme.counters.is_bookmarked
        || meme.is_owned_by(viewer))
    {
      return false;
    }

    true
  }

  /// Keep the memes that match, preserving order.
  pub fn apply<'a>(
    &self,
    memes: impl IntoIterator<Item = &'a Meme>,
    viewer: Option<&UserId>,
    now: DateTime<Utc>,
  ) -> Vec<&'a Meme> {
    memes
      .into_iter()
      .filter(|m| self.matches(m, viewer, now))
      .collect()
  }

  /// Back to the defaults, keeping the current tab.
  pub fn reset(&mut self) {
    *self = Self { tab: self.tab, ..Self::default() };
  }
}

fn mentions(meme: &Meme, needle: &str) -> bool {
  let needle = needle.to_lowercase();
  meme.name.to_lowercase().contains(&needle)
    || meme.tag_names().any(|t| t.to_lowercase().contains(&needle))
}

/// Split a comma-separated tag input into trimmed, non-empty tags.
pub fn parse_tag_input(input: &str) -> Vec<String> {
  input
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Sort ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
  Time,
  Votes,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
  #[default]
  Asc,
  Desc,
}

/// Sort order for the feed. With no field the fetched order is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortCriteria {
  pub field:     Option<SortField>,
  pub direction: SortDirection,
}

impl SortCriteria {
  pub fn by(field: SortField, direction: SortDirection) -> Self {
    Self { field: Some(field), direction }
  }

  /// Stable sort of `memes` in place.
  pub fn sort(&self, memes: &mut [&Meme]) {
    let Some(field) = self.field else { return };
    memes.sort_by(|a, b| {
      let ord = match field {
        SortField::Time => a.created_at.cmp(&b.created_at),
        SortField::Votes => a.counters.vote_count.cmp(&b.counters.vote_count),
      };
      match self.direction {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
      }
    });
  }

  /// Cycle `field` through ascending, descending and off.
  pub fn cycle(self, field: SortField) -> Self {
    match self.field {
      Some(f) if f == field && self.direction == SortDirection::Asc => {
        Self::by(field, SortDirection::Desc)
      }
      Some(f) if f == field => Self::default(),
      _ => Self::by(field, SortDirection::Asc),
    }
  }

  pub fn describe(&self) -> String {
    match self.field {
      None => "fetched".into(),
      Some(field) => {
        let field = match field {
          SortField::Time => "time",
          SortField::Votes => "votes",
        };
        let arrow = match self.direction {
          SortDirection::Asc => "↑",
          SortDirection::Desc => "↓",
        };
        format!("{field}{arrow}")
      }
    }
  }
}
