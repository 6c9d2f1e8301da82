//! Optimistic engagement transitions.
//!
//! Everything here is pure: given the counters a view currently shows, plan
//! the optimistic state for an action, then either settle it against what the
//! server answered or compute the state to restore after a failure. The
//! engine crate owns the side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::meme::{Counters, Meme, UserId};

// ─── Actions ─────────────────────────────────────────────────────────────────

/// A user-initiated engagement action.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
  Vote,
  Bookmark,
  Share,
}

impl Action {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Vote => "vote",
      Self::Bookmark => "bookmark",
      Self::Share => "share",
    }
  }

  /// The `(count, flag)` slice of `counters` this action touches. Shares have
  /// no per-viewer flag.
  pub fn project(self, counters: &Counters) -> (u64, bool) {
    match self {
      Self::Vote => (counters.vote_count, counters.has_user_voted),
      Self::Bookmark => (counters.bookmark_count, counters.is_bookmarked),
      Self::Share => (counters.share_count, false),
    }
  }

  fn write(self, counters: &mut Counters, (count, flag): (u64, bool)) {
    match self {
      Self::Vote => {
        counters.vote_count = count;
        counters.has_user_voted = flag;
      }
      Self::Bookmark => {
        counters.bookmark_count = count;
        counters.is_bookmarked = flag;
      }
      Self::Share => counters.share_count = count,
    }
  }

  /// Whether a failed request restores the pre-action state. Shares are
  /// fire-and-forget: the increment stays until the next fetch.
  pub fn rolls_back(self) -> bool { !matches!(self, Self::Share) }
}

impl fmt::Display for Action {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── State machine ───────────────────────────────────────────────────────────

/// Lifecycle of one `(meme, action)` pair.
///
/// `Idle -> Optimistic -> {Confirmed | RolledBack | Kept}`, and back to `Idle`
/// before the same action on the same meme may start again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
  Idle,
  /// Local state mutated, request in flight.
  Optimistic,
  /// The server accepted the action.
  Confirmed,
  /// The request failed and the pre-action state was restored.
  RolledBack,
  /// The request failed but the optimistic state was retained (shares).
  Kept,
}

impl Phase {
  pub fn is_settled(self) -> bool {
    matches!(self, Self::Confirmed | Self::RolledBack | Self::Kept)
  }
}

// ─── Preconditions ───────────────────────────────────────────────────────────

/// Why an action was refused before any local mutation or network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
  /// No session; the caller should prompt for login.
  AuthRequired,
  /// Voting on one's own meme.
  OwnContent,
}

/// Check the preconditions of `action` on `meme` and return the acting user.
pub fn precheck<'a>(
  action: Action,
  meme: &Meme,
  viewer: Option<&'a UserId>,
) -> Result<&'a UserId, Refusal> {
  let viewer = viewer.ok_or(Refusal::AuthRequired)?;
  if action == Action::Vote && meme.is_owned_by(viewer) {
    return Err(Refusal::OwnContent);
  }
  Ok(viewer)
}

// ─── Server answers ──────────────────────────────────────────────────────────

/// Authoritative values returned by a successful engagement request. Either
/// field may be absent when the endpoint does not report it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Receipt {
  pub count:  Option<u64>,
  pub active: Option<bool>,
}

fn step(count: u64, up: bool) -> u64 {
  if up { count.saturating_add(1) } else { count.saturating_sub(1) }
}

// ─── Optimistic update ───────────────────────────────────────────────────────

/// One planned optimistic mutation: the counters before and after `action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimisticUpdate {
  pub action: Action,
  pub before: Counters,
  pub after:  Counters,
}

impl OptimisticUpdate {
  /// Plan `action` against the counters currently shown.
  ///
  /// Toggles decrement only when the flag is set, saturating at zero; shares
  /// always increment.
  pub fn plan(action: Action, before: Counters) -> Self {
    let (count, flag) = action.project(&before);
    let next = match action {
      Action::Share => (count.saturating_add(1), false),
      Action::Vote | Action::Bookmark if flag => {
        (count.saturating_sub(1), false)
      }
      Action::Vote | Action::Bookmark => (count.saturating_add(1), true),
    };

    let mut after = before;
    action.write(&mut after, next);
    Self { action, before, after }
  }

  /// `true` when the update casts a vote or adds a bookmark (or shares);
  /// `false` when it retracts.
  pub fn activates(&self) -> bool {
    match self.action {
      Action::Share => true,
      action => action.project(&self.after).1,
    }
  }

  /// Write the optimistic values over `current`, leaving the other actions'
  /// fields alone.
  pub fn apply(&self, current: Counters) -> Counters {
    let mut next = current;
    self.action.write(&mut next, self.action.project(&self.after));
    next
  }

  /// Fold a successful [`Receipt`] into `current`.
  ///
  /// A reported count always wins. Without one, the count is derived from
  /// the direction the server says it moved: from `before` when `current`
  /// still holds the optimistic values, otherwise from `current` (a refresh
  /// landed in between), which is kept as is when it already shows the
  /// server's flag.
  pub fn settle(&self, current: Counters, receipt: Receipt) -> Counters {
    let action = self.action;
    let mut next = current;

    if action == Action::Share {
      if let Some(count) = receipt.count {
        action.write(&mut next, (count, false));
      }
      return next;
    }

    let flag = receipt.active.unwrap_or_else(|| self.activates());
    let count = match receipt.count {
      Some(count) => count,
      None if action.project(&current) == action.project(&self.after) => {
        step(action.project(&self.before).0, flag)
      }
      None => match action.project(&current) {
        (count, shown) if shown == flag => count,
        (count, _) => step(count, flag),
      },
    };
    action.write(&mut next, (count, flag));
    next
  }

  /// The state to restore after a failed request, or `None` when nothing
  /// should change.
  ///
  /// Only the action's own fields are restored, and only if they still hold
  /// the optimistic values; an authoritative refresh that landed in between
  /// wins over the rollback.
  pub fn revert(&self, current: Counters) -> Option<Counters> {
    if !self.action.rolls_back()
      || self.action.project(&current) != self.action.project(&self.after)
    {
      return None;
    }
    let mut restored = current;
    self.action.write(&mut restored, self.action.project(&self.before));
    Some(restored)
  }
}
