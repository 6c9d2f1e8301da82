//! The `EngagementApi` trait and supporting request types.
//!
//! The trait is implemented by transports (e.g. `aristhrottle-client`).
//! The engine depends on this abstraction, never on a concrete client.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  engagement::Receipt,
  meme::{Meme, MemeId, UserId},
  milestones::{RewardSummary, RewardTrack},
};

/// Number of memes the server returns per page.
pub const PAGE_SIZE: usize = 30;

/// Default number of related tags requested.
pub const RELATED_TAGS_LIMIT: usize = 10;

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`EngagementApi::list_memes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedQuery {
  /// 1-based page number.
  pub page:       usize,
  /// Name search.
  pub name:       Option<String>,
  /// Restrict to memes created by this user.
  pub created_by: Option<UserId>,
}

impl Default for FeedQuery {
  fn default() -> Self { Self { page: 1, name: None, created_by: None } }
}

impl FeedQuery {
  /// The `offset` query parameter: the end of the requested page.
  pub fn offset(&self) -> usize { self.page.max(1) * PAGE_SIZE }
}

/// One page of the feed.
#[derive(Debug, Clone, Default)]
pub struct FeedPage {
  pub memes: Vec<Meme>,
  /// Total number of memes matching the query on the server.
  pub total: u64,
}

/// Parameters for [`EngagementApi::list_leaderboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardQuery {
  /// 1-based page number.
  pub page:  usize,
  /// Only memes whose voting closed in the last daily window.
  pub daily: bool,
}

impl Default for LeaderboardQuery {
  fn default() -> Self { Self { page: 1, daily: false } }
}

impl LeaderboardQuery {
  pub fn offset(&self) -> usize { self.page.max(1) * PAGE_SIZE }
}

/// A ranked meme. Equal vote counts share a rank.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardEntry {
  pub rank: u64,
  pub meme: Meme,
}

/// One page of the leaderboard, best first.
#[derive(Debug, Clone, Default)]
pub struct LeaderboardPage {
  pub entries:     Vec<LeaderboardEntry>,
  /// Number of ranked memes in the window.
  pub total:       u64,
  /// Sum of votes over the window.
  pub total_votes: u64,
}

/// A tag frequently attached together with another tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedTag {
  pub tag_id:             String,
  pub tag_name:           String,
  pub cooccurrence_count: u64,
}

// ─── Failure classification ──────────────────────────────────────────────────

/// How an API call failed, as far as the engine cares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
  /// The server requires a session.
  Unauthorized,
  /// The target no longer exists.
  NotFound,
  /// A business rule rejected the request (`{"message": ...}` payloads).
  Rejected { status: u16, message: String },
  /// Network errors, timeouts, 5xx and undecodable responses.
  Transport,
}

/// Implemented by transport errors so callers can classify them.
pub trait ApiFailure {
  fn failure(&self) -> Failure;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the Aristhrottle REST API.
///
/// All methods return `Send` futures so the trait can be used from spawned
/// tokio tasks.
pub trait EngagementApi: Send + Sync {
  type Error: ApiFailure + std::error::Error + Send + Sync + 'static;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Fetch one page of the feed, with flags relative to `viewer`.
  fn list_memes<'a>(
    &'a self,
    query: &'a FeedQuery,
    viewer: Option<&'a UserId>,
  ) -> impl Future<Output = Result<FeedPage, Self::Error>> + Send + 'a;

  /// Fetch a single meme. Returns `None` if it does not exist.
  fn get_meme<'a>(
    &'a self,
    id: &'a MemeId,
    viewer: Option<&'a UserId>,
  ) -> impl Future<Output = Result<Option<Meme>, Self::Error>> + Send + 'a;

  /// Tags most often seen together with `tag_id`, most frequent first.
  fn related_tags<'a>(
    &'a self,
    tag_id: &'a str,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<RelatedTag>, Self::Error>> + Send + 'a;

  /// Fetch one page of closed memes ranked by votes. Leaderboard memes carry
  /// no viewer flags.
  fn list_leaderboard<'a>(
    &'a self,
    query: &'a LeaderboardQuery,
  ) -> impl Future<Output = Result<LeaderboardPage, Self::Error>> + Send + 'a;

  /// Counts and recorded milestones of `viewer` on `track`.
  fn rewards<'a>(
    &'a self,
    track: RewardTrack,
    viewer: &'a UserId,
  ) -> impl Future<Output = Result<RewardSummary, Self::Error>> + Send + 'a;

  // ── Engagement ────────────────────────────────────────────────────────

  /// Cast (`cast == true`) or retract a vote by `viewer` on `meme`.
  fn toggle_vote<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
    cast: bool,
  ) -> impl Future<Output = Result<Receipt, Self::Error>> + Send + 'a;

  /// Flip the bookmark of `viewer` on `meme`.
  fn toggle_bookmark<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
  ) -> impl Future<Output = Result<Receipt, Self::Error>> + Send + 'a;

  /// Record that `viewer` shared `meme`.
  fn record_share<'a>(
    &'a self,
    meme: &'a MemeId,
    viewer: &'a UserId,
  ) -> impl Future<Output = Result<Receipt, Self::Error>> + Send + 'a;
}
