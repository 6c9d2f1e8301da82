//! Request and response bodies as the API sends them.

use aristhrottle_core::{
  api::{LeaderboardEntry, LeaderboardPage, RelatedTag},
  engagement::Receipt,
  meme::{Meme, MemeRecord, UserId},
  milestones::{MilestoneRecord, RewardSummary, RewardTrack},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

// ─── Requests ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub(crate) struct VoteBody<'a> {
  pub vote_to: &'a str,
  pub vote_by: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EngageBody<'a> {
  pub meme_id: &'a str,
  pub user_id: &'a str,
}

// ─── Responses ───────────────────────────────────────────────────────────────

/// `GET /api/meme` list response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListResponse {
  #[serde(default)]
  pub memes:       Vec<Value>,
  #[serde(rename = "memesCount", default)]
  pub memes_count: Option<u64>,
}

impl ListResponse {
  /// Normalise every record, skipping the ones that cannot be converted.
  pub fn into_memes(self, viewer: Option<&UserId>) -> (Vec<Meme>, u64) {
    let returned = self.memes.len() as u64;
    let memes = self
      .memes
      .into_iter()
      .filter_map(|value| {
        match MemeRecord::from_value(value).and_then(|r| r.into_meme(viewer)) {
          Ok(meme) => Some(meme),
          Err(e) => {
            warn!(error = %e, "skipping malformed meme record");
            None
          }
        }
      })
      .collect();
    (memes, self.memes_count.unwrap_or(returned))
  }
}

/// `GET /api/leaderboard` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct LeaderboardResponse {
  #[serde(default)]
  pub memes:       Vec<Value>,
  #[serde(rename = "memesCount", default)]
  pub memes_count: Option<u64>,
  /// A number for the daily window, an aggregate row list otherwise.
  #[serde(rename = "totalVotes", default)]
  pub total_votes: Value,
}

impl LeaderboardResponse {
  /// `first_rank` numbers entries that arrive without a `rank`.
  pub fn into_page(self, first_rank: u64) -> LeaderboardPage {
    let returned = self.memes.len() as u64;
    let total_votes = match &self.total_votes {
      Value::Array(rows) => rows
        .first()
        .and_then(|row| row.get("totalVotes"))
        .and_then(Value::as_u64)
        .unwrap_or(0),
      other => other.as_u64().unwrap_or(0),
    };

    let entries = self
      .memes
      .into_iter()
      .zip(first_rank..)
      .filter_map(|(value, position)| {
        let rank = value.get("rank").and_then(Value::as_u64).unwrap_or(position);
        match MemeRecord::from_value(value).and_then(|r| r.into_meme(None)) {
          Ok(meme) => Some(LeaderboardEntry { rank, meme }),
          Err(e) => {
            warn!(error = %e, rank, "skipping malformed leaderboard record");
            None
          }
        }
      })
      .collect();

    LeaderboardPage {
      entries,
      total: self.memes_count.unwrap_or(returned),
      total_votes,
    }
  }
}

/// `GET /api/rewards/votes` and `GET /api/rewards/upload` responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RewardsResponse {
  #[serde(rename = "totalVotesCount", alias = "totalUploadMemeCount", default)]
  pub total:             u64,
  #[serde(rename = "majorityVotesCount", alias = "majorityUploads", default)]
  pub majority:          u64,
  #[serde(rename = "milestoneDetails", default)]
  pub milestone_details: Vec<Value>,
}

impl RewardsResponse {
  pub fn into_summary(self, track: RewardTrack) -> RewardSummary {
    let records = self
      .milestone_details
      .into_iter()
      .filter_map(|value| match serde_json::from_value::<MilestoneRecord>(value) {
        Ok(record) => Some(record),
        Err(e) => {
          warn!(error = %e, "skipping unreadable milestone");
          None
        }
      })
      .collect();
    RewardSummary { track, total: self.total, majority: self.majority, records }
  }
}

/// `GET /api/meme?id=` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct DetailResponse {
  #[serde(default)]
  pub meme: Option<Value>,
}

/// `GET /api/tags/cooccurrence` response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CooccurrenceResponse {
  #[serde(default)]
  pub cooccurrences: Vec<RelatedTag>,
}

/// Error payloads: `{message}` for rule violations, `{error}` otherwise.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
  #[serde(default)]
  message: Option<String>,
  #[serde(default)]
  error:   Option<Value>,
}

impl ErrorBody {
  pub fn parse(body: &[u8]) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    match (parsed.message, parsed.error) {
      (Some(message), _) => message,
      (None, Some(Value::String(error))) => error,
      (None, Some(error)) => error.to_string(),
      (None, None) => String::new(),
    }
  }
}

/// Body of a successful bookmark or share call.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EngagementResponse {
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub meme:    Option<MemeRecord>,
}

impl EngagementResponse {
  pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
      return Ok(Self::default());
    }
    serde_json::from_slice(body)
  }

  /// The bookmark endpoint reports the new state in its message and never
  /// sends a bookmark count unless the record carries one.
  pub fn bookmark_receipt(&self) -> Receipt {
    let active = self.message.as_deref().and_then(|m| {
      let m = m.to_lowercase();
      if m.contains("removed") {
        Some(false)
      } else if m.contains("added") {
        Some(true)
      } else {
        None
      }
    });
    let count = self
      .meme
      .as_ref()
      .and_then(|m| m.bookmark_count)
      .map(|n| u64::try_from(n).unwrap_or(0));
    Receipt { count, active }
  }

  /// The share endpoint returns the meme with its `shares` id list.
  pub fn share_receipt(&self) -> Receipt {
    let count = self.meme.as_ref().and_then(|m| {
      m.share_count
        .map(|n| u64::try_from(n).unwrap_or(0))
        .or_else(|| (!m.shares.is_empty()).then_some(m.shares.len() as u64))
    });
    Receipt { count, active: None }
  }
}
