//! Reward milestones.
//!
//! Each activity has a fixed ladder of thresholds. Reaching one unlocks a
//! token reward that the server records; claiming it happens on chain and is
//! not handled here. This module only works out where a user stands.

use serde::{Deserialize, Serialize};

// ─── Ladders ─────────────────────────────────────────────────────────────────

/// One rung of a ladder: reaching `threshold` is worth `reward` tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
  pub threshold: u64,
  pub reward:    u64,
}

const fn tier(threshold: u64, reward: u64) -> Tier { Tier { threshold, reward } }

const MAJORITY_VOTES: &[Tier] =
  &[tier(10, 25), tier(50, 100), tier(100, 250), tier(250, 500)];

const TOTAL_VOTES: &[Tier] = &[
  tier(1, 5),
  tier(50, 10),
  tier(100, 25),
  tier(250, 75),
  tier(500, 100),
];

const MAJORITY_UPLOADS: &[Tier] =
  &[tier(10, 50), tier(50, 250), tier(100, 650), tier(250, 1500)];

const TOTAL_UPLOADS: &[Tier] = &[
  tier(1, 5),
  tier(50, 50),
  tier(100, 150),
  tier(250, 500),
  tier(500, 1000),
];

const REFERRALS: &[Tier] = &[
  tier(1, 5),
  tier(10, 25),
  tier(25, 75),
  tier(50, 150),
  tier(100, 300),
  tier(250, 1000),
  tier(500, 2000),
];

/// The activity a ladder counts. Serialised with the server's `type` names.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
pub enum MilestoneKind {
  /// Votes on memes that ended in the majority.
  #[serde(rename = "vote")]
  MajorityVotes,
  #[serde(rename = "vote-total")]
  TotalVotes,
  /// Uploads that ended in the majority.
  #[serde(rename = "upload")]
  MajorityUploads,
  #[serde(rename = "upload-total")]
  TotalUploads,
  #[serde(rename = "referral")]
  Referrals,
}

impl MilestoneKind {
  pub fn tiers(self) -> &'static [Tier] {
    match self {
      Self::MajorityVotes => MAJORITY_VOTES,
      Self::TotalVotes => TOTAL_VOTES,
      Self::MajorityUploads => MAJORITY_UPLOADS,
      Self::TotalUploads => TOTAL_UPLOADS,
      Self::Referrals => REFERRALS,
    }
  }

  /// The reward for reaching exactly `threshold`, if it is a rung.
  pub fn reward(self, threshold: u64) -> Option<u64> {
    self
      .tiers()
      .iter()
      .find(|t| t.threshold == threshold)
      .map(|t| t.reward)
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::MajorityVotes => "Majority votes",
      Self::TotalVotes => "Votes cast",
      Self::MajorityUploads => "Majority uploads",
      Self::TotalUploads => "Uploads",
      Self::Referrals => "Referrals",
    }
  }
}

/// A milestone the server has recorded as reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
  pub milestone:  u64,
  #[serde(default)]
  pub reward:     u64,
  #[serde(default)]
  pub is_claimed: bool,
  #[serde(rename = "type")]
  pub kind:       MilestoneKind,
}

// ─── Progress ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierState {
  Locked,
  /// Reached and waiting to be claimed.
  Reached,
  Claimed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierStatus {
  pub tier:  Tier,
  pub state: TierState,
}

/// Where `count` stands on the ladder of `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
  pub kind:  MilestoneKind,
  pub count: u64,
  pub tiers: Vec<TierStatus>,
}

impl Progress {
  /// `records` may hold milestones of any kind; only those of `kind` count.
  pub fn new(kind: MilestoneKind, count: u64, records: &[MilestoneRecord]) -> Self {
    let tiers = kind
      .tiers()
      .iter()
      .map(|&tier| {
        let claimed = records.iter().any(|r| {
          r.kind == kind && r.milestone == tier.threshold && r.is_claimed
        });
        let state = if claimed {
          TierState::Claimed
        } else if count >= tier.threshold {
          TierState::Reached
        } else {
          TierState::Locked
        };
        TierStatus { tier, state }
      })
      .collect();
    Self { kind, count, tiers }
  }

  /// The first rung not yet reached.
  pub fn next(&self) -> Option<Tier> {
    self
      .tiers
      .iter()
      .find(|t| t.state == TierState::Locked)
      .map(|t| t.tier)
  }

  /// How far `count` is from the next rung.
  pub fn remaining(&self) -> Option<u64> {
    self.next().map(|t| t.threshold.saturating_sub(self.count))
  }

  /// Tokens reached but not claimed yet.
  pub fn unclaimed_reward(&self) -> u64 {
    self
      .tiers
      .iter()
      .filter(|t| t.state == TierState::Reached)
      .map(|t| t.tier.reward)
      .sum()
  }

  /// Share of the way from the previous rung to the next, in `0.0..=1.0`.
  /// A finished ladder reports `1.0`.
  pub fn ratio(&self) -> f64 {
    let Some(next) = self.next() else { return 1.0 };
    let floor = self
      .tiers
      .iter()
      .map(|t| t.tier.threshold)
      .filter(|&th| th <= self.count)
      .max()
      .unwrap_or(0);
    let span = next.threshold.saturating_sub(floor).max(1);
    (self.count.saturating_sub(floor) as f64 / span as f64).clamp(0.0, 1.0)
  }
}

// ─── Summaries ───────────────────────────────────────────────────────────────

/// Which reward endpoint a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewardTrack {
  Votes,
  Uploads,
}

impl RewardTrack {
  /// The `(majority, total)` ladders this track feeds.
  pub fn kinds(self) -> (MilestoneKind, MilestoneKind) {
    match self {
      Self::Votes => (MilestoneKind::MajorityVotes, MilestoneKind::TotalVotes),
      Self::Uploads => {
        (MilestoneKind::MajorityUploads, MilestoneKind::TotalUploads)
      }
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Votes => "Votes",
      Self::Uploads => "Uploads",
    }
  }
}

/// A user's counts and recorded milestones for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardSummary {
  pub track:    RewardTrack,
  pub total:    u64,
  pub majority: u64,
  pub records:  Vec<MilestoneRecord>,
}

impl RewardSummary {
  /// Progress on the majority ladder, then the total ladder.
  pub fn ladders(&self) -> [Progress; 2] {
    let (majority, total) = self.track.kinds();
    [
      Progress::new(majority, self.majority, &self.records),
      Progress::new(total, self.total, &self.records),
    ]
  }
}
