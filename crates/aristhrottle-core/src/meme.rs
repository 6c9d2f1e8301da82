//! Memes: the items users vote on, bookmark and share.
//!
//! The API is loose about shapes: tags arrive as bare names or as populated
//! documents, the creator as an id or a user object, counts either directly
//! or as id arrays. [`MemeRecord`] accepts all of them; [`Meme`] is the single
//! canonical shape the rest of the workspace sees.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque backend identifier of a meme.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MemeId(String);

impl MemeId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for MemeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Opaque backend identifier of a user.
#[derive(
  Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Canonical shape ─────────────────────────────────────────────────────────

/// A tag attached to a meme. Only populated documents carry an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:   Option<String>,
  pub name: String,
}

/// The creator of a meme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
  pub id:       UserId,
  pub username: Option<String>,
}

/// Per-viewer engagement state of a meme.
///
/// `has_user_voted` and `is_bookmarked` are relative to the viewer the meme
/// was fetched for; without a session both are `false`.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct Counters {
  pub vote_count:     u64,
  pub has_user_voted: bool,
  pub bookmark_count: u64,
  pub is_bookmarked:  bool,
  /// Never decreases locally; there is no un-share.
  pub share_count:    u64,
}

/// A meme as every view sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meme {
  pub id:            MemeId,
  pub name:          String,
  pub image_url:     String,
  pub owner:         Owner,
  pub tags:          Vec<Tag>,
  pub counters:      Counters,
  pub created_at:    DateTime<Utc>,
  /// Leaderboard percentile, when the server has ranked the meme.
  pub in_percentile: Option<f64>,
  pub is_onchain:    bool,
}

impl Meme {
  pub fn is_owned_by(&self, user: &UserId) -> bool { &self.owner.id == user }

  pub fn tag_names(&self) -> impl Iterator<Item = &str> {
    self.tags.iter().map(|t| t.name.as_str())
  }
}

// ─── Wire shape ──────────────────────────────────────────────────────────────

/// A tag as sent by the API: either a bare name or a populated document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagRecord {
  Name(String),
  Document {
    #[serde(rename = "_id", default)]
    id:   Option<String>,
    name: String,
  },
}

impl From<TagRecord> for Tag {
  fn from(record: TagRecord) -> Self {
    match record {
      TagRecord::Name(name) => Tag { id: None, name },
      TagRecord::Document { id, name } => Tag { id, name },
    }
  }
}

/// The `created_by` field: a bare user id or a populated user.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CreatorRecord {
  Id(String),
  User {
    #[serde(rename = "_id")]
    id:       String,
    #[serde(default)]
    username: Option<String>,
  },
}

impl From<CreatorRecord> for Owner {
  fn from(record: CreatorRecord) -> Self {
    match record {
      CreatorRecord::Id(id) => Owner { id: UserId::new(id), username: None },
      CreatorRecord::User { id, username } => {
        Owner { id: UserId::new(id), username }
      }
    }
  }
}

/// A meme exactly as the API serialises it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemeRecord {
  #[serde(rename = "_id", default)]
  pub id:             Option<String>,
  #[serde(default)]
  pub name:           String,
  #[serde(default)]
  pub image_url:      String,
  #[serde(default)]
  pub vote_count:     Option<i64>,
  #[serde(default, alias = "voted")]
  pub has_user_voted: Option<bool>,
  #[serde(default)]
  pub bookmark_count: Option<i64>,
  #[serde(default)]
  pub is_bookmarked:  Option<bool>,
  #[serde(default)]
  pub bookmarks:      Vec<String>,
  #[serde(default)]
  pub share_count:    Option<i64>,
  #[serde(default)]
  pub shares:         Vec<String>,
  #[serde(default)]
  pub created_by:     Option<CreatorRecord>,
  #[serde(default)]
  pub tags:           Vec<TagRecord>,
  #[serde(rename = "createdAt", default)]
  pub created_at:     Option<DateTime<Utc>>,
  #[serde(default)]
  pub in_percentile:  Option<f64>,
  #[serde(default)]
  pub is_onchain:     Option<bool>,
}

fn clamp(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

impl MemeRecord {
  /// Parse a record out of an arbitrary JSON document.
  pub fn from_value(value: serde_json::Value) -> Result<Self> {
    Ok(serde_json::from_value(value)?)
  }

  /// Normalise into a [`Meme`] for `viewer`.
  ///
  /// Viewer-relative flags are `false` when there is no viewer, whatever the
  /// server claims.
  pub fn into_meme(self, viewer: Option<&UserId>) -> Result<Meme> {
    let id = self.id.ok_or(Error::MissingField("_id"))?;
    let owner = self.created_by.ok_or(Error::MissingField("created_by"))?;
    let created_at = self.created_at.ok_or(Error::MissingField("createdAt"))?;

    let in_bookmarks = viewer
      .is_some_and(|v| self.bookmarks.iter().any(|b| b == v.as_str()));

    let counters = Counters {
      vote_count:     self.vote_count.map(clamp).unwrap_or(0),
      has_user_voted: viewer.is_some() && self.has_user_voted.unwrap_or(false),
      bookmark_count: self
        .bookmark_count
        .map(clamp)
        .unwrap_or(self.bookmarks.len() as u64),
      is_bookmarked:  viewer.is_some()
        && self.is_bookmarked.unwrap_or(in_bookmarks),
      share_count:    self
        .share_count
        .map(clamp)
        .unwrap_or(self.shares.len() as u64),
    };

    Ok(Meme {
      id: MemeId::new(id),
      name: self.name,
      image_url: self.image_url,
      owner: owner.into(),
      tags: self.tags.into_iter().map(Tag::from).collect(),
      counters,
      created_at,
      in_percentile: self.in_percentile,
      is_onchain: self.is_onchain.unwrap_or(false),
    })
  }
}
