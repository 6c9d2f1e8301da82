//! The `BookmarkCache` trait.
//!
//! A local record of which memes the viewer bookmarked. It backs the saved
//! list and is never consulted for counts or flags. Implemented by
//! `aristhrottle-cache-sqlite`.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meme::{Meme, MemeId};

/// What the cache remembers about one bookmarked meme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkHint {
  pub meme_id:   MemeId,
  pub name:      String,
  pub image_url: String,
  pub saved_at:  DateTime<Utc>,
}

impl BookmarkHint {
  pub fn for_meme(meme: &Meme, saved_at: DateTime<Utc>) -> Self {
    Self {
      meme_id: meme.id.clone(),
      name: meme.name.clone(),
      image_url: meme.image_url.clone(),
      saved_at,
    }
  }
}

/// Best-effort local store of bookmark hints. Never a source of truth.
pub trait BookmarkCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Remember `hint`, replacing any previous entry for the same meme.
  fn insert(
    &self,
    hint: BookmarkHint,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Forget the hint for `id`. Removing an absent entry is not an error.
  fn remove<'a>(
    &'a self,
    id: &'a MemeId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// All hints, most recently saved first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<BookmarkHint>, Self::Error>> + Send + '_;
}
