//! [`SqliteBookmarkCache`] — the SQLite implementation of [`BookmarkCache`].

use std::path::Path;

use aristhrottle_core::{
  cache::{BookmarkCache, BookmarkHint},
  meme::MemeId,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{Error, Result, schema::SCHEMA};

fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// A row exactly as stored.
struct RawHint {
  meme_id:   String,
  name:      String,
  image_url: String,
  saved_at:  String,
}

impl RawHint {
  fn decode(self) -> Result<BookmarkHint> {
    Ok(BookmarkHint {
      meme_id:   MemeId::new(self.meme_id),
      name:      self.name,
      image_url: self.image_url,
      saved_at:  decode_dt(&self.saved_at)?,
    })
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// Bookmark hints kept in a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteBookmarkCache {
  conn: tokio_rusqlite::Connection,
}

impl SqliteBookmarkCache {
  /// Open (or create) a cache at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  /// Open an in-memory cache, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let cache = Self { conn };
    cache.init_schema().await?;
    Ok(cache)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl BookmarkCache for SqliteBookmarkCache {
  type Error = Error;

  async fn insert(&self, hint: BookmarkHint) -> Result<()> {
    let id = hint.meme_id.as_str().to_owned();
    let saved_at = encode_dt(hint.saved_at);
    debug!(meme = %id, "caching bookmark hint");

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO bookmarks (meme_id, name, image_url, saved_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(meme_id) DO UPDATE SET
             name = excluded.name,
             image_url = excluded.image_url,
             saved_at = excluded.saved_at",
          rusqlite::params![id, hint.name, hint.image_url, saved_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn remove<'a>(&'a self, id: &'a MemeId) -> Result<()> {
    let id = id.as_str().to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM bookmarks WHERE meme_id = ?1",
          rusqlite::params![id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn list(&self) -> Result<Vec<BookmarkHint>> {
    let raws: Vec<RawHint> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT meme_id, name, image_url, saved_at FROM bookmarks
           ORDER BY saved_at DESC, meme_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHint {
              meme_id:   row.get(0)?,
              name:      row.get(1)?,
              image_url: row.get(2)?,
              saved_at:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHint::decode).collect()
  }
}
