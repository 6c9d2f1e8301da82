//! SQL schema for the bookmark hint cache.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS bookmarks (
    meme_id    TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    image_url  TEXT NOT NULL,
    saved_at   TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE INDEX IF NOT EXISTS bookmarks_saved_idx ON bookmarks(saved_at);

PRAGMA user_version = 1;
";
