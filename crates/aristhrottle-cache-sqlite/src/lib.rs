//! SQLite backend for the bookmark hint cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod cache;
mod schema;

pub mod error;

pub use cache::SqliteBookmarkCache;
pub use error::{Error, Result};
