//! Core types and trait definitions for the Aristhrottle engagement client.
//!
//! Memes, engagement transitions, feed filtering, reward milestones and the
//! transport traits. No HTTP or SQL in here;
//! `aristhrottle-client`, `aristhrottle-cache-sqlite` and
//! `aristhrottle-engine` build on these types.

// Trait declarations spell out `+ Send` futures; implementors write plain
// `async fn`.
#![allow(async_fn_in_trait)]

pub mod api;
pub mod cache;
pub mod cooccurrence;
pub mod engagement;
pub mod error;
pub mod feed;
pub mod meme;
pub mod milestones;

pub use error::{Error, Result};
