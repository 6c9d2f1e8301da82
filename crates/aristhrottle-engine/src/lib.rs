//! Shared optimistic engagement engine.
//!
//! Every view that votes, bookmarks or shares goes through one
//! [`EngagementEngine`]: it owns the normalised [`MemeStore`], applies the
//! optimistic state, talks to any [`aristhrottle_core::api::EngagementApi`]
//! and settles or rolls back. A [`FeedPoller`] keeps the store fresh in
//! the background.

mod engine;
mod notice;
mod poller;
mod store;

pub mod error;

pub use engine::{EngagementEngine, Outcome};
pub use error::{EngagementError, Result};
pub use notice::{Notice, NoticeLevel};
pub use poller::{DEFAULT_POLL_INTERVAL, FeedPoller, PollerConfig};
pub use store::MemeStore;

#[cfg(test)]
mod tests;
