//! Background feed polling.

use std::{
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::Duration,
};

use aristhrottle_core::{
  api::{EngagementApi, FeedQuery},
  cache::BookmarkCache,
};
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::EngagementEngine;

/// Default delay between two polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct PollerConfig {
  pub interval: Duration,
  pub query:    FeedQuery,
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self { interval: DEFAULT_POLL_INTERVAL, query: FeedQuery::default() }
  }
}

/// Re-fetches the feed on an interval, refreshing the engine's store and
/// raising a flag when the server-side total changes.
///
/// Dropping the poller cancels its task.
pub struct FeedPoller {
  task:        JoinHandle<()>,
  paused:      Arc<AtomicBool>,
  new_content: Arc<watch::Sender<bool>>,
}

impl FeedPoller {
  /// Start polling. `baseline` is the total from the initial load, if any;
  /// the first poll only establishes a baseline when it is `None`.
  pub fn spawn<A, C>(
    engine: EngagementEngine<A, C>,
    config: PollerConfig,
    baseline: Option<u64>,
  ) -> Self
  where
    A: EngagementApi + 'static,
    C: BookmarkCache + 'static,
  {
    let paused = Arc::new(AtomicBool::new(false));
    let (tx, _rx) = watch::channel(false);
    let new_content = Arc::new(tx);

    let task = tokio::spawn(poll_loop(
      engine,
      config,
      baseline,
      paused.clone(),
      new_content.clone(),
    ));

    Self { task, paused, new_content }
  }

  /// Stop fetching until [`resume`](Self::resume) (hidden view, upload in
  /// progress).
  pub fn pause(&self) { self.paused.store(true, Ordering::Relaxed); }

  pub fn resume(&self) { self.paused.store(false, Ordering::Relaxed); }

  pub fn is_paused(&self) -> bool { self.paused.load(Ordering::Relaxed) }

  /// Subscribe to the "new content available" flag.
  pub fn subscribe(&self) -> watch::Receiver<bool> { self.new_content.subscribe() }

  pub fn has_new_content(&self) -> bool { *self.new_content.borrow() }

  /// Clear the flag once the view has shown the new content.
  pub fn acknowledge(&self) { self.new_content.send_replace(false); }
}

impl Drop for FeedPoller {
  fn drop(&mut self) { self.task.abort(); }
}

async fn poll_loop<A, C>(
  engine: EngagementEngine<A, C>,
  config: PollerConfig,
  mut last_total: Option<u64>,
  paused: Arc<AtomicBool>,
  new_content: Arc<watch::Sender<bool>>,
) where
  A: EngagementApi,
  C: BookmarkCache,
{
  let mut ticker = tokio::time::interval(config.interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  // The first tick completes immediately; the initial load already happened.
  ticker.tick().await;

  loop {
    ticker.tick().await;
    if paused.load(Ordering::Relaxed) {
      debug!("poll skipped: paused");
      continue;
    }

    match engine.refresh(&config.query).await {
      Ok(page) => {
        if let Some(previous) = last_total
          && previous != page.total
        {
          info!(previous, total = page.total, "new content available");
          new_content.send_replace(true);
        }
        last_total = Some(page.total);
      }
      Err(e) => warn!(error = %e, "feed poll failed"),
    }
  }
}
