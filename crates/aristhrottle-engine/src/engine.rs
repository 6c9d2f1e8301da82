//! [`EngagementEngine`] — optimistic vote, bookmark and share.

use std::{
  collections::HashSet,
  sync::{Arc, Mutex, PoisonError},
};

use aristhrottle_core::{
  api::{ApiFailure, EngagementApi, FeedPage, FeedQuery, Failure},
  cache::{BookmarkCache, BookmarkHint},
  engagement::{self, Action, OptimisticUpdate, Phase},
  meme::{Counters, Meme, MemeId, UserId},
};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::{EngagementError, MemeStore, Notice, Result};

// ─── Outcome ──────────────────────────────────────────────────────────────────

/// How an engagement action that reached the server ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  pub meme_id:  MemeId,
  pub action:   Action,
  /// One of the settled phases.
  pub phase:    Phase,
  /// Counters in the store after settling.
  pub counters: Counters,
  pub notice:   Notice,
}

// ─── In-flight tracking ───────────────────────────────────────────────────────

type InFlight = Arc<Mutex<HashSet<(MemeId, Action)>>>;

/// Holds an in-flight key and releases it on drop, including when the future
/// running the action is dropped before the request completes.
struct InFlightGuard {
  set: InFlight,
  key: (MemeId, Action),
}

impl InFlightGuard {
  fn acquire(set: &InFlight, meme: &MemeId, action: Action) -> Option<Self> {
    let key = (meme.clone(), action);
    let inserted = set
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.clone());
    inserted.then(|| Self { set: set.clone(), key })
  }
}

impl Drop for InFlightGuard {
  fn drop(&mut self) {
    self
      .set
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .remove(&self.key);
  }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// The one place optimistic engagement happens.
///
/// Cheap to clone: the API client, cache, store and in-flight set are all
/// shared.
pub struct EngagementEngine<A, C> {
  api:       Arc<A>,
  cache:     Arc<C>,
  store:     MemeStore,
  in_flight: InFlight,
  viewer:    Option<UserId>,
}

impl<A, C> Clone for EngagementEngine<A, C> {
  fn clone(&self) -> Self {
    Self {
      api:       self.api.clone(),
      cache:     self.cache.clone(),
      store:     self.store.clone(),
      in_flight: self.in_flight.clone(),
      viewer:    self.viewer.clone(),
    }
  }
}

impl<A, C> EngagementEngine<A, C>
where
  A: EngagementApi,
  C: BookmarkCache,
{
  /// Create an engine for `viewer` (`None` when signed out).
  pub fn new(api: A, cache: C, viewer: Option<UserId>) -> Self {
    Self {
      api: Arc::new(api),
      cache: Arc::new(cache),
      store: MemeStore::new(),
      in_flight: InFlight::default(),
      viewer,
    }
  }

  pub fn viewer(&self) -> Option<&UserId> { self.viewer.as_ref() }

  pub fn store(&self) -> &MemeStore { &self.store }

  pub fn api(&self) -> &A { &self.api }

  pub fn cache(&self) -> &C { &self.cache }

  /// Where the `(meme, action)` pair currently is in its lifecycle.
  pub fn phase(&self, meme: &MemeId, action: Action) -> Phase {
    let key = (meme.clone(), action);
    if self
      .in_flight
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .contains(&key)
    {
      Phase::Optimistic
    } else {
      Phase::Idle
    }
  }

  // ── Reads ───────────────────────────────────────────────────────────────

  /// Fetch a feed page and replace the stored copies with it.
  pub async fn refresh(
    &self,
    query: &FeedQuery,
  ) -> std::result::Result<FeedPage, A::Error> {
    let page = self.api.list_memes(query, self.viewer.as_ref()).await?;
    self.store.upsert_all(page.memes.iter().cloned());
    debug!(count = page.memes.len(), total = page.total, "feed refreshed");
    Ok(page)
  }

  /// Fetch one meme and replace its stored copy.
  pub async fn load(
    &self,
    id: &MemeId,
  ) -> std::result::Result<Option<Meme>, A::Error> {
    let meme = self.api.get_meme(id, self.viewer.as_ref()).await?;
    if let Some(meme) = &meme {
      self.store.upsert(meme.clone());
    }
    Ok(meme)
  }

  // ── Engagement ──────────────────────────────────────────────────────────

  /// Toggle the viewer's vote on `id`.
  pub async fn vote(&self, id: &MemeId) -> Result<Outcome> {
    self.engage(Action::Vote, id).await
  }

  /// Toggle the viewer's bookmark on `id`.
  pub async fn bookmark(&self, id: &MemeId) -> Result<Outcome> {
    self.engage(Action::Bookmark, id).await
  }

  /// Record a share of `id`.
  pub async fn share(&self, id: &MemeId) -> Result<Outcome> {
    self.engage(Action::Share, id).await
  }

  /// Run `action` on `id`: check, mutate optimistically, call the API, then
  /// settle or roll back. The bookmark hint cache is only touched once the
  /// server has answered.
  ///
  /// Refusals (`AuthRequired` without a session, `OwnContent`, `InFlight`)
  /// happen before any mutation or request. A 401 from the server rolls back
  /// and also yields `AuthRequired`.
  pub async fn engage(&self, action: Action, id: &MemeId) -> Result<Outcome> {
    let meme = self
      .store
      .get(id)
      .ok_or_else(|| EngagementError::UnknownMeme(id.clone()))?;
    let viewer =
      engagement::precheck(action, &meme, self.viewer.as_ref())?.clone();

    let _guard = InFlightGuard::acquire(&self.in_flight, id, action).ok_or_else(
      || EngagementError::InFlight { meme: id.clone(), action },
    )?;

    let update = OptimisticUpdate::plan(action, meme.counters);
    self.store.modify(id, |c| *c = update.apply(*c));
    debug!(meme = %id, %action, before = ?update.before, after = ?update.after, "optimistic");

    let result = match action {
      Action::Vote => self.api.toggle_vote(id, &viewer, update.activates()).await,
      Action::Bookmark => self.api.toggle_bookmark(id, &viewer).await,
      Action::Share => self.api.record_share(id, &viewer).await,
    };

    match result {
      Ok(receipt) => {
        let counters = self
          .store
          .modify(id, |c| *c = update.settle(*c, receipt))
          .unwrap_or_else(|| update.settle(update.after, receipt));
        let activated = match action {
          Action::Share => true,
          _ => action.project(&counters).1,
        };
        if activated != update.activates() {
          warn!(meme = %id, %action, activated, "server moved the other way");
        }
        info!(meme = %id, %action, ?receipt, "confirmed");

        if action == Action::Bookmark {
          self.sync_hint(&meme, activated).await;
        }

        Ok(Outcome {
          meme_id: id.clone(),
          action,
          phase: Phase::Confirmed,
          counters,
          notice: Notice::confirmed(action, activated),
        })
      }
      Err(err) => {
        let failure = err.failure();
        warn!(meme = %id, %action, error = %err, ?failure, "request failed");

        let phase = if action.rolls_back() {
          self.store.modify(id, |c| {
            if let Some(restored) = update.revert(*c) {
              *c = restored;
            }
          });
          Phase::RolledBack
        } else {
          Phase::Kept
        };

        if failure == Failure::Unauthorized {
          return Err(EngagementError::AuthRequired);
        }

        let counters = self.store.counters(id).unwrap_or(update.before);
        Ok(Outcome {
          meme_id: id.clone(),
          action,
          phase,
          counters,
          notice: Notice::failed(action, &failure),
        })
      }
    }
  }

  /// Mirror a bookmark change into the hint cache. Failures are logged only.
  async fn sync_hint(&self, meme: &Meme, bookmarked: bool) {
    let result = if bookmarked {
      self.cache.insert(BookmarkHint::for_meme(meme, Utc::now())).await
    } else {
      self.cache.remove(&meme.id).await
    };
    if let Err(e) = result {
      warn!(meme = %meme.id, error = %e, "bookmark hint cache update failed");
    }
  }
}
