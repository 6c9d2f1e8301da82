//! [`MemeStore`] — the normalised, id-keyed view shared by every screen.

use std::{
  collections::HashMap,
  sync::{Arc, PoisonError, RwLock},
};

use aristhrottle_core::meme::{Counters, Meme, MemeId};

/// The single client-side copy of every loaded meme.
///
/// Clones share the same map. The lock is never held
/// across an await point.
#[derive(Clone, Default)]
pub struct MemeStore {
  memes: Arc<RwLock<HashMap<MemeId, Meme>>>,
}

impl MemeStore {
  pub fn new() -> Self { Self::default() }

  /// Insert or replace a meme with an authoritative copy.
  pub fn upsert(&self, meme: Meme) {
    self.write().insert(meme.id.clone(), meme);
  }

  pub fn upsert_all(&self, memes: impl IntoIterator<Item = Meme>) {
    let mut map = self.write();
    for meme in memes {
      map.insert(meme.id.clone(), meme);
    }
  }

  pub fn get(&self, id: &MemeId) -> Option<Meme> { self.read().get(id).cloned() }

  pub fn counters(&self, id: &MemeId) -> Option<Counters> {
    self.read().get(id).map(|m| m.counters)
  }

  /// Mutate the counters of `id` in place and return the new value.
  pub fn modify(
    &self,
    id: &MemeId,
    f: impl FnOnce(&mut Counters),
  ) -> Option<Counters> {
    let mut map = self.write();
    let meme = map.get_mut(id)?;
    f(&mut meme.counters);
    Some(meme.counters)
  }

  /// Copies of the memes in `ids`, in that order, skipping unknown ids.
  pub fn snapshot(&self, ids: &[MemeId]) -> Vec<Meme> {
    let map = self.read();
    ids.iter().filter_map(|id| map.get(id).cloned()).collect()
  }

  pub fn len(&self) -> usize { self.read().len() }

  pub fn is_empty(&self) -> bool { self.read().is_empty() }

  fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<MemeId, Meme>> {
    self.memes.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<MemeId, Meme>> {
    self.memes.write().unwrap_or_else(PoisonError::into_inner)
  }
}
