//! Engine tests against a scripted in-memory API.

use std::{
  collections::{BTreeMap, VecDeque},
  sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use aristhrottle_core::{
  api::{
    ApiFailure, EngagementApi, Failure, FeedPage, FeedQuery, LeaderboardPage,
    LeaderboardQuery, RelatedTag,
  },
  cache::{BookmarkCache, BookmarkHint},
  engagement::{Action, Phase, Receipt},
  meme::{Counters, Meme, MemeId, Owner, UserId},
  milestones::{RewardSummary, RewardTrack},
};
use chrono::Utc;
use tokio::{sync::Notify, time::timeout};

use crate::{EngagementEngine, EngagementError, FeedPoller, NoticeLevel, PollerConfig};

// ─── Fakes ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FakeError {
  #[error("status {0}: {1}")]
  Status(u16, String),
  #[error("connection reset")]
  Transport,
}

impl ApiFailure for FakeError {
  fn failure(&self) -> Failure {
    match self {
      FakeError::Status(401, _) => Failure::Unauthorized,
      FakeError::Status(404, _) => Failure::NotFound,
      FakeError::Status(status, message) => {
        Failure::Rejected { status: *status, message: message.clone() }
      }
      FakeError::Transport => Failure::Transport,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
  Vote { cast: bool },
  Bookmark,
  Share,
}

/// Holds engagement requests open until the test releases them.
#[derive(Clone, Default)]
struct Gate {
  started: Arc<Notify>,
  release: Arc<Notify>,
}

#[derive(Default)]
struct ScriptedApi {
  replies:    Mutex<VecDeque<Result<Receipt, FakeError>>>,
  pages:      Mutex<VecDeque<FeedPage>>,
  calls:      Mutex<Vec<Call>>,
  list_calls: AtomicUsize,
  gate:       Mutex<Option<Gate>>,
}

impl ScriptedApi {
  fn reply_with(&self, reply: Result<Receipt, FakeError>) {
    self.replies.lock().unwrap().push_back(reply);
  }

  fn calls(&self) -> Vec<Call> { self.calls.lock().unwrap().clone() }

  fn gate(&self) -> Gate {
    let gate = Gate::default();
    *self.gate.lock().unwrap() = Some(gate.clone());
    gate
  }

  async fn reply(&self, call: Call) -> Result<Receipt, FakeError> {
    self.calls.lock().unwrap().push(call);
    let gate = self.gate.lock().unwrap().clone();
    if let Some(gate) = gate {
      gate.started.notify_one();
      gate.release.notified().await;
    }
    self
      .replies
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or(Ok(Receipt::default()))
  }
}

impl EngagementApi for ScriptedApi {
  type Error = FakeError;

  async fn list_memes<'a>(
    &'a self,
    _: &'a FeedQuery,
    _: Option<&'a UserId>,
  ) -> Result<FeedPage, FakeError> {
    self.list_calls.fetch_add(1, Ordering::SeqCst);
    let mut pages = self.pages.lock().unwrap();
    // The last scripted page repeats forever.
    let page = if pages.len() > 1 { pages.pop_front() } else { pages.front().cloned() };
    page.ok_or(FakeError::Transport)
  }

  async fn get_meme<'a>(
    &'a self,
    _: &'a MemeId,
    _: Option<&'a UserId>,
  ) -> Result<Option<Meme>, FakeError> {
    Ok(None)
  }

  async fn related_tags<'a>(
    &'a self,
    _: &'a str,
    _: usize,
  ) -> Result<Vec<RelatedTag>, FakeError> {
    Ok(Vec::new())
  }

  async fn list_leaderboard<'a>(
    &'a self,
    _: &'a LeaderboardQuery,
  ) -> Result<LeaderboardPage, FakeError> {
    Ok(LeaderboardPage::default())
  }

  async fn rewards<'a>(
    &'a self,
    track: RewardTrack,
    _: &'a UserId,
  ) -> Result<RewardSummary, FakeError> {
    Ok(RewardSummary { track, total: 0, majority: 0, records: Vec::new() })
  }

  async fn toggle_vote<'a>(
    &'a self,
    _: &'a MemeId,
    _: &'a UserId,
    cast: bool,
  ) -> Result<Receipt, FakeError> {
    self.reply(Call::Vote { cast }).await
  }

  async fn toggle_bookmark<'a>(
    &'a self,
    _: &'a MemeId,
    _: &'a UserId,
  ) -> Result<Receipt, FakeError> {
    self.reply(Call::Bookmark).await
  }

  async fn record_share<'a>(
    &'a self,
    _: &'a MemeId,
    _: &'a UserId,
  ) -> Result<Receipt, FakeError> {
    self.reply(Call::Share).await
  }
}

#[derive(Default)]
struct MemoryCache {
  hints: Mutex<BTreeMap<MemeId, BookmarkHint>>,
}

impl MemoryCache {
  fn holds(&self, id: &MemeId) -> bool {
    self.hints.lock().unwrap().contains_key(id)
  }
}

impl BookmarkCache for MemoryCache {
  type Error = FakeError;

  async fn insert(&self, hint: BookmarkHint) -> Result<(), FakeError> {
    self.hints.lock().unwrap().insert(hint.meme_id.clone(), hint);
    Ok(())
  }

  async fn remove<'a>(&'a self, id: &'a MemeId) -> Result<(), FakeError> {
    self.hints.lock().unwrap().remove(id);
    Ok(())
  }

  async fn list(&self) -> Result<Vec<BookmarkHint>, FakeError> {
    let mut hints: Vec<_> = self.hints.lock().unwrap().values().cloned().collect();
    hints.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
    Ok(hints)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

type Engine = EngagementEngine<ScriptedApi, MemoryCache>;

fn meme(id: &str, owner: &str, counters: Counters) -> Meme {
  Meme {
    id: MemeId::new(id),
    name: format!("meme {id}"),
    image_url: format!("https://img.example/{id}.png"),
    owner: Owner { id: UserId::new(owner), username: None },
    tags: Vec::new(),
    counters,
    created_at: Utc::now(),
    in_percentile: None,
    is_onchain: false,
  }
}

fn votes(vote_count: u64, has_user_voted: bool) -> Counters {
  Counters { vote_count, has_user_voted, ..Counters::default() }
}

fn engine(viewer: Option<&str>, counters: Counters) -> Engine {
  let engine = EngagementEngine::new(
    ScriptedApi::default(),
    MemoryCache::default(),
    viewer.map(UserId::new),
  );
  engine.store().upsert(meme("m1", "A", counters));
  engine
}

fn m1() -> MemeId { MemeId::new("m1") }

fn page(total: u64) -> FeedPage {
  FeedPage {
    memes: vec![meme(&format!("p{total}"), "A", Counters::default())],
    total,
  }
}

// ─── Vote ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_vote_rolls_back_after_optimistic_increment() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();
  engine.api().reply_with(Err(FakeError::Transport));

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });

  gate.started.notified().await;
  assert_eq!(engine.store().counters(&m1()), Some(votes(6, true)));
  assert_eq!(engine.phase(&m1(), Action::Vote), Phase::Optimistic);

  gate.release.notify_one();
  let outcome = task.await.unwrap().unwrap();

  assert_eq!(outcome.phase, Phase::RolledBack);
  assert_eq!(outcome.counters, votes(5, false));
  assert_eq!(engine.store().counters(&m1()), Some(votes(5, false)));
  assert_eq!(outcome.notice.level, NoticeLevel::Error);
  assert_eq!(engine.phase(&m1(), Action::Vote), Phase::Idle);
}

#[tokio::test]
async fn owner_cannot_vote_and_no_request_is_made() {
  let engine = engine(Some("A"), votes(5, false));

  let err = engine.vote(&m1()).await.unwrap_err();

  assert_eq!(err, EngagementError::OwnContent);
  assert_eq!(engine.store().counters(&m1()), Some(votes(5, false)));
  assert!(engine.api().calls().is_empty());
}

#[tokio::test]
async fn anonymous_viewer_is_sent_to_login() {
  let engine = engine(None, votes(5, false));

  for action in [Action::Vote, Action::Bookmark, Action::Share] {
    let err = engine.engage(action, &m1()).await.unwrap_err();
    assert_eq!(err, EngagementError::AuthRequired);
  }
  assert!(engine.api().calls().is_empty());
  assert_eq!(engine.store().counters(&m1()), Some(votes(5, false)));
}

#[tokio::test]
async fn two_successful_votes_round_trip() {
  let engine = engine(Some("B"), votes(5, false));

  let first = engine.vote(&m1()).await.unwrap();
  assert_eq!(first.phase, Phase::Confirmed);
  assert_eq!(first.counters, votes(6, true));
  assert_eq!(first.notice.message, "Vote cast successfully!");

  let second = engine.vote(&m1()).await.unwrap();
  assert_eq!(second.counters, votes(5, false));

  assert_eq!(
    engine.api().calls(),
    vec![Call::Vote { cast: true }, Call::Vote { cast: false }]
  );
}

#[tokio::test]
async fn server_count_overrides_optimistic_count() {
  let engine = engine(Some("B"), votes(5, false));
  engine
    .api()
    .reply_with(Ok(Receipt { count: Some(12), active: None }));

  let outcome = engine.vote(&m1()).await.unwrap();
  assert_eq!(outcome.counters, votes(12, true));
}

#[tokio::test]
async fn own_content_rejection_uses_server_message() {
  let engine = engine(Some("B"), votes(5, false));
  engine.api().reply_with(Err(FakeError::Status(
    403,
    "You cannot vote on your own meme".into(),
  )));

  let outcome = engine.vote(&m1()).await.unwrap();
  assert_eq!(outcome.phase, Phase::RolledBack);
  assert_eq!(outcome.notice.message, "You cannot vote on your own meme");
}

#[tokio::test]
async fn already_voted_rejection_is_reported() {
  let engine = engine(Some("B"), votes(5, false));
  engine.api().reply_with(Err(FakeError::Status(
    400,
    "User has already voted for this meme".into(),
  )));

  let outcome = engine.vote(&m1()).await.unwrap();
  assert_eq!(outcome.counters, votes(5, false));
  assert_eq!(outcome.notice.message, "Already voted to this meme");
}

#[tokio::test]
async fn unauthorized_response_rolls_back_and_asks_for_login() {
  let engine = engine(Some("B"), votes(5, false));
  engine
    .api()
    .reply_with(Err(FakeError::Status(401, "Unauthorized".into())));

  let err = engine.vote(&m1()).await.unwrap_err();
  assert_eq!(err, EngagementError::AuthRequired);
  assert_eq!(engine.store().counters(&m1()), Some(votes(5, false)));
}

#[tokio::test]
async fn unknown_meme_is_refused() {
  let engine = engine(Some("B"), votes(5, false));
  let err = engine.vote(&MemeId::new("nope")).await.unwrap_err();
  assert_eq!(err, EngagementError::UnknownMeme(MemeId::new("nope")));
}

// ─── In-flight tracking ──────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_vote_while_in_flight_is_rejected() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;

  let err = engine.vote(&m1()).await.unwrap_err();
  assert_eq!(
    err,
    EngagementError::InFlight { meme: m1(), action: Action::Vote }
  );

  gate.release.notify_one();
  task.await.unwrap().unwrap();

  assert_eq!(engine.api().calls().len(), 1);
  assert_eq!(engine.store().counters(&m1()), Some(votes(6, true)));
}

#[tokio::test]
async fn different_actions_may_overlap() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;

  // Bookmark is a different key; it goes through the same gate.
  let bookmark = tokio::spawn({
    let engine = engine.clone();
    async move { engine.bookmark(&m1()).await }
  });
  gate.started.notified().await;

  gate.release.notify_one();
  gate.release.notify_one();
  let _ = task.await.unwrap().unwrap();
  let _ = bookmark.await.unwrap();

  let counters = engine.store().counters(&m1()).unwrap();
  assert!(counters.has_user_voted);
  assert!(counters.is_bookmarked);
}

#[tokio::test]
async fn dropped_request_releases_its_key() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;
  assert_eq!(engine.phase(&m1(), Action::Vote), Phase::Optimistic);

  task.abort();
  assert!(task.await.unwrap_err().is_cancelled());

  assert_eq!(engine.phase(&m1(), Action::Vote), Phase::Idle);
  // The optimistic state stays until the next authoritative fetch.
  assert_eq!(engine.store().counters(&m1()), Some(votes(6, true)));
}

#[tokio::test]
async fn refresh_during_flight_wins_over_rollback() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();
  engine.api().reply_with(Err(FakeError::Transport));

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;

  engine.store().upsert(meme("m1", "A", votes(9, true)));

  gate.release.notify_one();
  let outcome = task.await.unwrap().unwrap();
  assert_eq!(outcome.phase, Phase::RolledBack);
  assert_eq!(engine.store().counters(&m1()), Some(votes(9, true)));
}

#[tokio::test]
async fn refresh_during_flight_does_not_split_count_and_flag() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();
  engine
    .api()
    .reply_with(Ok(Receipt { count: None, active: Some(true) }));

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;

  // A poll lands with the pre-vote state.
  engine.store().upsert(meme("m1", "A", votes(5, false)));

  gate.release.notify_one();
  let outcome = task.await.unwrap().unwrap();
  assert_eq!(outcome.phase, Phase::Confirmed);
  assert_eq!(engine.store().counters(&m1()), Some(votes(6, true)));
}

#[tokio::test]
async fn refresh_that_already_counts_the_vote_is_kept() {
  let engine = engine(Some("B"), votes(5, false));
  let gate = engine.api().gate();
  engine
    .api()
    .reply_with(Ok(Receipt { count: None, active: Some(true) }));

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.vote(&m1()).await }
  });
  gate.started.notified().await;

  engine.store().upsert(meme("m1", "A", votes(8, true)));

  gate.release.notify_one();
  task.await.unwrap().unwrap();
  assert_eq!(engine.store().counters(&m1()), Some(votes(8, true)));
}

// ─── Bookmark ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn bookmark_succeeds_and_caches_hint() {
  let engine = engine(Some("B"), Counters::default());

  let outcome = engine.bookmark(&m1()).await.unwrap();

  assert_eq!(outcome.phase, Phase::Confirmed);
  assert_eq!(outcome.counters.bookmark_count, 1);
  assert!(outcome.counters.is_bookmarked);
  assert!(engine.cache().holds(&m1()));
}

#[tokio::test]
async fn stale_bookmark_follows_the_server_direction() {
  // The view shows no bookmark, but the server already had one and the
  // toggle removed it.
  let engine = engine(
    Some("B"),
    Counters { bookmark_count: 3, is_bookmarked: false, ..Counters::default() },
  );
  let shown = engine.store().get(&m1()).unwrap();
  engine
    .cache()
    .insert(BookmarkHint::for_meme(&shown, Utc::now()))
    .await
    .unwrap();
  engine
    .api()
    .reply_with(Ok(Receipt { count: None, active: Some(false) }));

  let outcome = engine.bookmark(&m1()).await.unwrap();

  assert_eq!(outcome.phase, Phase::Confirmed);
  assert_eq!(outcome.counters.bookmark_count, 2);
  assert!(!outcome.counters.is_bookmarked);
  assert_eq!(outcome.notice.message, "Bookmark removed");
  assert!(!engine.cache().holds(&m1()));
}

#[tokio::test]
async fn hint_is_written_after_the_server_answers() {
  let engine = engine(Some("B"), Counters::default());
  let gate = engine.api().gate();

  let task = tokio::spawn({
    let engine = engine.clone();
    async move { engine.bookmark(&m1()).await }
  });
  gate.started.notified().await;
  assert!(engine.store().counters(&m1()).unwrap().is_bookmarked);
  assert!(!engine.cache().holds(&m1()));

  gate.release.notify_one();
  task.await.unwrap().unwrap();
  assert!(engine.cache().holds(&m1()));
  assert_eq!(engine.cache().list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn owner_may_bookmark() {
  let engine = engine(Some("A"), Counters::default());
  let outcome = engine.bookmark(&m1()).await.unwrap();
  assert!(outcome.counters.is_bookmarked);
}

#[tokio::test]
async fn failed_bookmark_restores_count_and_leaves_hint_alone() {
  let engine = engine(Some("B"), Counters::default());
  engine.api().reply_with(Err(FakeError::Transport));

  let outcome = engine.bookmark(&m1()).await.unwrap();

  assert_eq!(outcome.phase, Phase::RolledBack);
  assert_eq!(outcome.counters, Counters::default());
  assert!(!engine.cache().holds(&m1()));
  assert_eq!(outcome.notice.message, "Could not update your bookmark");
}

#[tokio::test]
async fn unbookmark_at_zero_clamps() {
  let engine = engine(
    Some("B"),
    Counters { bookmark_count: 0, is_bookmarked: true, ..Counters::default() },
  );

  let outcome = engine.bookmark(&m1()).await.unwrap();
  assert_eq!(outcome.counters.bookmark_count, 0);
  assert!(!outcome.counters.is_bookmarked);
  assert_eq!(outcome.notice.message, "Bookmark removed");
}

#[tokio::test]
async fn bookmark_leaves_votes_untouched() {
  let engine = engine(Some("B"), votes(3, true));
  let outcome = engine.bookmark(&m1()).await.unwrap();
  assert_eq!(outcome.counters.vote_count, 3);
  assert!(outcome.counters.has_user_voted);
}

// ─── Share ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn failed_share_keeps_the_increment() {
  let engine = engine(
    Some("B"),
    Counters { share_count: 4, ..Counters::default() },
  );
  engine.api().reply_with(Err(FakeError::Transport));

  let outcome = engine.share(&m1()).await.unwrap();

  assert_eq!(outcome.phase, Phase::Kept);
  assert_eq!(outcome.counters.share_count, 5);
  assert!(outcome.notice.is_error());
}

#[tokio::test]
async fn successful_share_increments() {
  let engine = engine(
    Some("A"),
    Counters { share_count: 4, ..Counters::default() },
  );
  let outcome = engine.share(&m1()).await.unwrap();
  assert_eq!(outcome.phase, Phase::Confirmed);
  assert_eq!(outcome.counters.share_count, 5);
  assert_eq!(engine.api().calls(), vec![Call::Share]);
}

// ─── Refresh & polling ───────────────────────────────────────────────────────

#[tokio::test]
async fn refresh_upserts_into_the_store() {
  let engine = engine(Some("B"), votes(5, false));
  engine.api().pages.lock().unwrap().push_back(FeedPage {
    memes: vec![meme("m1", "A", votes(8, true)), meme("m2", "C", votes(1, false))],
    total: 2,
  });

  let page = engine.refresh(&FeedQuery::default()).await.unwrap();

  assert_eq!(page.total, 2);
  assert_eq!(engine.store().len(), 2);
  assert_eq!(engine.store().counters(&m1()), Some(votes(8, true)));
}

#[tokio::test]
async fn poller_flags_new_content_when_total_changes() {
  let engine = engine(Some("B"), votes(5, false));
  {
    let mut pages = engine.api().pages.lock().unwrap();
    pages.push_back(page(1));
    pages.push_back(page(2));
  }

  let poller = FeedPoller::spawn(
    engine.clone(),
    PollerConfig {
      interval: Duration::from_millis(10),
      query:    FeedQuery::default(),
    },
    Some(1),
  );
  let mut rx = poller.subscribe();

  let raised = timeout(Duration::from_secs(2), rx.wait_for(|v| *v))
    .await
    .expect("flag raised in time")
    .map(|v| *v)
    .unwrap();
  assert!(raised);
  assert!(poller.has_new_content());
  assert!(engine.store().get(&MemeId::new("p2")).is_some());

  poller.acknowledge();
  assert!(!poller.has_new_content());
}

#[tokio::test]
async fn paused_poller_does_not_fetch() {
  let engine = engine(Some("B"), votes(5, false));
  engine.api().pages.lock().unwrap().push_back(page(1));

  let poller = FeedPoller::spawn(
    engine.clone(),
    PollerConfig {
      interval: Duration::from_millis(10),
      query:    FeedQuery::default(),
    },
    None,
  );
  poller.pause();
  assert!(poller.is_paused());

  tokio::time::sleep(Duration::from_millis(60)).await;
  assert_eq!(engine.api().list_calls.load(Ordering::SeqCst), 0);

  poller.resume();
  timeout(Duration::from_secs(2), async {
    while engine.api().list_calls.load(Ordering::SeqCst) == 0 {
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  })
  .await
  .expect("poll after resume");
}

#[tokio::test]
async fn dropping_the_poller_stops_it() {
  let engine = engine(Some("B"), votes(5, false));
  engine.api().pages.lock().unwrap().push_back(page(1));

  let poller = FeedPoller::spawn(
    engine.clone(),
    PollerConfig {
      interval: Duration::from_millis(10),
      query:    FeedQuery::default(),
    },
    None,
  );
  drop(poller);

  tokio::time::sleep(Duration::from_millis(50)).await;
  assert_eq!(engine.api().list_calls.load(Ordering::SeqCst), 0);
}
