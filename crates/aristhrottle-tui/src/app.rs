//! Application state machine and event dispatcher.

use aristhrottle_cache_sqlite::SqliteBookmarkCache;
use aristhrottle_client::ApiClient;
use aristhrottle_core::{
  api::{
    EngagementApi, FeedQuery, LeaderboardEntry, LeaderboardQuery,
    RELATED_TAGS_LIMIT,
  },
  cache::{BookmarkCache, BookmarkHint},
  cooccurrence::CooccurrenceTable,
  engagement::Action,
  feed::{FeedFilter, FeedTab, SortCriteria, SortField, parse_tag_input},
  meme::{Meme, MemeId},
  milestones::{RewardSummary, RewardTrack},
};
use aristhrottle_engine::{
  EngagementEngine, EngagementError, FeedPoller, Notice, Outcome, PollerConfig,
};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

pub type Engine = EngagementEngine<ApiClient, SqliteBookmarkCache>;

pub const LOGIN_HINT: &str =
  "Sign in required: start with --user-id and --token to vote, bookmark or share";

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Focus on the feed; the right pane previews the cursor meme.
  Feed,
  /// Focus on the detail pane.
  Detail,
}

/// Which list the left pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Feed,
  /// Closed memes ranked by votes.
  Leaderboard,
  /// Bookmarks remembered locally.
  Saved,
  /// Milestone progress of the viewer.
  Rewards,
}

impl View {
  pub const ALL: [Self; 4] = [Self::Feed, Self::Leaderboard, Self::Saved, Self::Rewards];

  fn next(self) -> Self {
    match self {
      Self::Feed => Self::Leaderboard,
      Self::Leaderboard => Self::Saved,
      Self::Saved => Self::Rewards,
      Self::Rewards => Self::Feed,
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Feed => "Feed",
      Self::Leaderboard => "Leaderboard",
      Self::Saved => "Saved",
      Self::Rewards => "Rewards",
    }
  }
}

/// What printable keys currently type into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
  Normal,
  /// Fuzzy search over names and tags.
  Search,
  /// Comma-separated tag filter.
  Tags,
}

/// An engagement task that finished in the background.
#[derive(Debug)]
pub struct Settled {
  pub meme:   MemeId,
  pub action: Action,
  pub result: aristhrottle_engine::Result<Outcome>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub view:   View,
  pub screen: Screen,
  pub input:  Input,

  /// Feed order as fetched; the memes themselves live in the engine store.
  pub feed:  Vec<MemeId>,
  /// Server-side total reported by the last full refresh.
  pub total: u64,
  /// Pages loaded so far.
  pub page:  usize,

  pub filter:    FeedFilter,
  pub sort:      SortCriteria,
  pub search:    String,
  pub tag_input: String,

  /// Cursor position within the rows of the current view.
  pub list_cursor: usize,

  /// Meme shown in the detail pane.
  pub selected: Option<MemeId>,

  /// Tags seen together with the selected meme's first tag.
  pub related: Vec<(String, u64)>,

  pub leaderboard:       Vec<LeaderboardEntry>,
  pub leaderboard_daily: bool,
  /// Bookmark hints from the local cache, most recent first.
  pub saved:             Vec<BookmarkHint>,
  pub rewards:           Vec<RewardSummary>,

  /// Last notice, shown in the status bar until the next one.
  pub notice:      Option<Notice>,
  pub new_content: bool,

  pub engine: Engine,

  poll:           PollerConfig,
  poller:         Option<FeedPoller>,
  new_content_rx: Option<watch::Receiver<bool>>,
  settled_tx:     mpsc::UnboundedSender<Settled>,
  settled_rx:     mpsc::UnboundedReceiver<Settled>,
}

impl App {
  pub fn new(engine: Engine, poll: PollerConfig) -> Self {
    let (settled_tx, settled_rx) = mpsc::unbounded_channel();
    Self {
      view: View::Feed,
      screen: Screen::Feed,
      input: Input::Normal,
      feed: Vec::new(),
      total: 0,
      page: 1,
      filter: FeedFilter::default(),
      sort: SortCriteria::default(),
      search: String::new(),
      tag_input: String::new(),
      list_cursor: 0,
      selected: None,
      related: Vec::new(),
      leaderboard: Vec::new(),
      leaderboard_daily: false,
      saved: Vec::new(),
      rewards: Vec::new(),
      notice: None,
      new_content: false,
      engine,
      poll,
      poller: None,
      new_content_rx: None,
      settled_tx,
      settled_rx,
    }
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  /// Fetch the first page and restart the poller from its total.
  pub async fn refresh_feed(&mut self) {
    match self.engine.refresh(&FeedQuery::default()).await {
      Ok(page) => {
        self.feed = page.memes.iter().map(|m| m.id.clone()).collect();
        self.total = page.total;
        self.page = 1;
        self.list_cursor = 0;
        self.new_content = false;
        self.start_poller(Some(page.total));
      }
      Err(e) => {
        warn!(error = %e, "feed refresh failed");
        self.notice = Some(Notice::error(format!("Could not load memes: {e}")));
        if self.poller.is_none() {
          self.start_poller(None);
        }
      }
    }
  }

  /// Append the next page.
  async fn load_more(&mut self) {
    let query = FeedQuery { page: self.page + 1, ..FeedQuery::default() };
    match self.engine.refresh(&query).await {
      Ok(page) => {
        self.page = query.page;
        for meme in page.memes {
          if !self.feed.contains(&meme.id) {
            self.feed.push(meme.id);
          }
        }
      }
      Err(e) => {
        self.notice = Some(Notice::error(format!("Could not load more: {e}")));
      }
    }
  }

  async fn load_leaderboard(&mut self) {
    let query =
      LeaderboardQuery { daily: self.leaderboard_daily, ..LeaderboardQuery::default() };
    match self.engine.api().list_leaderboard(&query).await {
      Ok(page) => self.leaderboard = page.entries,
      Err(e) => {
        warn!(error = %e, "leaderboard fetch failed");
        self.notice = Some(Notice::error(format!("Could not load leaderboard: {e}")));
      }
    }
  }

  /// Reload the bookmark hints. The cache is best effort: failures are
  /// logged and the previous list stays.
  pub async fn load_saved(&mut self) {
    match self.engine.cache().list().await {
      Ok(saved) => self.saved = saved,
      Err(e) => warn!(error = %e, "bookmark hint cache read failed"),
    }
  }

  async fn load_rewards(&mut self) {
    let Some(viewer) = self.engine.viewer().cloned() else {
      self.rewards.clear();
      self.notice = Some(Notice::error(LOGIN_HINT));
      return;
    };

    let mut rewards = Vec::new();
    for track in [RewardTrack::Votes, RewardTrack::Uploads] {
      match self.engine.api().rewards(track, &viewer).await {
        Ok(summary) => rewards.push(summary),
        Err(e) => {
          warn!(track = track.label(), error = %e, "rewards fetch failed");
          self.notice = Some(Notice::error(format!("Could not load rewards: {e}")));
        }
      }
    }
    self.rewards = rewards;
  }

  /// Show `view` and fetch what it lists.
  async fn switch_view(&mut self, view: View) {
    self.view = view;
    self.screen = Screen::Feed;
    self.selected = None;
    self.related.clear();
    self.list_cursor = 0;
    self.reload_view().await;
  }

  async fn reload_view(&mut self) {
    match self.view {
      View::Feed => self.refresh_feed().await,
      View::Leaderboard => self.load_leaderboard().await,
      View::Saved => self.load_saved().await,
      View::Rewards => self.load_rewards().await,
    }
  }

  fn start_poller(&mut self, baseline: Option<u64>) {
    let paused = self.poller.as_ref().is_some_and(FeedPoller::is_paused);
    let poller =
      FeedPoller::spawn(self.engine.clone(), self.poll.clone(), baseline);
    if paused {
      poller.pause();
    }
    self.new_content_rx = Some(poller.subscribe());
    self.poller = Some(poller);
  }

  /// Stop polling while the terminal is not visible.
  pub fn set_visible(&mut self, visible: bool) {
    if let Some(poller) = &self.poller {
      if visible {
        poller.resume();
      } else {
        poller.pause();
      }
    }
  }

  /// Apply finished background work. Called once per frame.
  pub async fn tick(&mut self) {
    let mut bookmarks_changed = false;
    while let Ok(settled) = self.settled_rx.try_recv() {
      bookmarks_changed |=
        settled.action == Action::Bookmark && settled.result.is_ok();
      self.settle(settled);
    }
    if bookmarks_changed {
      self.load_saved().await;
    }
    if let Some(rx) = &mut self.new_content_rx
      && rx.has_changed().unwrap_or(false)
    {
      self.new_content = *rx.borrow_and_update();
    }
  }

  fn settle(&mut self, settled: Settled) {
    match settled.result {
      Ok(outcome) => {
        debug!(meme = %outcome.meme_id, action = %outcome.action, phase = ?outcome.phase, "settled");
        self.notice = Some(outcome.notice);
      }
      Err(EngagementError::AuthRequired) => {
        self.notice = Some(Notice::error(LOGIN_HINT));
      }
      Err(EngagementError::OwnContent) => {
        self.notice = Some(Notice::error(EngagementError::OwnContent.to_string()));
      }
      Err(EngagementError::InFlight { .. }) => {
        debug!(meme = %settled.meme, action = %settled.action, "ignored repeat");
      }
      Err(e @ EngagementError::UnknownMeme(_)) => {
        warn!(error = %e, "engagement on a meme that is not loaded");
      }
    }
  }

  /// Load the detail pane for `id`: a fresh copy plus related tags.
  async fn open_detail(&mut self, id: MemeId) {
    if let Err(e) = self.engine.load(&id).await {
      warn!(meme = %id, error = %e, "detail refresh failed");
    }
    self.related = self.related_tags(&id).await;
    self.selected = Some(id);
    self.screen = Screen::Detail;
  }

  /// Ask the server for tags co-occurring with the meme's first tag; fall
  /// back to counting over the loaded feed.
  async fn related_tags(&self, id: &MemeId) -> Vec<(String, u64)> {
    let Some(meme) = self.engine.store().get(id) else { return Vec::new() };
    let Some(tag) = meme.tags.first() else { return Vec::new() };

    if let Some(tag_id) = &tag.id {
      match self.engine.api().related_tags(tag_id, RELATED_TAGS_LIMIT).await {
        Ok(related) if !related.is_empty() => {
          return related
            .into_iter()
            .map(|r| (r.tag_name, r.cooccurrence_count))
            .collect();
        }
        Ok(_) => {}
        Err(e) => warn!(tag = %tag.name, error = %e, "related tags fetch failed"),
      }
    }

    let memes = self.engine.store().snapshot(&self.feed);
    CooccurrenceTable::from_memes(&memes).related(&tag.name, RELATED_TAGS_LIMIT)
  }

  // ── Engagement ────────────────────────────────────────────────────────────

  /// Run `action` on the focused meme in the background.
  fn engage(&mut self, action: Action) {
    let target = match self.screen {
      Screen::Detail => self.selected.clone(),
      Screen::Feed => self.cursor_id(),
    };
    let Some(meme) = target else { return };

    let engine = self.engine.clone();
    let tx = self.settled_tx.clone();
    tokio::spawn(async move {
      // Leaderboard and saved rows may not be in the store yet.
      if engine.store().get(&meme).is_none()
        && let Err(e) = engine.load(&meme).await
      {
        warn!(meme = %meme, error = %e, "could not load meme before engaging");
      }
      let result = engine.engage(action, &meme).await;
      // The receiver only disappears on shutdown.
      let _ = tx.send(Settled { meme, action, result });
    });
  }

  // ── Visible feed ──────────────────────────────────────────────────────────

  /// The feed after filtering, searching and sorting.
  pub fn visible(&self) -> Vec<Meme> {
    let memes = self.engine.store().snapshot(&self.feed);
    let mut kept = self.filter.apply(&memes, self.engine.viewer(), Utc::now());

    if !self.search.is_empty() {
      let matcher = SkimMatcherV2::default();
      kept.retain(|m| {
        matcher.fuzzy_match(&m.name, &self.search).is_some()
          || m
            .tag_names()
            .any(|t| matcher.fuzzy_match(t, &self.search).is_some())
      });
    }

    self.sort.sort(&mut kept);
    kept.into_iter().cloned().collect()
  }

  /// Ids of the rows the current view lists, in display order.
  pub fn row_ids(&self) -> Vec<MemeId> {
    match self.view {
      View::Feed => self.visible().into_iter().map(|m| m.id).collect(),
      View::Leaderboard => {
        self.leaderboard.iter().map(|e| e.meme.id.clone()).collect()
      }
      View::Saved => self.saved.iter().map(|h| h.meme_id.clone()).collect(),
      View::Rewards => Vec::new(),
    }
  }

  pub fn cursor_id(&self) -> Option<MemeId> {
    self.row_ids().into_iter().nth(self.list_cursor)
  }

  /// The meme under the cursor: the stored copy when there is one, else the
  /// leaderboard's.
  pub fn cursor_meme(&self) -> Option<Meme> {
    let id = self.cursor_id()?;
    self.engine.store().get(&id).or_else(|| {
      self
        .leaderboard
        .iter()
        .find(|e| e.meme.id == id)
        .map(|e| e.meme.clone())
    })
  }

  pub fn selected_meme(&self) -> Option<Meme> {
    self.selected.as_ref().and_then(|id| self.engine.store().get(id))
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.input {
      Input::Search => self.handle_search_key(key),
      Input::Tags => self.handle_tags_key(key),
      Input::Normal => return self.handle_normal_key(key).await,
    }
    Ok(true)
  }

  fn handle_search_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input = Input::Normal;
        self.search.clear();
      }
      KeyCode::Enter => self.input = Input::Normal,
      KeyCode::Backspace => {
        self.search.pop();
      }
      KeyCode::Char(c) => self.search.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  fn handle_tags_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input = Input::Normal;
        self.tag_input = self.filter.tags.join(", ");
      }
      KeyCode::Enter => {
        self.input = Input::Normal;
        self.filter.tags = parse_tag_input(&self.tag_input);
      }
      KeyCode::Backspace => {
        self.tag_input.pop();
      }
      KeyCode::Char(c) => self.tag_input.push(c),
      _ => return,
    }
    self.list_cursor = 0;
  }

  async fn handle_normal_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        let len = self.row_ids().len();
        if self.list_cursor + 1 < len {
          self.list_cursor += 1;
        }
        if self.screen == Screen::Detail
          && let Some(id) = self.cursor_id()
        {
          self.open_detail(id).await;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.list_cursor = self.list_cursor.saturating_sub(1);
        if self.screen == Screen::Detail
          && let Some(id) = self.cursor_id()
        {
          self.open_detail(id).await;
        }
      }
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(id) = self.cursor_id() {
          self.open_detail(id).await;
        }
      }
      KeyCode::Tab => self.switch_view(self.view.next()).await,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.screen = Screen::Feed;
        self.selected = None;
        self.related.clear();
      }

      // Engagement
      KeyCode::Char('v') => self.engage(Action::Vote),
      KeyCode::Char('b') => self.engage(Action::Bookmark),
      KeyCode::Char('s') => self.engage(Action::Share),

      // Filtering and sorting
      KeyCode::Char('/') => {
        self.input = Input::Search;
        self.search.clear();
        self.list_cursor = 0;
      }
      KeyCode::Char('#') => {
        self.input = Input::Tags;
        self.tag_input = self.filter.tags.join(", ");
      }
      KeyCode::Char('1') => self.set_tab(FeedTab::Live),
      KeyCode::Char('2') => self.set_tab(FeedTab::Daily),
      KeyCode::Char('3') => self.set_tab(FeedTab::All),
      KeyCode::Char('t') => self.sort = self.sort.cycle(SortField::Time),
      KeyCode::Char('o') => self.sort = self.sort.cycle(SortField::Votes),
      KeyCode::Char('u') => {
        self.filter.uninteracted_only = !self.filter.uninteracted_only;
        self.list_cursor = 0;
      }
      KeyCode::Char('c') => {
        self.filter.reset();
        self.search.clear();
        self.tag_input.clear();
        self.sort = SortCriteria::default();
        self.list_cursor = 0;
      }

      // Fetching
      KeyCode::Char('r') => {
        if self.view == View::Feed
          && let Some(poller) = &self.poller
        {
          poller.acknowledge();
        }
        self.reload_view().await;
      }
      KeyCode::Char('n') => {
        if let Some(poller) = &self.poller {
          poller.acknowledge();
        }
        self.switch_view(View::Feed).await;
      }
      KeyCode::Char('m') if self.view == View::Feed => self.load_more().await,
      KeyCode::Char('d') if self.view == View::Leaderboard => {
        self.leaderboard_daily = !self.leaderboard_daily;
        self.list_cursor = 0;
        self.load_leaderboard().await;
      }

      _ => {}
    }
    Ok(true)
  }

  fn set_tab(&mut self, tab: FeedTab) {
    self.filter.tab = tab;
    self.list_cursor = 0;
  }
}

#[cfg(test)]
mod tests {
  use aristhrottle_client::ApiConfig;
  use aristhrottle_core::meme::{Counters, Owner, Tag, UserId};
  use crossterm::event::KeyEvent;

  use super::*;

  fn meme(id: &str, name: &str, votes: u64, tag: &str) -> Meme {
    Meme {
      id:            MemeId::new(id),
      name:          name.into(),
      image_url:     String::new(),
      owner:         Owner { id: UserId::new("A"), username: None },
      tags:          vec![Tag { id: None, name: tag.into() }],
      counters:      Counters { vote_count: votes, ..Counters::default() },
      created_at:    Utc::now(),
      in_percentile: None,
      is_onchain:    false,
    }
  }

  async fn app(viewer: Option<&str>) -> App {
    let client = ApiClient::new(ApiConfig::new("http://127.0.0.1:1")).unwrap();
    let cache = SqliteBookmarkCache::open_in_memory().await.unwrap();
    let engine = EngagementEngine::new(client, cache, viewer.map(UserId::new));
    let mut app = App::new(engine, PollerConfig::default());
    for m in [
      meme("m1", "cat in space", 3, "cats"),
      meme("m2", "dog at work", 9, "dogs"),
      meme("m3", "frog", 1, "cats"),
    ] {
      app.feed.push(m.id.clone());
      app.engine.store().upsert(m);
    }
    app
  }

  fn key(c: char) -> KeyEvent { KeyEvent::from(KeyCode::Char(c)) }

  fn names(app: &App) -> Vec<String> {
    app.visible().into_iter().map(|m| m.name).collect()
  }

  #[tokio::test]
  async fn vote_sort_cycles() {
    let mut app = app(None).await;

    app.handle_key(key('o')).await.unwrap();
    assert_eq!(names(&app), vec!["frog", "cat in space", "dog at work"]);
    app.handle_key(key('o')).await.unwrap();
    assert_eq!(names(&app), vec!["dog at work", "cat in space", "frog"]);
    app.handle_key(key('o')).await.unwrap();
    assert_eq!(names(&app), vec!["cat in space", "dog at work", "frog"]);
  }

  #[tokio::test]
  async fn tag_input_filters_by_tag() {
    let mut app = app(None).await;

    app.handle_key(key('#')).await.unwrap();
    for c in "cats, ".chars() {
      app.handle_key(key(c)).await.unwrap();
    }
    app.handle_key(KeyEvent::from(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.filter.tags, vec!["cats"]);
    assert_eq!(names(&app), vec!["cat in space", "frog"]);
  }

  #[tokio::test]
  async fn search_is_fuzzy_and_escape_clears_it() {
    let mut app = app(None).await;

    app.handle_key(key('/')).await.unwrap();
    for c in "dgwrk".chars() {
      app.handle_key(key(c)).await.unwrap();
    }
    assert_eq!(names(&app), vec!["dog at work"]);

    app.handle_key(KeyEvent::from(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.input, Input::Normal);
    assert_eq!(names(&app).len(), 3);
  }

  #[tokio::test]
  async fn tabs_switch_the_window() {
    let mut app = app(None).await;
    app.handle_key(key('1')).await.unwrap();
    assert_eq!(app.filter.tab, FeedTab::Live);
    app.handle_key(key('3')).await.unwrap();
    assert_eq!(app.filter.tab, FeedTab::All);
  }

  #[tokio::test]
  async fn signed_out_vote_shows_login_hint() {
    let mut app = app(None).await;

    app.handle_key(key('v')).await.unwrap();
    for _ in 0..100 {
      app.tick().await;
      if app.notice.is_some() {
        break;
      }
      tokio::task::yield_now().await;
    }

    assert_eq!(app.notice, Some(Notice::error(LOGIN_HINT)));
    assert_eq!(app.engine.store().counters(&MemeId::new("m1")).unwrap().vote_count, 3);
  }

  #[tokio::test]
  async fn own_meme_vote_is_refused_locally() {
    let mut app = app(Some("A")).await;

    app.handle_key(key('v')).await.unwrap();
    for _ in 0..100 {
      app.tick().await;
      if app.notice.is_some() {
        break;
      }
      tokio::task::yield_now().await;
    }

    let notice = app.notice.expect("notice");
    assert!(notice.is_error());
    assert_eq!(notice.message, "You cannot vote on your own meme");
  }

  #[tokio::test]
  async fn q_quits() {
    let mut app = app(None).await;
    assert!(!app.handle_key(key('q')).await.unwrap());
  }

  #[tokio::test]
  async fn tab_cycles_through_views() {
    let mut app = app(None).await;
    let mut seen = vec![app.view];
    for _ in 0..4 {
      app.handle_key(KeyEvent::from(KeyCode::Tab)).await.unwrap();
      seen.push(app.view);
    }
    assert_eq!(
      seen,
      vec![View::Feed, View::Leaderboard, View::Saved, View::Rewards, View::Feed]
    );
  }

  #[tokio::test]
  async fn saved_view_lists_cached_bookmarks() {
    let mut app = app(Some("B")).await;
    let m2 = app.engine.store().get(&MemeId::new("m2")).unwrap();
    let m1 = app.engine.store().get(&MemeId::new("m1")).unwrap();
    let now = Utc::now();
    app
      .engine
      .cache()
      .insert(BookmarkHint::for_meme(&m1, now - chrono::Duration::hours(1)))
      .await
      .unwrap();
    app
      .engine
      .cache()
      .insert(BookmarkHint::for_meme(&m2, now))
      .await
      .unwrap();

    app.view = View::Saved;
    app.handle_key(key('r')).await.unwrap();

    assert_eq!(app.row_ids(), vec![MemeId::new("m2"), MemeId::new("m1")]);
    assert_eq!(app.cursor_meme().map(|m| m.name), Some("dog at work".into()));
  }

  #[tokio::test]
  async fn rewards_need_a_session() {
    let mut app = app(None).await;
    app.view = View::Rewards;
    app.handle_key(key('r')).await.unwrap();

    assert!(app.rewards.is_empty());
    assert_eq!(app.notice, Some(Notice::error(LOGIN_HINT)));
    assert!(app.row_ids().is_empty());
  }

  #[tokio::test]
  async fn leaderboard_rows_come_from_its_entries() {
    let mut app = app(None).await;
    app.view = View::Leaderboard;
    app.leaderboard = vec![
      LeaderboardEntry { rank: 1, meme: meme("w1", "winner", 40, "cats") },
      LeaderboardEntry { rank: 2, meme: meme("m2", "dog at work", 9, "dogs") },
    ];

    app.handle_key(key('j')).await.unwrap();
    assert_eq!(app.cursor_id(), Some(MemeId::new("m2")));
    // Prefers the stored copy when the meme is loaded.
    assert_eq!(app.cursor_meme().map(|m| m.counters.vote_count), Some(9));

    app.handle_key(key('k')).await.unwrap();
    assert_eq!(app.cursor_meme().map(|m| m.name), Some("winner".into()));
  }

  #[tokio::test]
  async fn tick_picks_up_the_new_content_flag() {
    let mut app = app(None).await;
    let (tx, rx) = watch::channel(false);
    app.new_content_rx = Some(rx);

    app.tick().await;
    assert!(!app.new_content);

    tx.send_replace(true);
    app.tick().await;
    assert!(app.new_content);

    // Unchanged since the last read.
    app.new_content = false;
    app.tick().await;
    assert!(!app.new_content);
  }
}
