//! `aristhrottle` — terminal client for the Aristhrottle meme feed.
//!
//! # Usage
//!
//! ```
//! aristhrottle --api-url https://aristhrottle.example --user-id 65f0... --token ey...
//! aristhrottle --config ~/.config/aristhrottle/config.toml
//! ```

mod app;
mod settings;
mod ui;

use std::{
  fs::OpenOptions,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use anyhow::{Context as _, Result};
use app::{App, Engine};
use aristhrottle_cache_sqlite::SqliteBookmarkCache;
use aristhrottle_client::{ApiClient, ApiConfig, DEFAULT_TIMEOUT};
use aristhrottle_core::{api::FeedQuery, meme::UserId};
use aristhrottle_engine::{EngagementEngine, PollerConfig};
use clap::Parser;
use crossterm::{
  event::{self, DisableFocusChange, EnableFocusChange, Event},
  execute,
  terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::{Settings, expand_tilde};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "aristhrottle", version, about = "Terminal client for the Aristhrottle meme feed")]
struct Args {
  /// Path to a TOML config file.
  #[arg(short, long, value_name = "FILE", default_value = "aristhrottle.toml")]
  config: PathBuf,

  /// Base URL of the Aristhrottle server.
  #[arg(long, env = "ARISTHROTTLE_API_URL")]
  api_url: Option<String>,

  /// Bearer token for authenticated requests.
  #[arg(long, env = "ARISTHROTTLE_TOKEN", hide_env_values = true)]
  token: Option<String>,

  /// Id of the signed-in user.
  #[arg(long, env = "ARISTHROTTLE_USER_ID")]
  user_id: Option<String>,

  /// SQLite file holding the bookmark hint cache.
  #[arg(long, value_name = "FILE")]
  cache_path: Option<PathBuf>,

  /// Seconds between background feed polls.
  #[arg(long)]
  poll_interval_secs: Option<u64>,

  /// File that receives log output.
  #[arg(long, value_name = "FILE")]
  log_file: Option<PathBuf>,
}

impl Args {
  /// Flags win over the file and the environment.
  fn apply(self, settings: &mut Settings) {
    if let Some(url) = self.api_url {
      settings.api_url = url;
    }
    if self.token.is_some() {
      settings.token = self.token;
    }
    if self.user_id.is_some() {
      settings.user_id = self.user_id;
    }
    if let Some(path) = self.cache_path {
      settings.cache_path = path;
    }
    if let Some(secs) = self.poll_interval_secs {
      settings.poll_interval_secs = secs;
    }
    if let Some(path) = self.log_file {
      settings.log_file = path;
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();
  let mut settings = Settings::load(&args.config)?;
  args.apply(&mut settings);

  init_tracing(&expand_tilde(&settings.log_file))?;
  info!(api = %settings.api_url, signed_in = settings.user_id.is_some(), "starting");

  let engine = build_engine(&settings).await?;
  let poll = PollerConfig {
    interval: settings.poll_interval(),
    query:    FeedQuery::default(),
  };
  let mut app = App::new(engine, poll);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen, EnableFocusChange)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  app.refresh_feed().await;
  app.load_saved().await;
  let run_result = run_event_loop(&mut terminal, &mut app).await;

  // Restore terminal regardless of result.
  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

/// Log to a file so output does not tear the UI.
fn init_tracing(path: &Path) -> Result<()> {
  if let Some(dir) = path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating log directory {}", dir.display()))?;
  }
  let file = OpenOptions::new()
    .create(true)
    .append(true)
    .open(path)
    .with_context(|| format!("opening log file {}", path.display()))?;

  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(Mutex::new(file))
    .with_ansi(false)
    .init();
  Ok(())
}

async fn build_engine(settings: &Settings) -> Result<Engine> {
  let client = ApiClient::new(ApiConfig {
    base_url: settings.api_url.clone(),
    token:    settings.token.clone(),
    timeout:  DEFAULT_TIMEOUT,
  })?;

  let cache_path = expand_tilde(&settings.cache_path);
  if let Some(dir) = cache_path.parent() {
    std::fs::create_dir_all(dir)
      .with_context(|| format!("creating cache directory {}", dir.display()))?;
  }
  let cache = SqliteBookmarkCache::open(&cache_path)
    .await
    .with_context(|| format!("failed to open bookmark cache at {cache_path:?}"))?;

  let viewer = settings.user_id.clone().map(UserId::new);
  Ok(EngagementEngine::new(client, cache, viewer))
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.tick().await;
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) => {
        if !app.handle_key(key).await? {
          break;
        }
      }
      Some(Event::FocusLost) => app.set_visible(false),
      Some(Event::FocusGained) => app.set_visible(true),
      _ => {}
    }
  }

  Ok(())
}
