//! Runtime settings, layered from an optional TOML file and `ARISTHROTTLE_*`
//! environment variables. Command-line flags are applied on top by `main`.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use aristhrottle_engine::DEFAULT_POLL_INTERVAL;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub api_url:            String,
  /// Bearer token sent with every request.
  pub token:              Option<String>,
  /// The signed-in user. Without it every engagement asks for a login.
  pub user_id:            Option<String>,
  pub cache_path:         PathBuf,
  pub poll_interval_secs: u64,
  pub log_file:           PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      api_url:            DEFAULT_API_URL.into(),
      token:              None,
      user_id:            None,
      cache_path:         PathBuf::from("~/.cache/aristhrottle/bookmarks.db"),
      poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
      log_file:           PathBuf::from("~/.cache/aristhrottle/aristhrottle.log"),
    }
  }
}

impl Settings {
  /// Read `file` (if it exists) and the environment.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("ARISTHROTTLE"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  /// Never shorter than one second.
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_secs.max(1))
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
