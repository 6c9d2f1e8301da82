//! Error types for `aristhrottle-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("meme record is missing `{0}`")]
  MissingField(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
