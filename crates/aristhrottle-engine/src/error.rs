//! Error type for `aristhrottle-engine`.

use aristhrottle_core::{
  engagement::{Action, Refusal},
  meme::MemeId,
};
use thiserror::Error;

/// Why an engagement action did not reach the server, or the server said
/// the viewer has to log in first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngagementError {
  #[error("authentication required")]
  AuthRequired,

  #[error("You cannot vote on your own meme")]
  OwnContent,

  #[error("a {action} request for {meme} is already in flight")]
  InFlight { meme: MemeId, action: Action },

  #[error("meme not loaded: {0}")]
  UnknownMeme(MemeId),
}

impl From<Refusal> for EngagementError {
  fn from(refusal: Refusal) -> Self {
    match refusal {
      Refusal::AuthRequired => Self::AuthRequired,
      Refusal::OwnContent => Self::OwnContent,
    }
  }
}

pub type Result<T, E = EngagementError> = std::result::Result<T, E>;
