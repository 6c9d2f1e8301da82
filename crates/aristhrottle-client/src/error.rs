use aristhrottle_core::api::{ApiFailure, Failure};
use thiserror::Error;

/// Errors returned by [`ApiClient`](crate::ApiClient).
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client")]
  Build(#[source] reqwest::Error),

  #[error("{method} {path} failed")]
  Transport {
    method: reqwest::Method,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  /// Non-success status. `message` is the `message` (or `error`) field of
  /// the body when there is one.
  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  reqwest::Method,
    path:    String,
    status:  u16,
    message: String,
  },

  #[error("decoding response of {path}")]
  Decode {
    path:   String,
    #[source]
    source: serde_json::Error,
  },

  #[error(transparent)]
  Record(#[from] aristhrottle_core::Error),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

impl ApiFailure for ClientError {
  fn failure(&self) -> Failure {
    match self {
      ClientError::Status { status: 401, .. } => Failure::Unauthorized,
      ClientError::Status { status: 404, .. } => Failure::NotFound,
      ClientError::Status { status, message, .. }
        if (400..500).contains(status) && !message.is_empty() =>
      {
        Failure::Rejected { status: *status, message: message.clone() }
      }
      _ => Failure::Transport,
    }
  }
}
