//! User-facing notices — what a web front end would show as toasts.

use aristhrottle_core::{api::Failure, engagement::Action};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  Success,
  Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub level:   NoticeLevel,
  pub message: String,
}

impl Notice {
  pub fn success(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Success, message: message.into() }
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self { level: NoticeLevel::Error, message: message.into() }
  }

  pub fn is_error(&self) -> bool { self.level == NoticeLevel::Error }

  /// The notice for an accepted request. `activated` is `false` when a vote
  /// was retracted or a bookmark removed.
  pub(crate) fn confirmed(action: Action, activated: bool) -> Self {
    Self::success(match (action, activated) {
      (Action::Vote, true) => "Vote cast successfully!",
      (Action::Vote, false) => "Vote removed",
      (Action::Bookmark, true) => "Bookmark added",
      (Action::Bookmark, false) => "Bookmark removed",
      (Action::Share, _) => "Shared!",
    })
  }

  /// The notice for a failed request.
  pub(crate) fn failed(action: Action, failure: &Failure) -> Self {
    match (action, failure) {
      (Action::Vote, Failure::Rejected { message, .. })
        if message.to_lowercase().contains("cannot vote on your own") =>
      {
        Self::error(message.clone())
      }
      (Action::Vote, Failure::Rejected { message, .. })
        if message.to_lowercase().contains("already") =>
      {
        Self::error("Already voted to this meme")
      }
      (_, Failure::Rejected { message, .. }) if !message.is_empty() => {
        Self::error(message.clone())
      }
      (_, Failure::NotFound) => {
        Self::error("Content not found or has been deleted")
      }
      (Action::Vote, _) => Self::error("Could not record your vote"),
      (Action::Bookmark, _) => Self::error("Could not update your bookmark"),
      (Action::Share, _) => Self::error("Could not record your share"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn rejected(message: &str) -> Failure {
    Failure::Rejected { status: 400, message: message.into() }
  }

  #[test]
  fn own_content_keeps_the_server_wording() {
    let notice =
      Notice::failed(Action::Vote, &rejected("You cannot vote on your own meme"));
    assert_eq!(notice.message, "You cannot vote on your own meme");
  }

  #[test]
  fn words_containing_own_are_not_own_content() {
    let notice = Notice::failed(
      Action::Vote,
      &rejected("Unknown voter has already voted for this meme"),
    );
    assert_eq!(notice.message, "Already voted to this meme");
  }

  #[test]
  fn generic_failures_name_the_action() {
    let notice = Notice::failed(Action::Bookmark, &Failure::Transport);
    assert!(notice.is_error());
    assert_eq!(notice.message, "Could not update your bookmark");
  }
}
