use thiserror::Error;

use crate::llm::CompletionError;
use crate::slack::SlackError;

/// Failure while handling one Slack event.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("slack: {0}")]
    Slack(#[from] SlackError),

    #[error("completion: {0}")]
    Completion(#[from] CompletionError),
}
