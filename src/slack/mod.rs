pub mod api;
pub mod signature;

use async_trait::async_trait;
use thiserror::Error;

pub use api::SlackApiClient;
pub use signature::{ SignatureVerifier, Verification };

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// Who the bot is, as reported by `auth.test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub user_id: String,
    pub bot_id: Option<String>,
}

/// Posts replies into a channel.
#[async_trait]
pub trait SlackMessenger: Send + Sync {
    async fn say(&self, channel: &str, text: &str) -> Result<(), SlackError>;
}
