pub mod chat;

use std::time::Duration;
use thiserror::Error;

use crate::cli::Args;

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub completion_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            api_key: args.openai_api_key.clone(),
            base_url: args.chat_base_url.clone(),
            completion_model: args.chat_model.clone(),
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com".to_string(),
            completion_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.9,
            max_tokens: 1500,
        }
    }
}

/// Why a completion produced no text.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion API returned no choices")]
    EmptyResponse,

    #[error("invalid completion client configuration: {0}")]
    Config(String),
}
