pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use super::{ CompletionError, LlmConfig };
use self::openai::OpenAIChatClient;

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, CompletionError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, CompletionError> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
