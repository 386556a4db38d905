use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde::{ Deserialize, Serialize };

use super::{ ChatClient, CompletionResponse };
use crate::llm::{ CompletionError, LlmConfig };

pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: &str,
        model: String,
        base_url: String,
        temperature: f64,
        max_tokens: u32
    ) -> Result<Self, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| CompletionError::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            model,
            base_url,
            temperature,
            max_tokens,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, CompletionError> {
        if config.api_key.trim().is_empty() {
            return Err(CompletionError::Config("OpenAI API key is required".to_string()));
        }

        Self::new(
            &config.api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.temperature,
            config.max_tokens,
        )
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, CompletionError> {
        let url = format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'));

        // The rendered persona prompt goes out as one user turn.
        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!("Requesting completion from {} with model {}", url, self.model);
        let resp = self.http.post(&url).json(&req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream { status: status.as_u16(), body });
        }

        let resp = resp.json::<OpenAIResponse>().await?;
        let content = resp.choices
            .into_iter()
            .next()
            .ok_or(CompletionError::EmptyResponse)?
            .message.content;

        Ok(CompletionResponse { response: content })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
