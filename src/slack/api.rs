//! Slack Web API client

use async_trait::async_trait;
use log::{ debug, error, info };
use reqwest::Client;
use serde::{ Deserialize, Serialize };
use std::time::Duration;

use super::{ BotIdentity, SlackError, SlackMessenger };

#[derive(Debug, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct SlackResponse<T> {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthTestResponse {
    #[serde(default)]
    pub team: Option<String>,
    pub user_id: String,
    #[serde(default)]
    pub bot_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    pub channel: String,
    pub ts: String,
}

#[derive(Clone)]
pub struct SlackApiClient {
    client: Client,
    bot_token: String,
    base_url: String,
}

impl SlackApiClient {
    pub fn new(bot_token: &str, base_url: &str) -> Result<Self, SlackError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            bot_token: bot_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call<B, T>(&self, method: &str, body: Option<&B>) -> Result<T, SlackError>
        where B: Serialize + ?Sized, T: for<'de> Deserialize<'de>
    {
        let url = format!("{}/{}", self.base_url, method);
        let mut request = self.client.post(&url).bearer_auth(&self.bot_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Slack {} failed: {} - {}", method, status, error_text);
            return Err(SlackError::Api(format!("{}: {}", status, error_text)));
        }

        let result: SlackResponse<T> = response
            .json()
            .await
            .map_err(|e| SlackError::Parse(e.to_string()))?;

        if !result.ok {
            return Err(SlackError::Api(result.error.unwrap_or_else(|| "unknown_error".to_string())));
        }
        result.data.ok_or_else(|| SlackError::Parse(format!("{} response had no payload", method)))
    }

    /// Resolves the identity behind the bot token.
    pub async fn auth_test(&self) -> Result<AuthTestResponse, SlackError> {
        debug!("Testing Slack authentication");
        let result: AuthTestResponse = self.call::<(), _>("auth.test", None).await?;
        info!(
            "Slack auth test successful for team {:?} as {}",
            result.team,
            result.user_id
        );
        Ok(result)
    }

    pub async fn post_message(&self, message: &PostMessage) -> Result<PostMessageResponse, SlackError> {
        debug!("Posting message to channel: {}", message.channel);
        self.call("chat.postMessage", Some(message)).await
    }
}

impl From<AuthTestResponse> for BotIdentity {
    fn from(auth: AuthTestResponse) -> Self {
        BotIdentity {
            user_id: auth.user_id,
            bot_id: auth.bot_id,
        }
    }
}

#[async_trait]
impl SlackMessenger for SlackApiClient {
    async fn say(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let message = PostMessage {
            channel: channel.to_string(),
            text: text.to_string(),
        };
        let posted = self.post_message(&message).await?;
        debug!("Posted message {} to {}", posted.ts, posted.channel);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{ body_json, header, method, path };
    use wiremock::{ Mock, MockServer, ResponseTemplate };

    #[tokio::test]
    async fn say_posts_to_channel_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(header("authorization", "Bearer xoxb-test"))
            .and(body_json(json!({"channel": "C1", "text": "Hi there, <@U1>!"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true, "channel": "C1", "ts": "1700000000.000100"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackApiClient::new("xoxb-test", &server.uri()).unwrap();
        client.say("C1", "Hi there, <@U1>!").await.unwrap();
    }

    #[tokio::test]
    async fn ok_false_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false, "error": "channel_not_found"
            })))
            .mount(&server)
            .await;

        let client = SlackApiClient::new("xoxb-test", &server.uri()).unwrap();
        let err = client.say("C404", "hello").await.unwrap_err();
        assert!(matches!(err, SlackError::Api(ref e) if e == "channel_not_found"));
    }

    #[tokio::test]
    async fn auth_test_resolves_bot_identity() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "url": "https://acme.slack.com/",
                "team": "Acme",
                "user": "relay",
                "team_id": "T1",
                "user_id": "UBOT",
                "bot_id": "BBOT"
            })))
            .mount(&server)
            .await;

        let client = SlackApiClient::new("xoxb-test", &server.uri()).unwrap();
        let identity: BotIdentity = client.auth_test().await.unwrap().into();
        assert_eq!(identity.user_id, "UBOT");
        assert_eq!(identity.bot_id.as_deref(), Some("BBOT"));
    }

    #[tokio::test]
    async fn invalid_token_fails_auth_test() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": false, "error": "invalid_auth"
            })))
            .mount(&server)
            .await;

        let client = SlackApiClient::new("xoxb-bad", &server.uri()).unwrap();
        assert!(client.auth_test().await.is_err());
    }
}
