use clap::Parser;

use crate::history::HistoryScope;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Slack Args ---
    /// Bot user OAuth token used for chat.postMessage and auth.test (xoxb-...)
    #[arg(long, env = "SLACK_BOT_TOKEN", hide_env_values = true)]
    pub slack_bot_token: String,

    /// Signing secret used to verify inbound webhook requests
    #[arg(long, env = "SIGNING_SECRET", hide_env_values = true)]
    pub signing_secret: String,

    /// Base URL for the Slack Web API
    #[arg(long, env = "SLACK_API_BASE_URL", default_value = "https://slack.com/api")]
    pub slack_api_base_url: String,

    /// Skip the auth.test call made at startup to resolve the bot identity.
    /// When skipped, the bot cannot recognise its own messages by user id.
    #[arg(long, env = "SKIP_TOKEN_VERIFICATION", default_value = "false")]
    pub skip_token_verification: bool,

    // --- Chat LLM Provider Args ---
    /// API Key for the chat completion provider
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Base URL for the chat completion API
    #[arg(long, env = "CHAT_BASE_URL", default_value = "https://api.openai.com")]
    pub chat_base_url: String,

    /// Model name for chat completion
    #[arg(long, env = "CHAT_MODEL", default_value = "gpt-3.5-turbo")]
    pub chat_model: String,

    /// Sampling temperature sent with every completion request
    #[arg(long, env = "CHAT_TEMPERATURE", default_value = "0.9")]
    pub temperature: f64,

    /// Maximum number of tokens the model may generate per reply
    #[arg(long, env = "CHAT_MAX_TOKENS", default_value = "1500")]
    pub max_tokens: u32,

    /// Seconds to wait for a completion before giving up on the event
    #[arg(long, env = "COMPLETION_TIMEOUT_SECS", default_value = "60")]
    pub completion_timeout_secs: u64,

    // --- Conversation Args ---
    /// Number of prior exchanges (human + assistant) kept as prompt context
    #[arg(long, env = "HISTORY_WINDOW", default_value = "3")]
    pub history_window: usize,

    /// How conversation windows are keyed (shared, channel, channel-user)
    #[arg(long, env = "HISTORY_SCOPE", value_enum, default_value = "channel-user")]
    pub history_scope: HistoryScope,

    /// Upper bound on conversation windows held in memory. The least recently
    /// active conversation is forgotten when a new one would exceed it.
    #[arg(long, env = "MAX_CONVERSATIONS", default_value = "10000")]
    pub max_conversations: usize,

    /// Optional path to a text file overriding the persona prompt.
    /// Must contain the {history} and {input} placeholders.
    #[arg(long, env = "PROMPT_TEMPLATE_PATH")]
    pub prompt_template_path: Option<String>,

    // --- General App Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8000")]
    pub server_addr: String,

    /// Route receiving Slack event deliveries
    #[arg(long, env = "EVENTS_PATH", default_value = "/slack/events")]
    pub events_path: String,

    /// Handle events before answering Slack instead of acknowledging first.
    /// Slack retries deliveries that are not acknowledged within 3 seconds.
    #[arg(long, env = "PROCESS_BEFORE_RESPONSE", default_value = "false")]
    pub process_before_response: bool,

    /// Global limit of inbound webhook requests per second. 0 disables the limit.
    #[arg(long, env = "MAX_REQUESTS_PER_SECOND", default_value = "50")]
    pub max_requests_per_second: u32,

    /// Enable debug logging/output (rendered prompts)
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}

/// Shows only the first few characters of a secret for startup logs.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 7] = [
        "slack-chat-relay",
        "--slack-bot-token",
        "xoxb-test",
        "--signing-secret",
        "shh",
        "--openai-api-key",
        "sk-test",
    ];

    #[test]
    fn defaults_match_the_hosted_bot() {
        let args = Args::try_parse_from(REQUIRED).unwrap();
        assert_eq!(args.server_addr, "0.0.0.0:8000");
        assert_eq!(args.events_path, "/slack/events");
        assert_eq!(args.chat_model, "gpt-3.5-turbo");
        assert_eq!(args.max_tokens, 1500);
        assert!((args.temperature - 0.9).abs() < f64::EPSILON);
        assert_eq!(args.history_window, 3);
        assert_eq!(args.history_scope, HistoryScope::ChannelUser);
        assert_eq!(args.max_conversations, 10_000);
        assert!(!args.process_before_response);
    }

    #[test]
    fn missing_secret_is_rejected() {
        let result = Args::try_parse_from([
            "slack-chat-relay",
            "--slack-bot-token",
            "xoxb-test",
            "--openai-api-key",
            "sk-test",
        ]);
        // SIGNING_SECRET may leak in from the environment of whoever runs the tests.
        if std::env::var("SIGNING_SECRET").is_err() {
            assert!(result.is_err());
        }
    }

    #[test]
    fn history_scope_parses_from_flag() {
        let mut argv: Vec<&str> = REQUIRED.to_vec();
        argv.extend(["--history-scope", "shared"]);
        let args = Args::try_parse_from(argv).unwrap();
        assert_eq!(args.history_scope, HistoryScope::Shared);
    }

    #[test]
    fn mask_secret_hides_the_tail() {
        assert_eq!(mask_secret("xoxb-123456"), "xoxb****");
        assert_eq!(mask_secret("abc"), "****");
    }
}
