use serde::{ Serialize, Deserialize };

/// Outer payload of a Slack Events API delivery.
#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "type")]
pub enum EventEnvelope {
    #[serde(rename = "url_verification")] UrlVerification {
        challenge: String,
    },
    #[serde(rename = "event_callback")] EventCallback {
        event: SlackEvent,
        #[serde(default)]
        event_id: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    AppMention,
    Message,
    Other(String),
}

impl From<&str> for EventKind {
    fn from(event_type: &str) -> Self {
        match event_type {
            "app_mention" => EventKind::AppMention,
            "message" => EventKind::Message,
            other => EventKind::Other(other.to_string()),
        }
    }
}

impl SlackEvent {
    pub fn kind(&self) -> EventKind {
        EventKind::from(self.event_type.as_str())
    }
}
