use serde::{ Serialize, Deserialize };
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Human => write!(f, "Human"),
            Role::Assistant => write!(f, "AI"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

/// A human message together with the reply generated for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub human: ChatMessage,
    pub assistant: ChatMessage,
}

impl Exchange {
    pub fn new(input: &str, reply: &str, timestamp: i64) -> Self {
        Self {
            human: ChatMessage {
                role: Role::Human,
                content: input.to_string(),
                timestamp,
            },
            assistant: ChatMessage {
                role: Role::Assistant,
                content: reply.to_string(),
                timestamp,
            },
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub exchanges: Vec<Exchange>,
}

impl Conversation {
    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.exchanges.iter().flat_map(|e| [&e.human, &e.assistant])
    }
}
