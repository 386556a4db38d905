use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::history::window::ConversationWindow;
use crate::history::HistoryStore;
use crate::models::chat::{ Conversation, Exchange };

pub const DEFAULT_MAX_CONVERSATIONS: usize = 10_000;

/// Process-local history. Everything is lost on restart.
///
/// At most `max_conversations` windows are kept; starting a new conversation
/// beyond that forgets the one with the oldest last exchange.
pub struct InMemoryHistoryStore {
    window_size: usize,
    max_conversations: usize,
    windows: Mutex<HashMap<String, ConversationWindow>>,
}

impl InMemoryHistoryStore {
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_max_conversations(mut self, max_conversations: usize) -> Self {
        self.max_conversations = max_conversations.max(1);
        self
    }

    pub async fn conversation_count(&self) -> usize {
        self.windows.lock().await.len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn add_exchange(&self, conversation_id: &str, exchange: Exchange) {
        let mut windows = self.windows.lock().await;
        if !windows.contains_key(conversation_id) && windows.len() >= self.max_conversations {
            let idle = windows
                .iter()
                .min_by_key(|(_, window)| window.last_activity().unwrap_or(i64::MIN))
                .map(|(id, _)| id.clone());
            if let Some(idle) = idle {
                debug!("Forgetting idle conversation {}", idle);
                windows.remove(&idle);
            }
        }
        windows
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationWindow::new(self.window_size))
            .append(exchange);
    }

    async fn get_conversation(&self, conversation_id: &str) -> Conversation {
        let windows = self.windows.lock().await;
        let exchanges: Vec<Exchange> = windows
            .get(conversation_id)
            .map(|w| w.exchanges().cloned().collect())
            .unwrap_or_default();

        Conversation {
            id: conversation_id.to_string(),
            exchanges,
        }
    }
}
