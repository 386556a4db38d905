mod memory;
pub mod window;

pub use memory::InMemoryHistoryStore;

use async_trait::async_trait;
use clap::ValueEnum;
use log::info;
use std::sync::Arc;
use crate::cli::Args;
use crate::models::chat::{ Conversation, Exchange };

#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn add_exchange(&self, conversation_id: &str, exchange: Exchange);

    async fn get_conversation(&self, conversation_id: &str) -> Conversation;
}

/// Decides which events share a conversation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HistoryScope {
    /// One window for the whole process.
    Shared,
    /// One window per channel.
    Channel,
    /// One window per user within a channel.
    ChannelUser,
}

impl HistoryScope {
    pub fn conversation_key(&self, channel: &str, user: &str) -> String {
        match self {
            HistoryScope::Shared => "shared".to_string(),
            HistoryScope::Channel => channel.to_string(),
            HistoryScope::ChannelUser => format!("{}:{}", channel, user),
        }
    }
}

pub fn initialize_history_store(args: &Args) -> Arc<dyn HistoryStore> {
    info!(
        "Chat history kept in memory: {} exchanges per conversation, scope {:?}, at most {} conversations",
        args.history_window,
        args.history_scope,
        args.max_conversations
    );
    Arc::new(InMemoryHistoryStore::new(args.history_window).with_max_conversations(args.max_conversations))
}

/// Renders the window as `Human:`/`AI:` lines for the `{history}` placeholder.
pub fn format_history_for_prompt(conversation: &Conversation) -> String {
    conversation
        .messages()
        .map(|msg| format!("{}: {}", msg.role, msg.content))
        .collect::<Vec<_>>()
        .join("\n")
}
