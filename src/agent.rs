use crate::config::prompt::PromptTemplate;
use crate::history::{ format_history_for_prompt, HistoryStore };
use crate::llm::chat::ChatClient;
use crate::llm::CompletionError;
use crate::models::chat::Exchange;

use chrono::Utc;
use log::{ debug, info };
use std::collections::HashMap;
use std::sync::{ Arc, Mutex as StdMutex };
use std::time::Duration;
use tokio::sync::{ Mutex, OwnedMutexGuard };

/// One async lock per conversation, so a conversation's read, completion and
/// append happen as a unit while other conversations run freely. Entries are
/// dropped again once nobody holds or waits on them.
#[derive(Default)]
struct ConversationLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

/// Releases the conversation lock and forgets it when it is no longer contended.
struct ConversationGuard<'a> {
    locks: &'a ConversationLocks,
    conversation_id: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.locks.release(&self.conversation_id);
    }
}

impl ConversationLocks {
    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.locks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn acquire(&self, conversation_id: &str) -> ConversationGuard<'_> {
        let lock = self.entries().entry(conversation_id.to_string()).or_default().clone();
        let guard = lock.lock_owned().await;
        ConversationGuard {
            locks: self,
            conversation_id: conversation_id.to_string(),
            guard: Some(guard),
        }
    }

    fn release(&self, conversation_id: &str) {
        let mut locks = self.entries();
        // The map's own reference is the only one left: no holder, no waiter.
        if locks.get(conversation_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(conversation_id);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries().len()
    }
}

pub struct ChatAgent {
    chat_client: Arc<dyn ChatClient>,
    history_store: Arc<dyn HistoryStore>,
    prompt: PromptTemplate,
    completion_timeout: Duration,
    log_prompts: bool,
    conversation_locks: ConversationLocks,
}

impl ChatAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        history_store: Arc<dyn HistoryStore>,
        prompt: PromptTemplate,
        completion_timeout: Duration
    ) -> Self {
        info!(
            "Chat agent using model {} at {} (timeout {:?})",
            chat_client.get_model(),
            chat_client.get_base_url().as_deref().unwrap_or("default endpoint"),
            completion_timeout
        );
        Self {
            chat_client,
            history_store,
            prompt,
            completion_timeout,
            log_prompts: false,
            conversation_locks: ConversationLocks::default(),
        }
    }

    pub fn with_prompt_logging(mut self, enabled: bool) -> Self {
        self.log_prompts = enabled;
        self
    }

    /// Generates a reply to `input` in the given conversation. The exchange is
    /// remembered only when the completion succeeds.
    pub async fn reply(&self, conversation_id: &str, input: &str) -> Result<String, CompletionError> {
        let _guard = self.conversation_locks.acquire(conversation_id).await;

        let conversation = self.history_store.get_conversation(conversation_id).await;
        let history = format_history_for_prompt(&conversation);
        let prompt = self.prompt.render(&history, input);
        if self.log_prompts {
            debug!("Prompt after formatting:\n{}", prompt);
        }

        let response = match
            tokio::time::timeout(self.completion_timeout, self.chat_client.complete(&prompt)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(CompletionError::Timeout(self.completion_timeout));
            }
        };

        self.history_store.add_exchange(
            conversation_id,
            Exchange::new(input, &response.response, Utc::now().timestamp())
        ).await;

        Ok(response.response)
    }
}
