use crate::agent::ChatAgent;
use crate::error::RelayError;
use crate::history::HistoryScope;
use crate::models::slack::{ EventKind, SlackEvent };
use crate::slack::{ BotIdentity, SlackMessenger };

use log::{ debug, info };
use std::sync::Arc;

pub fn greeting(user: &str) -> String {
    format!("Hi there, <@{}>!", user)
}

/// Dispatches Slack events to the reply handler.
pub struct EventRouter {
    agent: Arc<ChatAgent>,
    slack: Arc<dyn SlackMessenger>,
    identity: Option<BotIdentity>,
    scope: HistoryScope,
}

impl EventRouter {
    pub fn new(
        agent: Arc<ChatAgent>,
        slack: Arc<dyn SlackMessenger>,
        identity: Option<BotIdentity>,
        scope: HistoryScope
    ) -> Self {
        Self { agent, slack, identity, scope }
    }

    pub async fn route(&self, event: SlackEvent) -> Result<(), RelayError> {
        match event.kind() {
            // Ambient messages get the same treatment as explicit mentions.
            EventKind::AppMention | EventKind::Message => self.handle_message(&event).await,
            EventKind::Other(event_type) => {
                debug!("Ignoring unhandled Slack event type {}", event_type);
                Ok(())
            }
        }
    }

    fn is_own_event(&self, event: &SlackEvent) -> bool {
        if event.bot_id.is_some() {
            return true;
        }
        match &self.identity {
            Some(identity) => event.user.as_deref() == Some(identity.user_id.as_str()),
            None => false,
        }
    }

    async fn handle_message(&self, event: &SlackEvent) -> Result<(), RelayError> {
        if self.is_own_event(event) {
            debug!("Skipping bot-authored {} event", event.event_type);
            return Ok(());
        }

        let (Some(user), Some(channel), Some(text)) = (
            event.user.as_deref(),
            event.channel.as_deref(),
            event.text.as_deref(),
        ) else {
            debug!(
                "Skipping {} event without user/channel/text (subtype {:?})",
                event.event_type,
                event.subtype
            );
            return Ok(());
        };

        info!("{} from {} in {}", event.event_type, user, channel);
        self.slack.say(channel, &greeting(user)).await?;

        let conversation_id = self.scope.conversation_key(channel, user);
        let reply = self.agent.reply(&conversation_id, text).await?;

        self.slack.say(channel, &reply).await?;
        Ok(())
    }
}
