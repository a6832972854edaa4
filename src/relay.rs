use chrono::Utc;
use log::{ error, info };
use std::sync::Arc;

use crate::history::HistoryStore;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ ChatMessage, ROLE_ASSISTANT, ROLE_SYSTEM, ROLE_USER };
use crate::models::telegram::Update;
use crate::telegram::Messenger;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant who can remember recent conversation turns";

/// Fixed user-facing text for completion failures. Never carries the
/// underlying error; operators get the detail from the logs.
pub const FALLBACK_REPLY: &str =
    "Sorry, something went wrong while generating a reply. Please try again.";

/// Turns one inbound user message into one outbound reply, updating the
/// chat's history as a side effect. The history cap is enforced after every
/// append, so the stored length never exceeds it between exchanges.
pub struct Relay {
    chat_client: Arc<dyn ChatClient>,
    messenger: Arc<dyn Messenger>,
    history_store: Arc<dyn HistoryStore>,
    system_prompt: String,
    history_limit: usize,
}

impl Relay {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        messenger: Arc<dyn Messenger>,
        history_store: Arc<dyn HistoryStore>,
        system_prompt: String,
        history_limit: usize,
    ) -> Self {
        Self {
            chat_client,
            messenger,
            history_store,
            system_prompt,
            history_limit,
        }
    }

    /// Entry point for one webhook delivery. Updates without a text payload
    /// are a no-op: no history mutation, no outbound call.
    pub async fn handle_update(&self, update: &Update) {
        let Some((chat_id, text)) = update.text_message() else {
            return;
        };
        info!(
            "Inbound message from chat {} ({})",
            chat_id,
            update.sender_name().unwrap_or("unknown sender")
        );
        self.handle_message(chat_id, text).await;
    }

    pub async fn handle_message(&self, chat_id: i64, user_text: &str) {
        let key = chat_id.to_string();

        self.history_store.append(&key, ROLE_USER, user_text).await;
        self.history_store.truncate(&key, self.history_limit).await;

        let conversation = self.history_store.get_or_create(&key).await;
        let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
        messages.push(ChatMessage {
            role: ROLE_SYSTEM.to_string(),
            content: self.system_prompt.clone(),
            timestamp: Utc::now().timestamp(),
        });
        messages.extend(conversation.messages);

        match self.chat_client.complete(&messages).await {
            Ok(completion) => {
                self.history_store.append(&key, ROLE_ASSISTANT, &completion.response).await;
                self.history_store.truncate(&key, self.history_limit).await;
                self.deliver(chat_id, &completion.response).await;
            }
            Err(e) => {
                error!("Completion failed for chat {}: {}", chat_id, e);
                self.deliver(chat_id, FALLBACK_REPLY).await;
            }
        }
    }

    async fn deliver(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text).await {
            error!("Failed to deliver reply to chat {}: {}", chat_id, e);
        }
    }
}
