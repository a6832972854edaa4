use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::history::HistoryStore;
use crate::models::chat::{ ChatMessage, Conversation };

/// Volatile history backend: one mutex-guarded map of chat id to turns.
/// The single lock serializes concurrent webhook deliveries, so interleaved
/// appends from the same chat cannot lose updates.
pub struct InMemoryHistoryStore {
    conversations: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            conversations: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl InMemoryHistoryStore {
    pub(crate) async fn chat_count(&self) -> usize {
        self.conversations.lock().await.len()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn get_or_create(&self, chat_id: &str) -> Conversation {
        let mut conversations = self.conversations.lock().await;
        let messages = conversations.entry(chat_id.to_string()).or_default();
        Conversation {
            id: chat_id.to_string(),
            messages: messages.clone(),
        }
    }

    async fn append(&self, chat_id: &str, role: &str, content: &str) {
        let mut conversations = self.conversations.lock().await;
        let messages = conversations.entry(chat_id.to_string()).or_default();
        messages.push(ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now().timestamp(),
        });
    }

    async fn truncate(&self, chat_id: &str, max_len: usize) {
        let mut conversations = self.conversations.lock().await;
        if let Some(messages) = conversations.get_mut(chat_id) {
            if messages.len() > max_len {
                let excess = messages.len() - max_len;
                messages.drain(..excess);
            }
        }
    }
}
