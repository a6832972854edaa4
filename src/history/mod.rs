mod memory;
use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use crate::models::chat::Conversation;

pub use memory::InMemoryHistoryStore;

/// Per-chat conversation history. Conversations are created lazily on first
/// use and live for the lifetime of the process; there is no eviction of
/// stale chats. All operations are total.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns the conversation for `chat_id`, establishing an empty one if
    /// none exists yet.
    async fn get_or_create(&self, chat_id: &str) -> Conversation;

    /// Appends one turn to the end of `chat_id`'s conversation.
    async fn append(&self, chat_id: &str, role: &str, content: &str);

    /// Keeps only the trailing `max_len` turns, discarding the oldest ones.
    async fn truncate(&self, chat_id: &str, max_len: usize);
}

pub fn initialize_history_store() -> Arc<dyn HistoryStore> {
    info!("Chat history will be kept in process memory (volatile)");
    Arc::new(InMemoryHistoryStore::new())
}
