pub mod openai;

use async_trait::async_trait;
use serde::Deserialize;
use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

use super::LlmConfig;
use crate::models::chat::ChatMessage;
use self::openai::OpenAIChatClient;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("completion API returned no choices")]
    EmptyResponse,
}

/// A hosted completion API. Takes the fully assembled turn list (system
/// prompt included) and returns a single reply text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, CompletionError>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client = OpenAIChatClient::from_config(config)?;
    Ok(Arc::new(client))
}
