use async_trait::async_trait;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use super::{ChatClient, CompletionError, CompletionResponse};
use crate::llm::{LlmConfig, DEFAULT_CHAT_BASE_URL, DEFAULT_CHAT_MODEL};
use crate::models::chat::ChatMessage;

/// Chat completion client for any OpenAI-compatible endpoint. The default
/// base URL points at DeepSeek; swapping CHAT_BASE_URL and CHAT_MODEL is
/// enough to target OpenAI itself or a self-hosted gateway.
pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        base_url: Option<String>,
        max_tokens: u32,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_CHAT_BASE_URL.to_string());
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            api_key,
            model: chat_model,
            base_url: api_url,
            max_tokens,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .ok_or_else(|| "Completion API key is required".to_string())?;

        Self::new(
            api_key,
            config.completion_model.clone(),
            config.base_url.clone(),
            config.max_tokens,
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, CompletionError> {
        let wire_messages = messages
            .iter()
            .map(|m| OpenAIMessage {
                role: m.role.clone(),
                content: m.content.clone(),
            })
            .collect();

        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: wire_messages,
            max_tokens: self.max_tokens,
        };

        let resp = self.http.post(self.completions_url())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIResponse>()
            .await?;

        let content = resp.choices.first()
            .ok_or(CompletionError::EmptyResponse)?
            .message.content.clone();

        Ok(CompletionResponse { response: content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_message_carries_role_and_content_only() {
        let req = OpenAIChatRequest {
            model: "deepseek-chat".to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: "hello".to_string(),
            }],
            max_tokens: 1500,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "deepseek-chat");
        assert_eq!(json["max_tokens"], 1500);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hello");
        assert!(json["messages"][0].get("timestamp").is_none());
    }

    #[test]
    fn parses_completion_response() {
        let raw = r#"{
            "id": "cmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "hi there"}, "finish_reason": "stop"}
            ]
        }"#;
        let resp: OpenAIResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.choices[0].message.content, "hi there");
    }

    #[test]
    fn completions_url_tolerates_trailing_slash() {
        let client = OpenAIChatClient::new(
            "key".to_string(),
            None,
            Some("https://api.deepseek.com/v1/".to_string()),
            1500,
        ).unwrap();
        assert_eq!(client.completions_url(), "https://api.deepseek.com/v1/chat/completions");
    }
}
