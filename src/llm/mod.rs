pub mod chat;

pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.deepseek.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            completion_model: None,
            base_url: None,
            max_tokens: 1500,
        }
    }
}
