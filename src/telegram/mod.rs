use async_trait::async_trait;
use log::info;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.telegram.org";

/// Outbound "send text reply" capability. Delivery is best-effort; the relay
/// logs and swallows failures.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str
    ) -> Result<(), Box<dyn StdError + Send + Sync>>;
}

pub struct TelegramClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct SetWebhookRequest<'a> {
    url: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramClient {
    pub fn new(
        token: String,
        base_url: Option<String>
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            base_url: base_url.unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            token,
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url.trim_end_matches('/'), self.token, method)
    }

    async fn call<T: Serialize>(
        &self,
        method: &str,
        payload: &T
    ) -> Result<(), Box<dyn StdError + Send + Sync>> {
        let resp = self.http.post(self.method_url(method))
            .json(payload)
            .send()
            .await?
            .error_for_status()?
            .json::<ApiResponse>()
            .await?;

        if !resp.ok {
            let description = resp.description.unwrap_or_else(|| "no description".to_string());
            return Err(format!("Telegram {} rejected: {}", method, description).into());
        }
        Ok(())
    }

    /// Registers `url` as this bot's webhook endpoint with the Bot API.
    /// The URL carries the path secret, so it is not echoed into the logs.
    pub async fn set_webhook(&self, url: &str) -> Result<(), Box<dyn StdError + Send + Sync>> {
        self.call("setWebhook", &SetWebhookRequest { url }).await?;
        info!("Webhook registered with Telegram");
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str
    ) -> Result<(), Box<dyn StdError + Send + Sync>> {
        self.call("sendMessage", &SendMessageRequest { chat_id, text }).await
    }
}
