use clap::Parser;

use crate::relay::DEFAULT_SYSTEM_PROMPT;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Messaging Platform Args ---
    /// Telegram bot token issued by BotFather.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub bot_token: String,

    /// Base URL of the Telegram Bot API (override for tests or a local Bot API server).
    #[arg(long, env = "TELEGRAM_BASE_URL")]
    pub telegram_base_url: Option<String>,

    // --- Completion API Args ---
    /// API key for the completion provider.
    #[arg(long, env = "CHAT_API_KEY")]
    pub chat_api_key: String,

    /// Base URL for the completion provider API (any OpenAI-compatible endpoint).
    #[arg(long, env = "CHAT_BASE_URL")]
    pub chat_base_url: Option<String>,

    /// Model name for chat completion (e.g., deepseek-chat, gpt-4o).
    #[arg(long, env = "CHAT_MODEL")]
    pub chat_model: Option<String>,

    /// Maximum output tokens per completion.
    #[arg(long, env = "MAX_TOKENS", default_value = "1500")]
    pub max_tokens: u32,

    /// Leading system instruction sent with every completion request.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    // --- History Args ---
    /// Maximum number of turns retained per chat; oldest turns are dropped first.
    #[arg(long, env = "HISTORY_LIMIT", default_value = "10")]
    pub history_limit: usize,

    // --- Server Args ---
    /// Host address and port for the webhook server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:4000")]
    pub server_addr: String,

    /// Secret segment of the webhook path. Defaults to the bot token.
    #[arg(long, env = "WEBHOOK_SECRET")]
    pub webhook_secret: Option<String>,

    /// Publicly reachable base URL of this server. When set, the webhook is
    /// registered with Telegram at startup.
    #[arg(long, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
