pub mod cli;
pub mod history;
pub mod llm;
pub mod models;
pub mod relay;
pub mod server;
pub mod telegram;

use cli::Args;
use history::initialize_history_store;
use llm::{ chat::new_client as new_chat_client, LlmConfig };
use log::info;
use relay::Relay;
use server::Server;
use std::error::Error;
use std::sync::Arc;
use telegram::TelegramClient;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Completion Base URL: {}", args.chat_base_url.as_deref().unwrap_or(llm::DEFAULT_CHAT_BASE_URL));
    info!("Completion Model: {}", args.chat_model.as_deref().unwrap_or(llm::DEFAULT_CHAT_MODEL));
    info!("Max Output Tokens: {}", args.max_tokens);
    info!("History Limit: {} turns per chat", args.history_limit);
    info!("Webhook Secret: {}", if args.webhook_secret.is_some() { "custom" } else { "bot token" });
    info!("Public URL: {}", args.public_url.as_deref().unwrap_or("not set (webhook registration skipped)"));
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let chat_config = LlmConfig {
        api_key: Some(args.chat_api_key.clone()).filter(|k| !k.is_empty()),
        base_url: args.chat_base_url.clone(),
        completion_model: args.chat_model.clone(),
        max_tokens: args.max_tokens,
    };
    let chat_client = new_chat_client(&chat_config)?;

    let telegram_client = Arc::new(
        TelegramClient::new(args.bot_token.clone(), args.telegram_base_url.clone())?
    );

    if let Some(public_url) = &args.public_url {
        let secret = args.webhook_secret.as_deref().unwrap_or(&args.bot_token);
        let webhook_url = format!("{}/webhook/{}", public_url.trim_end_matches('/'), secret);
        telegram_client.set_webhook(&webhook_url).await?;
    }

    let history_store = initialize_history_store();

    let relay = Arc::new(
        Relay::new(
            chat_client,
            telegram_client,
            history_store,
            args.system_prompt.clone(),
            args.history_limit,
        )
    );

    let server = Server::new(relay, args);
    server.run().await?;

    Ok(())
}
