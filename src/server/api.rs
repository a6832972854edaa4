use crate::cli::Args;
use crate::models::telegram::Update;
use crate::relay::Relay;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
    extract::{Path, State},
    response::IntoResponse,
    http::StatusCode,
};
use tower_http::cors::{Any, CorsLayer};
use log::{info, warn, error};

#[derive(Clone)]
struct AppState {
    relay: Arc<Relay>,
    webhook_secret: String,
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/webhook/{secret}", post(webhook_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn start_http_server(
    relay: Arc<Relay>,
    args: Args,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = args.server_addr.parse::<SocketAddr>()?;
    let webhook_secret = args.webhook_secret
        .clone()
        .unwrap_or_else(|| args.bot_token.clone());

    let router = app(AppState { relay, webhook_secret });

    if args.enable_tls && args.tls_cert_path.is_some() && args.tls_key_path.is_some() {
        let cert_path = args.tls_cert_path.as_ref().unwrap();
        let key_path = args.tls_key_path.as_ref().unwrap();

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(
            cert_path,
            key_path
        ).await?;

        info!("Starting HTTPS webhook server on: https://{}", addr);
        axum_server::bind_rustls(addr, tls_config)
            .serve(router.into_make_service())
            .await?;
    } else {
        info!("Starting HTTP webhook server on: http://{}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await
            .map_err(|e| format!("Failed to bind webhook server to {}: {}", addr, e))?;
        axum::serve(listener, router.into_make_service()).await?;
    }

    Ok(())
}

async fn index_handler() -> impl IntoResponse {
    "Bot relay with memory is running"
}

/// One webhook delivery. The 200 goes back only after the relay has finished
/// the full cycle, reply delivery included, so the platform cannot observe a
/// fire-and-forget response. Bodies that do not parse as an Update are
/// acknowledged and dropped: Telegram redelivers on non-2xx, and redelivering
/// an unparseable body is useless.
async fn webhook_handler(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    body: String,
) -> impl IntoResponse {
    if secret != state.webhook_secret {
        warn!("Webhook request with wrong path secret rejected");
        return (StatusCode::NOT_FOUND, "not found");
    }

    let update: Update = match serde_json::from_str(&body) {
        Ok(update) => update,
        Err(e) => {
            error!("Discarding undecodable webhook payload: {}", e);
            return (StatusCode::OK, "ok");
        }
    };

    state.relay.handle_update(&update).await;
    (StatusCode::OK, "ok")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::history::{ HistoryStore, InMemoryHistoryStore };
    use crate::relay::tests::{ RecordingMessenger, ScriptedChatClient };
    use crate::relay::{ Relay, DEFAULT_SYSTEM_PROMPT };

    fn test_app(
        chat_client: Arc<ScriptedChatClient>,
        messenger: Arc<RecordingMessenger>,
        history: Arc<InMemoryHistoryStore>,
    ) -> Router {
        let relay = Relay::new(
            chat_client,
            messenger,
            history,
            DEFAULT_SYSTEM_PROMPT.to_string(),
            10,
        );
        app(AppState {
            relay: Arc::new(relay),
            webhook_secret: "s3cret".to_string(),
        })
    }

    fn update_body(chat_id: i64, text: &str) -> String {
        format!(
            r#"{{"update_id": 1, "message": {{"message_id": 10, "chat": {{"id": {}}}, "text": "{}"}}}}"#,
            chat_id, text
        )
    }

    #[tokio::test]
    async fn webhook_relays_and_acknowledges() {
        let chat_client = Arc::new(ScriptedChatClient::replying("hi there"));
        let messenger = Arc::new(RecordingMessenger::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let router = test_app(chat_client, messenger.clone(), history.clone());

        let response = router
            .oneshot(
                Request::post("/webhook/s3cret")
                    .header("content-type", "application/json")
                    .body(Body::from(update_body(123, "hello")))
                    .unwrap()
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(messenger.sent.lock().await.as_slice(), &[(123, "hi there".to_string())]);
        assert_eq!(history.get_or_create("123").await.messages.len(), 2);
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_without_side_effects() {
        let chat_client = Arc::new(ScriptedChatClient::replying("hi there"));
        let messenger = Arc::new(RecordingMessenger::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let router = test_app(chat_client, messenger.clone(), history.clone());

        let response = router
            .oneshot(
                Request::post("/webhook/guess")
                    .header("content-type", "application/json")
                    .body(Body::from(update_body(123, "hello")))
                    .unwrap()
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(messenger.sent.lock().await.is_empty());
        assert_eq!(history.chat_count().await, 0);
    }

    #[tokio::test]
    async fn undecodable_payload_is_acknowledged_and_dropped() {
        let chat_client = Arc::new(ScriptedChatClient::replying("hi there"));
        let messenger = Arc::new(RecordingMessenger::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let router = test_app(chat_client, messenger.clone(), history.clone());

        let response = router
            .oneshot(
                Request::post("/webhook/s3cret")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap()
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(messenger.sent.lock().await.is_empty());
        assert_eq!(history.chat_count().await, 0);
    }

    #[tokio::test]
    async fn index_reports_running() {
        let chat_client = Arc::new(ScriptedChatClient::replying("hi"));
        let messenger = Arc::new(RecordingMessenger::new());
        let history = Arc::new(InMemoryHistoryStore::new());
        let router = test_app(chat_client, messenger, history);

        let response = router
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
