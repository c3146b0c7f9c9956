//! Gateway HTTP server: WhatsApp webhook verification and delivery, health, and a replay endpoint.

use crate::agent;
use crate::channels::{
    ChannelHandle, InboundMessage, MessageKind, WebhookEvent, WebhookPayload, WhatsAppChannel,
};
use crate::config::{self, Config};
use crate::gateway::protocol::{Health, VerifyParams, WebhookAck};
use crate::llm::{GeminiClient, LlmBackend};
use crate::routing;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

const SERVICE_NAME: &str = "WhatsApp Meta + Gemini Bot";

/// Shared state for the gateway. Built once at startup and never mutated.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// Generates replies from rendered prompts.
    pub backend: Arc<dyn LlmBackend>,
    /// Delivers replies back to senders.
    pub channel: Arc<dyn ChannelHandle>,
}

impl GatewayState {
    pub fn new(config: Config, backend: Arc<dyn LlmBackend>, channel: Arc<dyn ChannelHandle>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
            channel,
        }
    }

    /// Production wiring: Gemini for generation, WhatsApp Cloud API for delivery.
    pub fn from_config(config: Config) -> Self {
        let backend = Arc::new(GeminiClient::from_config(&config));
        let channel = Arc::new(WhatsAppChannel::from_config(&config));
        Self::new(config, backend, channel)
    }
}

/// Why a delivery could not be processed. Converted to the HTTP reply the platform sees.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("no data received")]
    NoData,
    #[error("invalid json: {0}")]
    InvalidJson(serde_json::Error),
    #[error("unexpected payload: {0}")]
    InvalidPayload(serde_json::Error),
    #[error("processing failed: {0}")]
    Processing(String),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        match self {
            WebhookError::NoData => {
                log::warn!("webhook: no data received");
                (StatusCode::BAD_REQUEST, Json(WebhookAck::no_data())).into_response()
            }
            e => {
                log::error!("webhook error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(WebhookAck::error(e.to_string())))
                    .into_response()
            }
        }
    }
}

/// Outcome counts for one delivery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Replies accepted by the channel.
    pub replied: usize,
    /// Replies the channel failed to send.
    pub send_failures: usize,
    /// Non-text or blank messages that were not answered.
    pub skipped: usize,
    /// Status updates seen (logged only).
    pub statuses: usize,
}

/// Parse a webhook POST body. Empty bodies and falsy JSON values (`null`, `false`, `0`, `{}`, `[]`, `""`)
/// are `NoData`.
pub fn parse_delivery(body: &[u8]) -> Result<WebhookPayload, WebhookError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WebhookError::NoData);
    }
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(WebhookError::InvalidJson)?;
    let empty = match &value {
        serde_json::Value::Null => true,
        serde_json::Value::Object(m) => m.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
    };
    if empty {
        return Err(WebhookError::NoData);
    }
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "webhook received:\n{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
    }
    serde_json::from_value(value).map_err(WebhookError::InvalidPayload)
}

/// Answer one text message: classify, generate, send. Returns whether the channel accepted the reply.
async fn relay_message(state: &GatewayState, msg: &InboundMessage) -> bool {
    let category = routing::classify(&msg.text);
    log::info!(
        "inbound: message {} (ts {}) from {} routed to {} agent",
        msg.message_id.as_deref().unwrap_or("-"),
        msg.timestamp.as_deref().unwrap_or("-"),
        msg.sender,
        category
    );
    let reply = agent::reply_for(state.backend.as_ref(), category, &msg.text).await;
    log::debug!("inbound: reply: {}", reply);
    match state.channel.send_message(&msg.sender, &reply).await {
        Ok(()) => {
            log::info!("inbound: reply sent to {} via {}", msg.sender, state.channel.id());
            true
        }
        Err(e) => {
            log::warn!("inbound: send_message to {} failed: {}", msg.sender, e);
            false
        }
    }
}

/// Process every event of a parsed delivery in order. Each text message is answered independently;
/// a failed send does not stop the rest of the batch.
pub async fn process_delivery(state: &GatewayState, payload: &WebhookPayload) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for event in payload.events() {
        match event {
            WebhookEvent::Message(msg) => match &msg.kind {
                MessageKind::Text if !msg.text.trim().is_empty() => {
                    if relay_message(state, &msg).await {
                        report.replied += 1;
                    } else {
                        report.send_failures += 1;
                    }
                }
                MessageKind::Text => {
                    log::debug!("inbound: skipping blank message from {}", msg.sender);
                    report.skipped += 1;
                }
                MessageKind::Other(typ) => {
                    log::info!("inbound: ignoring {} message from {}", typ, msg.sender);
                    report.skipped += 1;
                }
            },
            WebhookEvent::Status(status) => {
                log::info!("status update: {}", status);
                report.statuses += 1;
            }
            WebhookEvent::Ignored(what) => {
                log::debug!("webhook: ignored {}", what);
            }
        }
    }
    report
}

/// Run `process_delivery` on its own task so a panic while handling one delivery becomes a 500
/// instead of tearing down the connection.
async fn process_guarded(
    state: &GatewayState,
    payload: WebhookPayload,
) -> Result<DeliveryReport, WebhookError> {
    let state = state.clone();
    tokio::spawn(async move { process_delivery(&state, &payload).await })
        .await
        .map_err(|e| WebhookError::Processing(e.to_string()))
}

/// Fixed delivery replayed by `POST /test-webhook`.
pub fn sample_delivery() -> WebhookPayload {
    let value = serde_json::json!({
        "entry": [{
            "changes": [{
                "field": "messages",
                "value": {
                    "messages": [{
                        "from": "1234567890",
                        "text": { "body": "test message" },
                        "type": "text",
                        "id": "test123"
                    }]
                }
            }]
        }]
    });
    serde_json::from_value(value).unwrap_or_default()
}

/// Router with all gateway routes bound to `state`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhook", get(verify_webhook).post(webhook))
        .route("/test-webhook", post(test_webhook))
        .route("/health", get(health_http))
        .with_state(state)
}

/// Run the gateway server; binds to config.gateway.bind:config.gateway.port.
/// Blocks until shutdown (Ctrl+C or SIGTERM).
pub async fn run_gateway(config: Config) -> Result<()> {
    let missing = config::missing_secrets(&config);
    if !missing.is_empty() {
        log::warn!(
            "missing configuration: {} (verification fails and replies cannot be generated or sent until set)",
            missing.join(", ")
        );
    }
    let bind_addr = format!("{}:{}", config.gateway.bind.trim(), config.gateway.port);
    let state = GatewayState::from_config(config);
    log::info!(
        "phone number id: {}, model: {}",
        state
            .config
            .channels
            .whatsapp
            .phone_number_id
            .as_deref()
            .unwrap_or("(unset)"),
        state.backend.model()
    );

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET /webhook — subscription check. Echoes the challenge when the token matches, else 403.
async fn verify_webhook(
    State(state): State<GatewayState>,
    Query(params): Query<VerifyParams>,
) -> Response {
    log::info!(
        "webhook verification: mode={:?}",
        params.mode.as_deref().unwrap_or("")
    );
    let expected = state.config.channels.whatsapp.verify_token.as_deref();
    match params.accept(expected) {
        Some(challenge) => {
            log::info!("webhook verified");
            (StatusCode::OK, challenge.to_string()).into_response()
        }
        None => {
            log::warn!("webhook verification failed");
            (StatusCode::FORBIDDEN, "Forbidden").into_response()
        }
    }
}

/// POST /webhook — message and status deliveries.
async fn webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let result = match parse_delivery(&body) {
        Ok(payload) => process_guarded(&state, payload).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(report) => {
            log::debug!("webhook processed: {:?}", report);
            (StatusCode::OK, Json(WebhookAck::received())).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// POST /test-webhook — replay `sample_delivery` through the same processing path.
async fn test_webhook(State(state): State<GatewayState>) -> Json<WebhookAck> {
    log::info!("testing webhook with sample delivery");
    match process_guarded(&state, sample_delivery()).await {
        Ok(report) if report.send_failures == 0 => {
            log::info!("webhook test succeeded");
            Json(WebhookAck::test_success("Webhook working"))
        }
        Ok(report) => {
            log::warn!("webhook test: {} reply(ies) failed to send", report.send_failures);
            Json(WebhookAck::test_failed(format!(
                "{} reply(ies) failed to send",
                report.send_failures
            )))
        }
        Err(e) => {
            log::warn!("webhook test failed: {}", e);
            Json(WebhookAck::test_failed(e.to_string()))
        }
    }
}

/// GET /health returns a static status JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<Health> {
    Json(Health {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        phone_id: state.config.channels.whatsapp.phone_number_id.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
