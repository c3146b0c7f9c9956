//! Shared fixtures: in-process generator and channel fakes, and a gateway bound to a free port.

#![allow(dead_code)]

use async_trait::async_trait;
use lib::channels::{ChannelError, ChannelHandle};
use lib::config::Config;
use lib::gateway::{self, GatewayState};
use lib::llm::{LlmBackend, LlmError};
use std::sync::{Arc, Mutex};

pub const VERIFY_TOKEN: &str = "verify-me";
pub const PHONE_ID: &str = "109876543210";

/// Generator that records prompts and answers with a fixed reply or error.
pub struct FakeBackend {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(detail: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(detail.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmBackend for FakeBackend {
    fn model(&self) -> &str {
        "fake"
    }

    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(LlmError::Api)
    }
}

/// Channel that records sends; recipients listed in `reject` fail.
pub struct RecordingChannel {
    reject: Vec<String>,
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Self::rejecting(&[])
    }

    pub fn rejecting(recipients: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            reject: recipients.iter().map(|s| s.to_string()).collect(),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChannelHandle for RecordingChannel {
    fn id(&self) -> &str {
        "recording"
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push((to.to_string(), text.to_string()));
        if self.reject.iter().any(|r| r == to) {
            return Err(ChannelError::Api("400 recipient not allowed".to_string()));
        }
        Ok(())
    }
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.gateway.bind = "127.0.0.1".to_string();
    config.channels.whatsapp.verify_token = Some(VERIFY_TOKEN.to_string());
    config.channels.whatsapp.phone_number_id = Some(PHONE_ID.to_string());
    config
}

pub fn state(backend: Arc<FakeBackend>, channel: Arc<RecordingChannel>) -> GatewayState {
    GatewayState::new(test_config(), backend, channel)
}

/// Serve the gateway router on a free local port; returns the base URL. The server task is left
/// running when the test ends.
pub async fn spawn_gateway(state: GatewayState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind free port");
    let addr = listener.local_addr().expect("local_addr");
    let app = gateway::router(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

/// Webhook delivery body with one text message per (from, body) pair.
pub fn text_delivery(messages: &[(&str, &str)]) -> serde_json::Value {
    let messages: Vec<serde_json::Value> = messages
        .iter()
        .enumerate()
        .map(|(i, (from, body))| {
            serde_json::json!({
                "from": from,
                "id": format!("wamid.{}", i),
                "timestamp": "1700000000",
                "type": "text",
                "text": { "body": body }
            })
        })
        .collect();
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "id": "WABA",
            "changes": [{
                "field": "messages",
                "value": {
                    "messaging_product": "whatsapp",
                    "metadata": { "phone_number_id": PHONE_ID },
                    "messages": messages
                }
            }]
        }]
    })
}
