//! Integration test: serve the gateway on a free port, GET /health, assert status JSON.
//! Does not require Gemini or WhatsApp.

mod common;

use common::{FakeBackend, RecordingChannel, PHONE_ID};

#[tokio::test]
async fn health_reports_service_and_phone_id() {
    let base = common::spawn_gateway(common::state(
        FakeBackend::replying("unused"),
        RecordingChannel::new(),
    ))
    .await;

    let resp = reqwest::get(format!("{}/health", base))
        .await
        .expect("GET /health");
    assert!(resp.status().is_success());
    let json: serde_json::Value = resp.json().await.expect("parse JSON");
    assert_eq!(json.get("status").and_then(|v| v.as_str()), Some("healthy"));
    assert_eq!(
        json.get("service").and_then(|v| v.as_str()),
        Some("WhatsApp Meta + Gemini Bot")
    );
    assert_eq!(json.get("phone_id").and_then(|v| v.as_str()), Some(PHONE_ID));
    assert_eq!(
        json.get("version").and_then(|v| v.as_str()),
        Some(env!("CARGO_PKG_VERSION"))
    );
}

#[tokio::test]
async fn health_phone_id_is_null_when_unset() {
    let mut config = common::test_config();
    config.channels.whatsapp.phone_number_id = None;
    let state = lib::gateway::GatewayState::new(
        config,
        FakeBackend::replying("unused"),
        RecordingChannel::new(),
    );
    let base = common::spawn_gateway(state).await;

    let json: serde_json::Value = reqwest::get(format!("{}/health", base))
        .await
        .expect("GET /health")
        .json()
        .await
        .expect("parse JSON");
    assert!(json.get("phone_id").expect("phone_id key").is_null());
}
