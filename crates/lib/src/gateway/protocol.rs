//! Gateway HTTP wire types: webhook verification query, acknowledgement bodies, and health.

use serde::{Deserialize, Serialize};

/// Query of the platform's subscription check: `GET /webhook?hub.mode=subscribe&hub.verify_token=..&hub.challenge=..`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyParams {
    /// Challenge to echo when mode is `subscribe` and the token matches `expected`. A missing
    /// expected token never verifies.
    pub fn accept(&self, expected: Option<&str>) -> Option<&str> {
        let expected = expected?;
        if self.mode.as_deref() == Some("subscribe") && self.verify_token.as_deref() == Some(expected) {
            Some(self.challenge.as_deref().unwrap_or(""))
        } else {
            None
        }
    }
}

/// JSON body returned by the webhook and test endpoints: `{ "status", ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    fn status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            message: None,
            result: None,
            error: None,
        }
    }

    pub fn received() -> Self {
        Self::status("received")
    }

    pub fn no_data() -> Self {
        Self::status("no_data")
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::status("error")
        }
    }

    pub fn test_success(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::status("test_success")
        }
    }

    pub fn test_failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::status("test_failed")
        }
    }
}

/// `GET /health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub service: String,
    pub phone_id: Option<String>,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(mode: &str, token: &str, challenge: &str) -> VerifyParams {
        VerifyParams {
            mode: Some(mode.to_string()),
            verify_token: Some(token.to_string()),
            challenge: Some(challenge.to_string()),
        }
    }

    #[test]
    fn matching_token_returns_challenge() {
        assert_eq!(params("subscribe", "secret", "123").accept(Some("secret")), Some("123"));
    }

    #[test]
    fn wrong_token_or_mode_is_rejected() {
        assert_eq!(params("subscribe", "nope", "123").accept(Some("secret")), None);
        assert_eq!(params("unsubscribe", "secret", "123").accept(Some("secret")), None);
        assert_eq!(VerifyParams::default().accept(Some("secret")), None);
    }

    #[test]
    fn unconfigured_token_never_verifies() {
        assert_eq!(params("subscribe", "", "123").accept(None), None);
    }

    #[test]
    fn ack_omits_unset_fields() {
        let v = serde_json::to_value(WebhookAck::no_data()).unwrap();
        assert_eq!(v, serde_json::json!({ "status": "no_data" }));
        let v = serde_json::to_value(WebhookAck::error("boom")).unwrap();
        assert_eq!(v, serde_json::json!({ "status": "error", "message": "boom" }));
    }
}
