//! WhatsApp channel: Cloud API webhook payloads and sending replies via the Graph API `messages` endpoint.

use crate::channels::handle::{ChannelError, ChannelHandle};
use crate::channels::inbound::{InboundMessage, MessageKind};
use crate::config::Config;
use async_trait::async_trait;
use serde::Deserialize;

const CHANNEL_ID: &str = "whatsapp";

/// Webhook POST body: `{ object, entry: [{ id, changes: [{ field, value }] }] }`.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub value: ChangeValue,
}

/// `value` of a `messages` change. `messages` and `statuses` are kept optional so a present-but-empty
/// list is distinguishable from an absent one. Messages stay raw JSON and are decoded one by one,
/// so a malformed message does not hide the others in the same delivery.
#[derive(Debug, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub statuses: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WhatsAppMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub typ: Option<String>,
    #[serde(default)]
    pub text: Option<TextBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBody {
    #[serde(default)]
    pub body: String,
}

/// One thing found in a delivery, in payload order.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    /// A user message (text or otherwise) with a sender to reply to.
    Message(InboundMessage),
    /// Delivery/read status update; logged only.
    Status(serde_json::Value),
    /// A change the relay does not act on (other field, message without sender, ...).
    Ignored(String),
}

impl WebhookPayload {
    /// Flatten entries and changes into events.
    pub fn events(&self) -> Vec<WebhookEvent> {
        let mut out = Vec::new();
        for entry in &self.entry {
            for change in &entry.changes {
                let field = change.field.as_deref().unwrap_or("");
                if field != "messages" {
                    out.push(WebhookEvent::Ignored(format!("field {:?}", field)));
                    continue;
                }
                if let Some(messages) = &change.value.messages {
                    for m in messages {
                        out.push(message_event(m));
                    }
                } else if let Some(statuses) = &change.value.statuses {
                    out.extend(statuses.iter().cloned().map(WebhookEvent::Status));
                } else {
                    out.push(WebhookEvent::Ignored("messages change without messages or statuses".to_string()));
                }
            }
        }
        out
    }
}

fn message_event(raw: &serde_json::Value) -> WebhookEvent {
    let m: WhatsAppMessage = match serde_json::from_value(raw.clone()) {
        Ok(m) => m,
        Err(e) => {
            log::debug!("whatsapp: undecodable message {}: {}", raw, e);
            return WebhookEvent::Ignored(format!("undecodable message: {}", e));
        }
    };
    let Some(sender) = m.from.as_deref().filter(|s| !s.is_empty()) else {
        return WebhookEvent::Ignored(format!("message {:?} without sender", m.id));
    };
    let typ = m.typ.as_deref().unwrap_or("");
    let (kind, text) = if typ == "text" {
        let body = m.text.as_ref().map(|t| t.body.clone()).unwrap_or_default();
        (MessageKind::Text, body)
    } else {
        (MessageKind::Other(typ.to_string()), String::new())
    };
    WebhookEvent::Message(InboundMessage {
        sender: sender.to_string(),
        text,
        kind,
        message_id: m.id.clone(),
        timestamp: m.timestamp.clone(),
    })
}

/// JSON body for a text message send.
pub fn text_message_body(to: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "messaging_product": "whatsapp",
        "to": to,
        "type": "text",
        "text": { "body": text }
    })
}

/// WhatsApp channel connector: sends replies through the Cloud API.
pub struct WhatsAppChannel {
    id: String,
    api_base: String,
    phone_number_id: Option<String>,
    access_token: Option<String>,
    client: reqwest::Client,
}

impl WhatsAppChannel {
    /// `api_base` is the Graph API root including the version (e.g. https://graph.facebook.com/v19.0).
    pub fn new(
        api_base: impl Into<String>,
        phone_number_id: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            id: CHANNEL_ID.to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            phone_number_id,
            access_token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let wa = &config.channels.whatsapp;
        let api_base = format!(
            "{}/{}",
            wa.graph_api_base.trim_end_matches('/'),
            wa.api_version.trim_matches('/')
        );
        Self::new(api_base, wa.phone_number_id.clone(), wa.access_token.clone())
    }

    fn messages_url(&self) -> Result<String, ChannelError> {
        let phone_id = self
            .phone_number_id
            .as_ref()
            .ok_or(ChannelError::NotConfigured("whatsapp phone number id"))?;
        Ok(format!("{}/{}/messages", self.api_base, phone_id))
    }

    /// POST {phone_number_id}/messages. Only HTTP 200 counts as accepted; returns the API response JSON.
    pub async fn send_text(&self, to: &str, text: &str) -> Result<serde_json::Value, ChannelError> {
        let token = self
            .access_token
            .as_ref()
            .ok_or(ChannelError::NotConfigured("whatsapp access token"))?;
        let url = self.messages_url()?;
        log::info!("whatsapp: sending message to {}", to);
        log::debug!("whatsapp: message body: {}", text);
        let res = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&text_message_body(to, text))
            .send()
            .await?;
        let status = res.status();
        if status != reqwest::StatusCode::OK {
            let body = res.text().await.unwrap_or_default();
            return Err(ChannelError::Api(format!("{} {}", status, body)));
        }
        let data: serde_json::Value = res.json().await?;
        log::debug!("whatsapp: send accepted: {}", data);
        Ok(data)
    }
}

#[async_trait]
impl ChannelHandle for WhatsAppChannel {
    fn id(&self) -> &str {
        &self.id
    }

    async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError> {
        self.send_text(to, text).await.map(|_| ())
    }
}
