//! Inbound message from a channel: one user message extracted from a webhook delivery.

/// What kind of content the platform delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Any non-text type (image, audio, sticker, ...), named as the platform sent it.
    Other(String),
}

/// A message from a channel to be classified and answered.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Sender address used as the reply target (WhatsApp: the `from` phone number).
    pub sender: String,
    pub text: String,
    pub kind: MessageKind,
    pub message_id: Option<String>,
    pub timestamp: Option<String>,
}
