//! Outbound side of a channel: the handle the gateway uses to deliver replies.

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("send request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("send rejected: {0}")]
    Api(String),
    #[error("{0} not configured")]
    NotConfigured(&'static str),
}

/// Handle to a channel that can deliver text replies.
#[async_trait]
pub trait ChannelHandle: Send + Sync {
    /// Channel id (e.g. "whatsapp").
    fn id(&self) -> &str;
    /// Send a text message to a recipient (WhatsApp: phone number).
    async fn send_message(&self, to: &str, text: &str) -> Result<(), ChannelError>;
}
