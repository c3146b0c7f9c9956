//! Communication channels (WhatsApp Cloud API).
//!
//! Inbound: webhook payload types that flatten into `InboundMessage`s for the gateway.
//! Outbound: `ChannelHandle` so the gateway can deliver replies without knowing the platform.

mod handle;
mod inbound;
mod whatsapp;

pub use handle::{ChannelError, ChannelHandle};
pub use inbound::{InboundMessage, MessageKind};
pub use whatsapp::{text_message_body, WebhookEvent, WebhookPayload, WhatsAppChannel};
