//! Gateway: HTTP webhook server.
//!
//! Single port serves the platform webhook (verification GET, delivery POST), a replay endpoint
//! for manual testing, and health. Each delivery is processed inside its request.

mod protocol;
mod server;

pub use protocol::{Health, VerifyParams, WebhookAck};
pub use server::{
    parse_delivery, process_delivery, router, run_gateway, sample_delivery, DeliveryReport,
    GatewayState, WebhookError,
};
