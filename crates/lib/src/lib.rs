//! Relay core library: WhatsApp webhook gateway, keyword intent routing, prompt templates,
//! and the Gemini client, used by the `relay` CLI.

pub mod agent;
pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod llm;
pub mod routing;

#[cfg(test)]
mod test_support;
