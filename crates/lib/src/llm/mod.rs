//! LLM abstraction and Gemini client.
//!
//! The gateway only needs single-prompt text generation; `LlmBackend` is that seam so tests and
//! other providers can stand in for Gemini.

mod gemini;

use async_trait::async_trait;

pub use gemini::{GeminiClient, DEFAULT_MODEL};

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error: {0}")]
    Api(String),
    #[error("empty response: {0}")]
    EmptyResponse(String),
    #[error("api key not configured")]
    MissingApiKey,
}

/// Text generation backend: one prompt in, one reply out.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Model id used for requests (for logs and status).
    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
