use async_trait::async_trait;

use crate::error::TransportError;

/// Trait for hosted text-generation services.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., "gemini", "openrouter").
    fn name(&self) -> &str;

    /// Send a completion request and return the generated text.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, TransportError>;
}

/// Request to an LLM provider. Generation parameters are fixed per call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

/// A single attempt at detecting text in an image.
///
/// Timeouts and retries are applied by the caller; implementations make exactly
/// one outbound call per invocation.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Return the primary detected text block.
    async fn detect_text(&self, image: &[u8], language_hints: &[String])
        -> Result<String, TransportError>;
}
