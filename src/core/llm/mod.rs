pub mod providers;

use anyhow::Result;
use async_trait::async_trait;

/// A single-turn text completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    // Returns the generated text, which may be empty when the model produced nothing
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
