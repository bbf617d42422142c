//! Text generation provider trait

use async_trait::async_trait;

use crate::error::Result;

/// Trait for prompt-in, text-out language model backends
///
/// Implementations:
/// - `OllamaClient`: local Ollama server
/// - `AnthropicClient`: Anthropic messages API
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model being used
    fn model(&self) -> &str;
}
