//! Speech synthesis provider trait

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::VoiceConfig;
use crate::error::Result;

/// Parameters of one narration call
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRequest {
    /// Text to narrate
    pub text: String,
    /// Voice persona name, resolved by the backend
    pub voice_name: String,
    pub stability: f32,
    pub similarity_boost: f32,
}

impl VoiceRequest {
    /// Request using the configured persona and voice settings
    pub fn from_config(text: impl Into<String>, config: &VoiceConfig) -> Self {
        Self {
            text: text.into(),
            voice_name: config.voice_name.clone(),
            stability: config.stability,
            similarity_boost: config.similarity_boost,
        }
    }
}

/// Trait for text-to-speech backends
#[async_trait]
pub trait VoiceGenerator: Send + Sync {
    /// Synthesize `request.text` and return the raw audio bytes
    async fn synthesize(&self, request: &VoiceRequest) -> Result<Bytes>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
