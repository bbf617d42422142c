//! Provider abstractions for text, image and voice generation
//!
//! The pipeline only sees the traits, so HTTP backends can be swapped
//! for local ones or for fakes in tests.

pub mod anthropic;
pub mod elevenlabs;
pub mod image;
pub mod ollama;
pub mod stability;
pub mod text;
pub mod voice;

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{StoryConfig, TextProvider};
use crate::error::{Error, Result};

pub use anthropic::AnthropicClient;
pub use elevenlabs::ElevenLabsClient;
pub use image::{ImageGenerator, ImageRequest};
pub use ollama::OllamaClient;
pub use stability::StabilityClient;
pub use text::TextGenerator;
pub use voice::{VoiceGenerator, VoiceRequest};

/// Backends selected by a configuration
pub struct Backends {
    pub text: Arc<dyn TextGenerator>,
    pub image: Arc<dyn ImageGenerator>,
    pub voice: Option<Arc<dyn VoiceGenerator>>,
}

/// Shared HTTP client with connect and request timeouts from configuration
pub fn http_client(config: &StoryConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(config.processing.connect_timeout_secs))
        .pool_max_idle_per_host(5);

    if config.retry.attempt_timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(config.retry.attempt_timeout_secs));
    }

    builder
        .build()
        .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))
}

/// Build the HTTP backends a configuration asks for
pub fn backends_from_config(config: &StoryConfig) -> Result<Backends> {
    let client = http_client(config)?;

    let text: Arc<dyn TextGenerator> = match config.text.provider {
        TextProvider::Ollama => Arc::new(OllamaClient::new(client.clone(), &config.text.ollama)),
        TextProvider::Anthropic => {
            Arc::new(AnthropicClient::new(client.clone(), &config.text.anthropic))
        }
    };

    let image: Arc<dyn ImageGenerator> = Arc::new(StabilityClient::new(client.clone(), &config.image));

    let voice: Option<Arc<dyn VoiceGenerator>> = if config.voice.enabled {
        Some(Arc::new(ElevenLabsClient::new(client, &config.voice)))
    } else {
        None
    };

    tracing::info!(
        "Backends: text={} ({}), image={}, voice={}",
        text.name(),
        text.model(),
        image.name(),
        voice.as_ref().map(|v| v.name()).unwrap_or("disabled")
    );

    Ok(Backends { text, image, voice })
}
