//! Image generation provider trait

use async_trait::async_trait;

use crate::config::ImageConfig;
use crate::error::Result;

/// Parameters of one image generation call
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    /// Text prompt describing the picture
    pub prompt: String,
    pub style_preset: String,
    /// Random seed, fresh for every part
    pub seed: u32,
    /// Prompt adherence (guidance scale)
    pub cfg_scale: f32,
    pub steps: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRequest {
    /// Request with configured rendering parameters and a random seed
    pub fn from_config(prompt: impl Into<String>, config: &ImageConfig) -> Self {
        Self {
            prompt: prompt.into(),
            style_preset: config.style_preset.clone(),
            seed: rand::random(),
            cfg_scale: config.cfg_scale,
            steps: config.steps,
            width: config.width,
            height: config.height,
        }
    }
}

/// Trait for text-to-image backends
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generate one image, returned base64 encoded
    async fn generate_image(&self, request: &ImageRequest) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
