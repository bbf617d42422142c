//! Stability AI text-to-image backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ImageConfig;
use crate::error::{Error, Result};

use super::image::{ImageGenerator, ImageRequest};

const BACKEND: &str = "stability";

/// Stability AI REST client
pub struct StabilityClient {
    client: Client,
    config: ImageConfig,
}

#[derive(Serialize)]
struct TextToImageRequest<'a> {
    text_prompts: Vec<TextPrompt<'a>>,
    style_preset: &'a str,
    seed: u32,
    cfg_scale: f32,
    steps: u32,
    width: u32,
    height: u32,
    samples: u32,
}

#[derive(Serialize)]
struct TextPrompt<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TextToImageResponse {
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize)]
struct Artifact {
    base64: String,
    #[serde(rename = "finishReason", default)]
    finish_reason: Option<String>,
}

impl StabilityClient {
    /// Create a client on top of a shared HTTP client
    pub fn new(client: Client, config: &ImageConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn request_body(request: &ImageRequest) -> TextToImageRequest<'_> {
        TextToImageRequest {
            text_prompts: vec![TextPrompt {
                text: &request.prompt,
            }],
            style_preset: &request.style_preset,
            seed: request.seed,
            cfg_scale: request.cfg_scale,
            steps: request.steps,
            width: request.width,
            height: request.height,
            samples: 1,
        }
    }
}

fn first_artifact(response: TextToImageResponse) -> Result<String> {
    let artifact = response
        .artifacts
        .into_iter()
        .next()
        .ok_or_else(|| Error::backend(BACKEND, "response contained no artifacts"))?;

    if artifact.finish_reason.as_deref() == Some("ERROR") {
        return Err(Error::backend(BACKEND, "generation finished with ERROR"));
    }
    Ok(artifact.base64)
}

#[async_trait]
impl ImageGenerator for StabilityClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<String> {
        let url = format!(
            "{}/v1/generation/{}/text-to-image",
            self.config.base_url.trim_end_matches('/'),
            self.config.engine
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&Self::request_body(request))
            .send()
            .await
            .map_err(|e| Error::from_request(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(BACKEND, format!("HTTP {}: {}", status, body)));
        }

        let parsed: TextToImageResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(BACKEND, format!("invalid response: {}", e)))?;

        first_artifact(parsed)
    }

    fn name(&self) -> &str {
        BACKEND
    }
}
