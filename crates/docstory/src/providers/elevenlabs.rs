//! ElevenLabs text-to-speech backend

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::VoiceConfig;
use crate::error::{Error, Result};

use super::voice::{VoiceGenerator, VoiceRequest};

const BACKEND: &str = "elevenlabs";

/// ElevenLabs REST client; persona names are resolved once and cached
pub struct ElevenLabsClient {
    client: Client,
    config: VoiceConfig,
    /// Persona name to voice id
    voice_ids: RwLock<HashMap<String, String>>,
}

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<VoiceEntry>,
}

#[derive(Deserialize)]
struct VoiceEntry {
    voice_id: String,
    name: String,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

impl ElevenLabsClient {
    /// Create a client on top of a shared HTTP client
    pub fn new(client: Client, config: &VoiceConfig) -> Self {
        Self {
            client,
            config: config.clone(),
            voice_ids: RwLock::new(HashMap::new()),
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Resolve a persona name to its voice id
    async fn voice_id(&self, name: &str) -> Result<String> {
        let cached = self.voice_ids.read().get(name).cloned();
        if let Some(id) = cached {
            return Ok(id);
        }

        let url = format!("{}/v1/voices", self.base_url());
        let response = self
            .client
            .get(&url)
            .header("xi-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| Error::from_request(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(BACKEND, format!("voice listing HTTP {}: {}", status, body)));
        }

        let listing: VoicesResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(BACKEND, format!("invalid voice listing: {}", e)))?;

        let id = find_voice(&listing, name)?;
        tracing::debug!("Resolved voice '{}' to {}", name, id);
        self.voice_ids.write().insert(name.to_string(), id.clone());
        Ok(id)
    }

    fn request_body<'a>(&'a self, request: &'a VoiceRequest) -> SpeechRequest<'a> {
        SpeechRequest {
            text: &request.text,
            model_id: &self.config.model,
            voice_settings: VoiceSettings {
                stability: request.stability,
                similarity_boost: request.similarity_boost,
            },
        }
    }
}

fn find_voice(listing: &VoicesResponse, name: &str) -> Result<String> {
    listing
        .voices
        .iter()
        .find(|v| v.name == name)
        .map(|v| v.voice_id.clone())
        .ok_or_else(|| Error::VoiceNotFound(name.to_string()))
}

#[async_trait]
impl VoiceGenerator for ElevenLabsClient {
    async fn synthesize(&self, request: &VoiceRequest) -> Result<Bytes> {
        let voice_id = self.voice_id(&request.voice_name).await?;
        let url = format!("{}/v1/text-to-speech/{}", self.base_url(), voice_id);

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| Error::from_request(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(BACKEND, format!("HTTP {}: {}", status, body)));
        }

        response
            .bytes()
            .await
            .map_err(|e| Error::from_request(BACKEND, e))
    }

    fn name(&self) -> &str {
        BACKEND
    }
}
