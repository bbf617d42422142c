//! Anthropic messages API text generation backend

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::AnthropicConfig;
use crate::error::{Error, Result};

use super::text::TextGenerator;

const BACKEND: &str = "anthropic";

/// Anthropic API client
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicClient {
    /// Create a client on top of a shared HTTP client
    pub fn new(client: Client, config: &AnthropicConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        }
    }
}

/// First text block of a messages response
fn first_text(response: MessagesResponse) -> Result<String> {
    response
        .content
        .into_iter()
        .find_map(|block| block.text)
        .ok_or_else(|| Error::backend(BACKEND, "response contained no text block"))
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| Error::from_request(BACKEND, e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::backend(BACKEND, format!("HTTP {}: {}", status, body)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| Error::backend(BACKEND, format!("invalid response: {}", e)))?;

        first_text(parsed)
    }

    fn name(&self) -> &str {
        BACKEND
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}
