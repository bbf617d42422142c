//! Configuration for the story pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::language::Locale;

/// Environment variable consulted when `text.anthropic.api_key` is empty
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
/// Environment variable consulted when `image.api_key` is empty
pub const STABILITY_API_KEY_ENV: &str = "STABILITY_API_KEY";
/// Environment variable consulted when `voice.api_key` is empty
pub const ELEVENLABS_API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Story generation settings
    pub story: StorySettings,
    /// Text generation backend
    pub text: TextBackendConfig,
    /// Image generation backend
    pub image: ImageConfig,
    /// Voice generation backend
    pub voice: VoiceConfig,
    /// Retry policy shared by every backend invocation
    pub retry: RetryConfig,
    /// Processing configuration
    pub processing: ProcessingConfig,
    /// Output locations
    pub output: OutputConfig,
}

impl StoryConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: StoryConfig = toml::from_str(&raw)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Default configuration file location (`<config dir>/docstory/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("docstory").join("config.toml"))
    }

    /// Load from an explicit path, else from the default location if present,
    /// else fall back to defaults; API keys are then completed from the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => Self::from_file(default)?,
                None => Self::default(),
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Fill empty API keys from the environment
    pub fn apply_env(&mut self) {
        fill_from_env(&mut self.text.anthropic.api_key, ANTHROPIC_API_KEY_ENV);
        fill_from_env(&mut self.image.api_key, STABILITY_API_KEY_ENV);
        fill_from_env(&mut self.voice.api_key, ELEVENLABS_API_KEY_ENV);
    }

    /// Check structural settings; runs before any backend is contacted
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.story.parts == 0 {
            return Err(Error::config("story.parts must be at least 1"));
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::config("retry.max_attempts must be at least 1"));
        }
        if self.processing.parallel_parts == Some(0) {
            return Err(Error::config("processing.parallel_parts must be at least 1"));
        }
        Ok(())
    }

    /// Check that the HTTP backends selected by this configuration have credentials
    pub fn validate_credentials(&self) -> Result<()> {
        if self.text.provider == TextProvider::Anthropic && self.text.anthropic.api_key.is_empty() {
            return Err(Error::config(format!(
                "text.anthropic.api_key is empty (set it or {})",
                ANTHROPIC_API_KEY_ENV
            )));
        }
        if self.image.api_key.is_empty() {
            return Err(Error::config(format!(
                "image.api_key is empty (set it or {})",
                STABILITY_API_KEY_ENV
            )));
        }
        if self.voice.enabled && self.voice.api_key.is_empty() {
            return Err(Error::config(format!(
                "voice.api_key is empty (set it, {} or disable voice)",
                ELEVENLABS_API_KEY_ENV
            )));
        }
        Ok(())
    }
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.is_empty() {
        if let Ok(value) = std::env::var(var) {
            *slot = value;
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window width in characters
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// Reject window settings that would never advance
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be greater than 0"));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Story generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySettings {
    /// Number of story parts requested from the model (the answer may differ)
    pub parts: usize,
    /// Force a locale instead of detecting it
    pub locale: Option<Locale>,
    /// Render image prompts in another locale than the story
    pub image_locale: Option<Locale>,
    /// Drop parts whose image prompt could not be extracted instead of
    /// sending the sentinel to the image backend
    pub skip_missing_image_prompts: bool,
}

impl Default for StorySettings {
    fn default() -> Self {
        Self {
            parts: 6,
            locale: None,
            image_locale: None,
            skip_missing_image_prompts: false,
        }
    }
}

/// Text generation provider selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TextProvider {
    /// Local Ollama server
    #[default]
    Ollama,
    /// Anthropic Messages API
    Anthropic,
}

/// Text generation backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextBackendConfig {
    /// Which backend to use
    pub provider: TextProvider,
    /// Ollama settings
    pub ollama: OllamaConfig,
    /// Anthropic settings
    pub anthropic: AnthropicConfig,
}

/// Ollama configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Generation model name
    pub model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Context window size (tokens)
    pub context_size: usize,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: 0.7,
            context_size: 8192,
        }
    }
}

/// Anthropic Messages API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API base URL
    pub base_url: String,
    /// API key (falls back to `ANTHROPIC_API_KEY`)
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// `anthropic-version` header value
    pub api_version: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.anthropic.com".to_string(),
            api_key: String::new(),
            model: "claude-3-5-sonnet-latest".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 4096,
        }
    }
}

/// Image generation backend configuration (Stability REST API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// API base URL
    pub base_url: String,
    /// API key (falls back to `STABILITY_API_KEY`)
    pub api_key: String,
    /// Engine identifier
    pub engine: String,
    /// Style preset sent with every request
    pub style_preset: String,
    /// Guidance scale
    pub cfg_scale: f32,
    /// Diffusion steps
    pub steps: u32,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.stability.ai".to_string(),
            api_key: String::new(),
            engine: "stable-diffusion-xl-1024-v1-0".to_string(),
            style_preset: "photographic".to_string(),
            cfg_scale: 10.0,
            steps: 30,
            width: 1024,
            height: 1024,
        }
    }
}

/// Voice generation backend configuration (ElevenLabs REST API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Generate narration audio for each part
    pub enabled: bool,
    /// API base URL
    pub base_url: String,
    /// API key (falls back to `ELEVENLABS_API_KEY`)
    pub api_key: String,
    /// Voice model identifier
    pub model: String,
    /// Persona name resolved to a backend voice id
    pub voice_name: String,
    /// Voice stability setting
    pub stability: f32,
    /// Voice similarity boost setting
    pub similarity_boost: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://api.elevenlabs.io".to_string(),
            api_key: String::new(),
            model: "eleven_multilingual_v2".to_string(),
            voice_name: "Brian".to_string(),
            stability: 0.75,
            similarity_boost: 0.75,
        }
    }
}

/// Delay growth between retry attempts
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// Same delay before every retry
    #[default]
    Fixed,
    /// Delay doubles after every retry, capped by `max_delay_ms`
    Exponential,
}

/// Retry configuration applied to text, image and voice invocations alike
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per invocation, first one included
    pub max_attempts: u32,
    /// Delay growth
    pub backoff: BackoffStrategy,
    /// Delay before the first retry in milliseconds
    pub initial_delay_ms: u64,
    /// Upper bound for exponential delays in milliseconds
    pub max_delay_ms: u64,
    /// Timeout for a single attempt in seconds (0 disables it)
    pub attempt_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: BackoffStrategy::Fixed,
            initial_delay_ms: 5_000,
            max_delay_ms: 60_000,
            attempt_timeout_secs: 180,
        }
    }
}

/// Processing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Story parts processed concurrently (default: CPU count, max 4)
    pub parallel_parts: Option<usize>,
    /// TCP connect timeout for backend clients in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            parallel_parts: None,
            connect_timeout_secs: 10,
        }
    }
}

impl ProcessingConfig {
    /// Resolve the effective worker count
    pub fn effective_parallel_parts(&self) -> usize {
        self.parallel_parts
            .unwrap_or_else(|| num_cpus::get().min(4))
            .max(1)
    }
}

/// Output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON artifact with the final records
    pub path: PathBuf,
    /// Directory receiving decoded images and audio, if set
    pub media_dir: Option<PathBuf>,
    /// JSON dump of the text chunks, if set
    pub chunks_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("output.json"),
            media_dir: None,
            chunks_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = StoryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.story.parts, 6);
        assert_eq!(config.voice.voice_name, "Brian");
        assert_eq!(config.image.style_preset, "photographic");
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let mut config = StoryConfig::default();
        config.chunking.chunk_size = 100;
        config.chunking.chunk_overlap = 100;
        let err = config.validate().unwrap_err();
        assert!(err.is_configuration());

        config.chunking.chunk_overlap = 99;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let chunking = ChunkingConfig {
            chunk_size: 0,
            chunk_overlap: 0,
        };
        assert!(matches!(chunking.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let raw = r#"
            [chunking]
            chunk_size = 100
            chunk_overlap = 20

            [story]
            locale = "pt"

            [text]
            provider = "anthropic"

            [retry]
            backoff = "exponential"
            max_attempts = 5
        "#;
        let config: StoryConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.chunking.chunk_size, 100);
        assert_eq!(config.chunking.chunk_overlap, 20);
        assert_eq!(config.story.locale, Some(Locale::Portuguese));
        assert_eq!(config.story.parts, 6);
        assert_eq!(config.text.provider, TextProvider::Anthropic);
        assert_eq!(config.text.anthropic.max_tokens, 4096);
        assert_eq!(config.retry.backoff, BackoffStrategy::Exponential);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.image.steps, 30);
    }

    #[test]
    fn test_credentials_required_for_selected_backends() {
        let mut config = StoryConfig::default();
        config.image.api_key = "sk-image".into();
        config.voice.enabled = false;
        assert!(config.validate_credentials().is_ok());

        config.voice.enabled = true;
        assert!(config.validate_credentials().is_err());

        config.voice.api_key = "el-key".into();
        config.text.provider = TextProvider::Anthropic;
        assert!(config.validate_credentials().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[voice]\nenabled = false\nvoice_name = \"Rachel\"\n").unwrap();

        let config = StoryConfig::from_file(&path).unwrap();
        assert!(!config.voice.enabled);
        assert_eq!(config.voice.voice_name, "Rachel");
        assert_eq!(config.voice.stability, 0.75);
    }

    #[test]
    fn test_effective_parallel_parts() {
        let processing = ProcessingConfig {
            parallel_parts: Some(2),
            ..Default::default()
        };
        assert_eq!(processing.effective_parallel_parts(), 2);
        assert!(ProcessingConfig::default().effective_parallel_parts() >= 1);
    }
}
