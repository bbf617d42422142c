//! Error types for the story pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (invalid chunking, missing keys, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language outside the supported locale set
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Blank input or input too poor to analyze
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Backend did not answer in time
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Backend answered with a failure
    #[error("{backend} backend error: {message}")]
    Backend { backend: String, message: String },

    /// Requested voice persona is not offered by the voice backend
    #[error("Voice '{0}' not found among available voices")]
    VoiceNotFound(String),

    /// Retry policy gave up
    #[error("{operation} failed after {attempts} attempts: {last}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a backend error
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Map a failed request to a timeout when reqwest reports one, to a backend error otherwise
    pub fn from_request(backend: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(format!("{} request timed out: {}", backend, err))
        } else {
            Self::backend(backend, format!("request failed: {}", err))
        }
    }

    /// Whether a retry may succeed where this attempt failed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Whether this error is a configuration problem detected before any external call
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::UnsupportedLanguage(_))
    }
}
