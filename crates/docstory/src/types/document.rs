//! Document and chunk types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported source file types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Unknown file type
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Detect file type from a file name or path
    pub fn from_filename(filename: &str) -> Self {
        match filename.rsplit_once('.') {
            Some((_, ext)) => Self::from_extension(ext),
            None => Self::Unknown,
        }
    }

    /// Check if this is a supported file type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// A source document, immutable once extracted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Source filename
    pub filename: String,
    /// File type
    pub file_type: FileType,
    /// SHA-256 of the raw bytes
    pub content_hash: String,
    /// Number of extracted pages
    pub page_count: u32,
    /// File size in bytes
    pub file_size: u64,
    /// Extraction timestamp
    pub extracted_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document
    pub fn new(filename: String, file_type: FileType, content_hash: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            file_type,
            content_hash,
            page_count: 0,
            file_size,
            extracted_at: chrono::Utc::now(),
        }
    }
}

/// An overlapping window over normalized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Identifier, unique within a run
    pub id: String,
    /// Window content
    pub text: String,
    /// File the text came from
    pub source_filename: String,
    /// Page the window was cut from (1-indexed)
    pub page_number: Option<u32>,
    /// Start of the window in characters
    pub char_start: usize,
    /// End of the window in characters (exclusive)
    pub char_end: usize,
}
