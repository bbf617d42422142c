//! Core types for the story pipeline

pub mod document;
pub mod story;

pub use document::{Document, FileType, TextChunk};
pub use story::{FinalRecord, GeneratedAudio, GeneratedImage, ImagePrompt, StoryPart};
