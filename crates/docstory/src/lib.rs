//! docstory: turn educational documents into illustrated, narrated stories
//!
//! A document is extracted, normalized and its language detected; a text model
//! writes a story split into `<part>` segments; every part then gets an image
//! prompt, an image and optionally a narration. Backends sit behind the traits
//! in [`providers`] so local, hosted or fake implementations can be plugged in.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod language;
pub mod processing;
pub mod providers;
pub mod storage;
pub mod types;

pub use config::StoryConfig;
pub use error::{Error, Result};
pub use language::{detect_language, Locale};
pub use processing::{DocumentStage, PartStage, RetryPolicy, RunReport, StoryPipeline};
pub use types::{
    document::{Document, FileType, TextChunk},
    story::{FinalRecord, ImagePrompt, StoryPart},
};
