//! Story and image prompt generation and tagged output extraction

pub mod prompt;
pub mod tags;

pub use prompt::{PromptFormatter, IMAGE_PROMPT_TAG, PART_TAG};
pub use tags::TagExtractor;
