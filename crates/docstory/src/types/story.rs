//! Story parts and the records assembled from them

use serde::{Deserialize, Serialize};

/// One tag-delimited segment of the generated story
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPart {
    /// Position in the story response (1-based)
    pub index: usize,
    /// Narrative text of the segment
    pub story_text: String,
    /// Image prompt, filled by the image prompt stage
    pub image_prompt: Option<ImagePrompt>,
}

impl StoryPart {
    /// Create a part without an image prompt
    pub fn new(index: usize, story_text: impl Into<String>) -> Self {
        Self {
            index,
            story_text: story_text.into(),
            image_prompt: None,
        }
    }
}

/// Image prompt derived from a story part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    /// Prompt text, or [`ImagePrompt::NOT_FOUND`]
    pub text: String,
    /// Whether the text came from an `<image_prompt>` tag
    pub found: bool,
}

impl ImagePrompt {
    /// Text used when the model answer carried no `<image_prompt>` tag
    pub const NOT_FOUND: &'static str = "prompt not found";

    /// Prompt extracted from the model answer
    pub fn extracted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            found: true,
        }
    }

    /// Sentinel prompt for a missing tag
    pub fn missing() -> Self {
        Self {
            text: Self::NOT_FOUND.to_string(),
            found: false,
        }
    }

    /// Build from an optional extraction result
    pub fn from_extraction(extracted: Option<String>) -> Self {
        extracted.map_or_else(Self::missing, Self::extracted)
    }
}

/// Base64 encoded image for a story part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub story_part_index: usize,
    pub base64_data: String,
}

/// Base64 encoded narration for a story part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedAudio {
    pub story_part_index: usize,
    pub base64_data: String,
}

/// Externally visible output unit, one per surviving story part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalRecord {
    /// Story text
    pub story: String,
    /// Base64 image
    pub img: String,
    /// Base64 audio, absent when narration is disabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl FinalRecord {
    /// Assemble a record from a part and its generated media
    pub fn assemble(part: &StoryPart, image: GeneratedImage, audio: Option<GeneratedAudio>) -> Self {
        debug_assert_eq!(part.index, image.story_part_index);
        Self {
            story: part.story_text.clone(),
            img: image.base64_data,
            audio: audio.map(|a| a.base64_data),
        }
    }
}
