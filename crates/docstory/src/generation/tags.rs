//! Extraction of tag-delimited segments from free-form model output

use regex::Regex;

use crate::error::{Error, Result};

/// Extracts the contents of `<tag>…</tag>` pairs, in order of appearance
#[derive(Debug, Clone)]
pub struct TagExtractor {
    pattern: Regex,
}

impl TagExtractor {
    /// Build an extractor for a tag name (letters, digits, `_` or `-`)
    pub fn new(tag: &str) -> Result<Self> {
        if tag.is_empty()
            || !tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::config(format!("invalid tag name '{}'", tag)));
        }

        // (?s) lets the lazy body span newlines
        let pattern = Regex::new(&format!(r"(?s)<{tag}>(.*?)</{tag}>", tag = regex::escape(tag)))
            .map_err(|e| Error::internal(format!("tag pattern for '{}': {}", tag, e)))?;

        Ok(Self { pattern })
    }

    /// Trimmed contents of every occurrence; empty when the tag never appears
    pub fn extract_all(&self, text: &str) -> Vec<String> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .collect()
    }

    /// Trimmed contents of the first occurrence
    pub fn extract_first(&self, text: &str) -> Option<String> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}
