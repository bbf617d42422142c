//! Fixed-width overlapping text windows

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;

use crate::config::ChunkingConfig;
use crate::error::Result;
use crate::types::TextChunk;

/// Length of generated chunk identifiers
const CHUNK_ID_LEN: usize = 12;

/// Sliding-window chunker with configurable size and overlap
pub struct TextChunker {
    /// Window width in characters
    chunk_size: usize,
    /// Characters shared by consecutive windows
    overlap: usize,
    /// Identifiers handed out so far
    issued_ids: HashSet<String>,
}

impl TextChunker {
    /// Create a new chunker; `overlap >= chunk_size` is a configuration error
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        ChunkingConfig {
            chunk_size,
            chunk_overlap: overlap,
        }
        .validate()?;

        Ok(Self {
            chunk_size,
            overlap,
            issued_ids: HashSet::new(),
        })
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Distance between the starts of consecutive windows
    pub fn step(&self) -> usize {
        self.chunk_size - self.overlap
    }

    /// Character ranges of every window over a text of `len` characters
    pub fn window_ranges(&self, len: usize) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut start = 0usize;

        while start < len {
            let end = (start + self.chunk_size).min(len);
            ranges.push((start, end));
            if end == len {
                break;
            }
            start += self.step();
        }

        ranges
    }

    /// Cut `text` into windows tagged with `source_filename`
    pub fn chunk_text(&mut self, text: &str, source_filename: &str, page_number: Option<u32>) -> Vec<TextChunk> {
        // byte offset of every char boundary, end of text included
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_len = boundaries.len() - 1;

        self.window_ranges(char_len)
            .into_iter()
            .map(|(start, end)| TextChunk {
                id: self.next_id(),
                text: text[boundaries[start]..boundaries[end]].to_string(),
                source_filename: source_filename.to_string(),
                page_number,
                char_start: start,
                char_end: end,
            })
            .collect()
    }

    /// Chunk every page of a document, pages numbered from 1
    pub fn chunk_pages<S: AsRef<str>>(&mut self, pages: &[S], source_filename: &str) -> Vec<TextChunk> {
        let mut chunks = Vec::new();
        for (i, page) in pages.iter().enumerate() {
            chunks.extend(self.chunk_text(page.as_ref(), source_filename, Some(i as u32 + 1)));
        }
        chunks
    }

    /// Random alphanumeric identifier not issued before by this chunker
    fn next_id(&mut self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(CHUNK_ID_LEN)
                .map(char::from)
                .collect();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
            tracing::debug!("Chunk id collision on {}, regenerating", id);
        }
    }
}
