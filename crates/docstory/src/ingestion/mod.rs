//! Document ingestion: extraction, normalization and chunking

mod chunker;
pub mod cleaner;
mod parser;

pub use chunker::TextChunker;
pub use cleaner::{normalize, normalize_pages, repair_extraction_artifacts};
pub use parser::{ExtractedDocument, FileParser, PageContent};
