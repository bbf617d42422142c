//! Output artifacts written at the end of a run

mod artifact;

pub use artifact::{save_media, write_chunks, write_records, write_run, MediaFiles};
