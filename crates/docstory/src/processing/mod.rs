//! Pipeline orchestration and retry handling

mod pipeline;
mod retry;

pub use pipeline::{
    DocumentFailure, DocumentStage, DroppedPart, PartStage, RunReport, StoryPipeline,
};
pub use retry::RetryPolicy;
