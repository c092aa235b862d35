//! Ingestion pipeline
//!
//! Drives one notification through classify → fetch → render → thumbnail →
//! publish → record, and turns the run into an invocation result.
//!
//! # Modules
//!
//! - `fetcher`: download the source document into a workspace
//! - `publisher`: derive the thumbnail key and write the PNG
//! - `recorder`: build and upsert the metadata record
//! - `orchestrator`: sequencing, workspace lifecycle, failure handling

mod error;
mod fetcher;
mod orchestrator;
mod publisher;
mod recorder;
mod types;

pub use error::{FetchError, PipelineError, PublishError, RecordError, Stage};
pub use fetcher::ArtifactFetcher;
pub use orchestrator::Pipeline;
pub use publisher::{thumbnail_key, ArtifactPublisher, ThumbnailTarget};
pub use recorder::{MetadataRecorder, FILE_TYPE};
pub use types::*;
