//! Pipeline error types

use thiserror::Error;

use crate::error::StorageError;
use crate::event::ClassificationError;
use crate::render::RenderError;

/// Source document could not be brought into the workspace
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to allocate workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Thumbnail could not be written to the destination store
#[derive(Debug, Error)]
#[error("Failed to upload s3://{bucket}/{key}: {source}")]
pub struct PublishError {
    pub bucket: String,
    pub key: String,
    #[source]
    pub source: StorageError,
}

/// Metadata store failure
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Pipeline step a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    Fetch,
    Render,
    Publish,
    Record,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classify => "classify",
            Stage::Fetch => "fetch",
            Stage::Render => "render",
            Stage::Publish => "publish",
            Stage::Record => "record",
        }
    }
}

/// Any failure that ends a run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("Failed to fetch source document: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("Failed to store metadata: {0}")]
    Record(#[from] RecordError),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Classification(_) => Stage::Classify,
            PipelineError::Fetch(_) => Stage::Fetch,
            // Thumbnail building shares the render error type
            PipelineError::Render(_) => Stage::Render,
            PipelineError::Publish(_) => Stage::Publish,
            PipelineError::Record(_) => Stage::Record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_mapping() {
        let err = PipelineError::from(FetchError::Storage(StorageError::ObjectNotFound(
            "s3://docs/a.pdf".to_string(),
        )));
        assert_eq!(err.stage(), Stage::Fetch);
        assert_eq!(
            err.to_string(),
            "Failed to fetch source document: Object not found: s3://docs/a.pdf"
        );

        let err = PipelineError::from(RecordError::Unavailable("throttled".to_string()));
        assert_eq!(err.stage().as_str(), "record");
    }

    #[test]
    fn test_publish_error_message() {
        let err = PublishError {
            bucket: "previews".to_string(),
            key: "thumbnails/a.png".to_string(),
            source: StorageError::AccessDenied("s3://previews/thumbnails/a.png".to_string()),
        };
        assert!(err
            .to_string()
            .starts_with("Failed to upload s3://previews/thumbnails/a.png"));
    }
}
