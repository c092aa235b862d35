//! Metadata recording

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::{FileMetadata, MetadataStore};
use crate::event::SourceArtifact;

use super::error::RecordError;
use super::publisher::ThumbnailTarget;

/// Type tag stored with every record
pub const FILE_TYPE: &str = "pdf";

/// Writes the metadata record for a published thumbnail
#[derive(Clone)]
pub struct MetadataRecorder {
    store: Arc<dyn MetadataStore>,
}

impl MetadataRecorder {
    pub fn new(store: Arc<dyn MetadataStore>) -> Self {
        Self { store }
    }

    /// Upsert the record for one run
    ///
    /// Records are create-only, so both timestamps are the write time.
    pub async fn record(
        &self,
        file_id: Uuid,
        source: &SourceArtifact,
        thumbnail: &ThumbnailTarget,
    ) -> Result<FileMetadata, RecordError> {
        let now = Utc::now().to_rfc3339();
        let record = FileMetadata {
            file_id: file_id.to_string(),
            original_file: source.uri().to_string(),
            thumbnail_path: thumbnail.uri().to_string(),
            file_size: source.size,
            file_type: FILE_TYPE.to_string(),
            created_at: now.clone(),
            updated_at: now,
        };

        self.store.upsert(&record).await?;

        Ok(record)
    }
}
