//! Thumbnail publishing

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::event::{base_name, SourceArtifact};
use crate::render::{Thumbnail, THUMBNAIL_CONTENT_TYPE, THUMBNAIL_EXTENSION};
use crate::storage::{BlobStore, ObjectUri};

use super::error::PublishError;

/// Where a thumbnail is written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThumbnailTarget {
    pub bucket: String,
    pub key: String,
}

impl ThumbnailTarget {
    pub fn uri(&self) -> ObjectUri {
        ObjectUri::new(&self.bucket, &self.key)
    }
}

/// `<prefix><base name without extension>.png`
pub fn thumbnail_key(prefix: &str, source_key: &str) -> String {
    let base = base_name(source_key);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(base);

    format!("{}{}.{}", prefix, stem, THUMBNAIL_EXTENSION)
}

/// Writes thumbnails to the destination store
#[derive(Clone)]
pub struct ArtifactPublisher {
    store: Arc<dyn BlobStore>,
    target_bucket: Option<String>,
    prefix: String,
}

impl ArtifactPublisher {
    pub fn new(store: Arc<dyn BlobStore>, target_bucket: Option<String>, prefix: impl Into<String>) -> Self {
        Self {
            store,
            target_bucket,
            prefix: prefix.into(),
        }
    }

    /// Destination for a source document's thumbnail
    pub fn target_for(&self, source: &SourceArtifact) -> ThumbnailTarget {
        ThumbnailTarget {
            bucket: self
                .target_bucket
                .clone()
                .unwrap_or_else(|| source.bucket.clone()),
            key: thumbnail_key(&self.prefix, &source.key),
        }
    }

    /// Upload the encoded thumbnail; an existing object at the key is replaced
    pub async fn publish(&self, target: &ThumbnailTarget, thumbnail: Thumbnail) -> Result<(), PublishError> {
        self.store
            .put_object(&target.bucket, &target.key, thumbnail.data, THUMBNAIL_CONTENT_TYPE)
            .await
            .map_err(|source| PublishError {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                source,
            })
    }
}
