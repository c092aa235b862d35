//! Storage types

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Metadata about a storage object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: i64,
    pub last_modified: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
}

/// A storage object with its data
#[derive(Debug)]
pub struct StorageObject {
    pub metadata: ObjectMetadata,
    pub data: Vec<u8>,
}

/// Object storage operations needed by the pipeline and lookup routes
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stream an object into a local file, returning the number of bytes written
    async fn download_to(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError>;

    /// Write an object, replacing any existing object at the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Read an object fully into memory
    async fn get_object(&self, bucket: &str, key: &str) -> Result<StorageObject, StorageError>;
}

/// `s3://bucket/key` reference to a stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUri {
    pub bucket: String,
    pub key: String,
}

impl ObjectUri {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` string
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("s3://")?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }
}

impl std::fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}
