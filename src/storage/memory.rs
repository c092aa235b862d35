//! In-memory blob store
//!
//! Keeps objects in a process-local map. Used for tests and local runs
//! where no S3 endpoint is available.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::StorageError;

use super::types::{BlobStore, ObjectMetadata, StorageObject};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// Blob store backed by a `HashMap` keyed on `(bucket, key)`
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), StoredObject>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object directly
    pub fn insert(&self, bucket: &str, key: &str, data: impl Into<Vec<u8>>, content_type: &str) {
        self.objects.write().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: data.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    /// Raw bytes and content type of a stored object
    pub fn object(&self, bucket: &str, key: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .map(|o| (o.data.clone(), o.content_type.clone()))
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .read()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    /// Number of objects across all buckets
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    fn lookup(&self, bucket: &str, key: &str) -> Result<StoredObject, StorageError> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(format!("s3://{}/{}", bucket, key)))
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn download_to(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, StorageError> {
        let object = self.lookup(bucket, key)?;
        tokio::fs::write(dest, &object.data).await?;
        Ok(object.data.len() as u64)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.insert(bucket, key, data, content_type);
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<StorageObject, StorageError> {
        let object = self.lookup(bucket, key)?;

        Ok(StorageObject {
            metadata: ObjectMetadata {
                key: key.to_string(),
                size: object.data.len() as i64,
                last_modified: Some(Utc::now()),
                content_type: Some(object.content_type),
                etag: None,
            },
            data: object.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryBlobStore::new();
        store
            .put_object("bucket", "a/b.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        let object = store.get_object("bucket", "a/b.png").await.unwrap();
        assert_eq!(object.data, vec![1, 2, 3]);
        assert_eq!(object.metadata.size, 3);
        assert_eq!(object.metadata.content_type.as_deref(), Some("image/png"));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryBlobStore::new();
        store.insert("bucket", "k", b"first".to_vec(), "text/plain");
        store
            .put_object("bucket", "k", b"second".to_vec(), "text/plain")
            .await
            .unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.object("bucket", "k").unwrap().0, b"second");
    }

    #[tokio::test]
    async fn test_download_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("doc.pdf");

        let store = MemoryBlobStore::new();
        store.insert("bucket", "doc.pdf", b"%PDF-1.4".to_vec(), "application/pdf");

        let written = store.download_to("bucket", "doc.pdf", &dest).await.unwrap();
        assert_eq!(written, 8);
        assert_eq!(std::fs::read(&dest).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_missing_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = MemoryBlobStore::new();

        let result = store
            .download_to("bucket", "missing.pdf", &temp_dir.path().join("x"))
            .await;

        assert!(matches!(result, Err(StorageError::ObjectNotFound(_))));
    }
}
