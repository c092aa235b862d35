//! Source document download

use std::sync::Arc;

use crate::event::SourceArtifact;
use crate::storage::BlobStore;
use crate::workspace::Workspace;

use super::error::FetchError;

/// Copies a source object into a run's workspace
#[derive(Clone)]
pub struct ArtifactFetcher {
    store: Arc<dyn BlobStore>,
}

impl ArtifactFetcher {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Stream `source` into `workspace`, returning the bytes written
    pub async fn fetch_into(
        &self,
        source: &SourceArtifact,
        workspace: &Workspace,
    ) -> Result<u64, FetchError> {
        let written = self
            .store
            .download_to(&source.bucket, &source.key, workspace.path())
            .await?;

        if written as i64 != source.size {
            // Object may have been replaced since the event fired
            tracing::debug!(
                expected = source.size,
                actual = written,
                "Downloaded size differs from event size"
            );
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryBlobStore;
    use tempfile::TempDir;

    fn source(key: &str) -> SourceArtifact {
        SourceArtifact {
            bucket: "docs".to_string(),
            key: key.to_string(),
            size: 8,
        }
    }

    #[tokio::test]
    async fn test_fetch_into_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(MemoryBlobStore::new());
        store.insert("docs", "reports/a.pdf", b"%PDF-1.4".to_vec(), "application/pdf");

        let fetcher = ArtifactFetcher::new(store);
        let workspace = Workspace::allocate(temp_dir.path(), "reports/a.pdf").await.unwrap();

        let written = fetcher
            .fetch_into(&source("reports/a.pdf"), &workspace)
            .await
            .unwrap();

        assert_eq!(written, 8);
        assert_eq!(std::fs::read(workspace.path()).unwrap(), b"%PDF-1.4");
    }

    #[tokio::test]
    async fn test_fetch_missing_object() {
        let temp_dir = TempDir::new().unwrap();
        let fetcher = ArtifactFetcher::new(Arc::new(MemoryBlobStore::new()));
        let workspace = Workspace::allocate(temp_dir.path(), "gone.pdf").await.unwrap();

        let result = fetcher.fetch_into(&source("gone.pdf"), &workspace).await;
        assert!(matches!(
            result,
            Err(FetchError::Storage(StorageError::ObjectNotFound(_)))
        ));
    }
}
