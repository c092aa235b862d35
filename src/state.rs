//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::db::MetadataStore;
use crate::pipeline::Pipeline;
use crate::render::PageRenderer;
use crate::storage::BlobStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pub store: Arc<dyn BlobStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub pipeline: Pipeline,
}

impl AppState {
    /// Create a new application state
    ///
    /// The pipeline is built from the same store handles the lookup routes
    /// use, so there is a single client per backend.
    pub fn new(
        config: &Config,
        store: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
        renderer: Arc<dyn PageRenderer>,
    ) -> Self {
        let pipeline = Pipeline::new(&config.pipeline, store.clone(), renderer, metadata.clone());

        Self {
            inner: Arc::new(AppStateInner {
                store,
                metadata,
                pipeline,
            }),
        }
    }

    /// Get the blob store
    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.inner.store
    }

    /// Get the metadata store
    pub fn metadata(&self) -> &Arc<dyn MetadataStore> {
        &self.inner.metadata
    }

    /// Get the ingestion pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }
}
