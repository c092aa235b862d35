//! Pipeline orchestrator
//!
//! Sequences the stages for one event and owns the workspace for the run.
//!
//! ```text
//! Received ──classify──▶ Skipped (200)
//!    │
//!    ▼
//! Fetched ──render──▶ EmptyDocument (400)
//!    │
//!    ▼
//! Rendered ─▶ Thumbnailed ─▶ Published ─▶ Recorded (200)
//!
//! any error after allocation ─▶ Failed (500)
//! ```
//!
//! The workspace is released once, after the stages finish, whatever the
//! outcome. A failed release is logged and does not change the result.
//! Metadata is written only after the thumbnail upload succeeds; a crash
//! between the two leaves a thumbnail with no record.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::db::MetadataStore;
use crate::event::{Classification, EventClassifier, IngestionEvent, SourceArtifact};
use crate::render::{PageRenderer, RenderError, RenderOutcome, ThumbnailBuilder};
use crate::storage::BlobStore;
use crate::workspace::Workspace;

use super::error::{FetchError, PipelineError};
use super::fetcher::ArtifactFetcher;
use super::publisher::ArtifactPublisher;
use super::recorder::MetadataRecorder;
use super::types::{InvocationResult, ProcessedDocument, RunOutcome};

/// Ingestion pipeline with its collaborators
///
/// Built once by the host and shared across invocations; runs share no
/// mutable state.
#[derive(Clone)]
pub struct Pipeline {
    classifier: EventClassifier,
    fetcher: ArtifactFetcher,
    renderer: Arc<dyn PageRenderer>,
    builder: ThumbnailBuilder,
    publisher: ArtifactPublisher,
    recorder: MetadataRecorder,
    work_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        config: &PipelineConfig,
        store: Arc<dyn BlobStore>,
        renderer: Arc<dyn PageRenderer>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            classifier: EventClassifier::new(&config.thumbnail_prefix),
            fetcher: ArtifactFetcher::new(store.clone()),
            renderer,
            builder: ThumbnailBuilder::new(config.thumbnail_size),
            publisher: ArtifactPublisher::new(
                store,
                config.target_bucket.clone(),
                config.thumbnail_prefix.clone(),
            ),
            recorder: MetadataRecorder::new(metadata),
            work_dir: config.work_dir.clone(),
        }
    }

    /// Run the pipeline and convert the outcome into an invocation result
    pub async fn handle(&self, event: &IngestionEvent) -> InvocationResult {
        let result = self.run(event).await;

        match &result {
            Ok(RunOutcome::Skipped { key, reason }) => {
                tracing::info!(key = %key, reason = ?reason, "Skipping event - not a PDF upload or is a thumbnail");
            }
            Ok(RunOutcome::EmptyDocument { source }) => {
                tracing::warn!(bucket = %source.bucket, key = %source.key, "PDF has no pages");
            }
            Ok(RunOutcome::Processed(done)) => {
                tracing::info!(
                    file_id = %done.file_id,
                    thumbnail = %done.thumbnail.uri(),
                    width = done.width,
                    height = done.height,
                    "Successfully processed PDF"
                );
            }
            Err(e) => {
                tracing::error!(stage = e.stage().as_str(), "Pipeline failed: {}", e);
            }
        }

        InvocationResult::from(&result)
    }

    /// Drive one event to a terminal state
    pub async fn run(&self, event: &IngestionEvent) -> Result<RunOutcome, PipelineError> {
        let source = match self.classifier.classify(event)? {
            Classification::Skip { key, reason } => {
                return Ok(RunOutcome::Skipped { key, reason });
            }
            Classification::Proceed(source) => source,
        };

        let file_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "ingest",
            file_id = %file_id,
            bucket = %source.bucket,
            key = %source.key
        );

        self.run_source(file_id, source).instrument(span).await
    }

    /// Allocate the workspace, run the stages, release the workspace
    async fn run_source(
        &self,
        file_id: Uuid,
        source: SourceArtifact,
    ) -> Result<RunOutcome, PipelineError> {
        tracing::info!("Processing: {}", source.uri());

        let workspace = Workspace::allocate(&self.work_dir, &source.key)
            .await
            .map_err(FetchError::Workspace)?;

        let result = self.process(file_id, &source, &workspace).await;

        if let Err(e) = workspace.release().await {
            tracing::warn!("Cleanup error: {}", e);
        }

        result
    }

    async fn process(
        &self,
        file_id: Uuid,
        source: &SourceArtifact,
        workspace: &Workspace,
    ) -> Result<RunOutcome, PipelineError> {
        let bytes = self.fetcher.fetch_into(source, workspace).await?;
        tracing::debug!(bytes, "Fetched source document");

        let renderer = Arc::clone(&self.renderer);
        let path = workspace.path().to_path_buf();
        let outcome = tokio::task::spawn_blocking(move || renderer.render_first_page(&path))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;

        let page = match outcome {
            RenderOutcome::Empty => {
                return Ok(RunOutcome::EmptyDocument {
                    source: source.clone(),
                });
            }
            RenderOutcome::Rendered(page) => page,
        };

        let builder = self.builder;
        let thumbnail = tokio::task::spawn_blocking(move || builder.build(page))
            .await
            .map_err(|e| RenderError::Task(e.to_string()))??;
        let (width, height) = (thumbnail.width, thumbnail.height);

        let target = self.publisher.target_for(source);
        self.publisher.publish(&target, thumbnail).await?;
        tracing::debug!(thumbnail = %target.uri(), "Published thumbnail");

        self.recorder.record(file_id, source, &target).await?;

        Ok(RunOutcome::Processed(ProcessedDocument {
            file_id,
            source: source.clone(),
            thumbnail: target,
            width,
            height,
        }))
    }
}
