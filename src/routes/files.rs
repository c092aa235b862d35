//! File metadata routes
//!
//! Looks up metadata records and serves published thumbnails.

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::db::FileMetadata;
use crate::error::{AppError, Result};
use crate::render::THUMBNAIL_CONTENT_TYPE;
use crate::state::AppState;
use crate::storage::ObjectUri;

/// Create the files router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_files))
        .route("/:file_id", get(get_file))
        .route("/:file_id/thumbnail", get(get_thumbnail))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    /// `s3://bucket/key` of the source document
    original_file: String,
}

/// List records for a source document
async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileMetadata>>> {
    let records = state
        .metadata()
        .list_for_source(&query.original_file)
        .await?;
    Ok(Json(records))
}

/// Get a single metadata record
async fn get_file(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Json<FileMetadata>> {
    let record = state
        .metadata()
        .get(&file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;
    Ok(Json(record))
}

/// Serve the thumbnail referenced by a metadata record
async fn get_thumbnail(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response> {
    let record = state
        .metadata()
        .get(&file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

    let uri = ObjectUri::parse(&record.thumbnail_path).ok_or_else(|| {
        AppError::Internal(format!("Invalid thumbnail path: {}", record.thumbnail_path))
    })?;

    let object = state.store().get_object(&uri.bucket, &uri.key).await?;

    let content_type = object
        .metadata
        .content_type
        .unwrap_or_else(|| THUMBNAIL_CONTENT_TYPE.to_string());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, object.data.len())
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from(object.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{create_pool, MetadataStore, SqliteMetadataStore};
    use crate::render::MupdfRenderer;
    use crate::routes::app;
    use crate::storage::MemoryBlobStore;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn setup() -> AppState {
        let store = Arc::new(MemoryBlobStore::new());
        store.insert("docs", "thumbnails/a.png", vec![0x89, b'P', b'N', b'G'], "image/png");

        let pool = create_pool("sqlite::memory:").await.unwrap();
        let metadata = Arc::new(SqliteMetadataStore::new(pool));
        metadata
            .upsert(&FileMetadata {
                file_id: "abc".to_string(),
                original_file: "s3://docs/a.pdf".to_string(),
                thumbnail_path: "s3://docs/thumbnails/a.png".to_string(),
                file_size: 42,
                file_type: "pdf".to_string(),
                created_at: "2024-04-01T00:00:00+00:00".to_string(),
                updated_at: "2024-04-01T00:00:00+00:00".to_string(),
            })
            .await
            .unwrap();

        AppState::new(&Config::default(), store, metadata, Arc::new(MupdfRenderer::new()))
    }

    async fn get(state: AppState, uri: &str) -> Response {
        app(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_file() {
        let response = get(setup().await, "/api/v1/files/abc").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let record: FileMetadata = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record.file_size, 42);
    }

    #[tokio::test]
    async fn test_get_missing_file() {
        let response = get(setup().await, "/api/v1/files/nope").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_by_source() {
        let response = get(setup().await, "/api/v1/files?original_file=s3://docs/a.pdf").await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let records: Vec<FileMetadata> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].file_id, "abc");
    }

    #[tokio::test]
    async fn test_get_thumbnail() {
        let response = get(setup().await, "/api/v1/files/abc/thumbnail").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
    }
}
