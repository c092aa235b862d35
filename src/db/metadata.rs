//! File metadata records

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::pipeline::RecordError;

/// Metadata record describing a source document and its thumbnail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileMetadata {
    pub file_id: String,
    /// `s3://bucket/key` of the source document
    pub original_file: String,
    /// `s3://bucket/key` of the published thumbnail
    pub thumbnail_path: String,
    pub file_size: i64,
    pub file_type: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Record store keyed by `file_id`
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Insert a record, replacing any record with the same `file_id`
    async fn upsert(&self, record: &FileMetadata) -> Result<(), RecordError>;

    async fn get(&self, file_id: &str) -> Result<Option<FileMetadata>, RecordError>;

    /// All records for a source document URI, newest first
    async fn list_for_source(&self, original_file: &str) -> Result<Vec<FileMetadata>, RecordError>;
}

/// SQLite-backed metadata store
#[derive(Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn upsert(&self, record: &FileMetadata) -> Result<(), RecordError> {
        sqlx::query(
            r#"
            INSERT INTO file_metadata (
                file_id, original_file, thumbnail_path, file_size, file_type,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(file_id) DO UPDATE SET
                original_file = excluded.original_file,
                thumbnail_path = excluded.thumbnail_path,
                file_size = excluded.file_size,
                file_type = excluded.file_type,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&record.file_id)
        .bind(&record.original_file)
        .bind(&record.thumbnail_path)
        .bind(record.file_size)
        .bind(&record.file_type)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, file_id: &str) -> Result<Option<FileMetadata>, RecordError> {
        let record = sqlx::query_as::<_, FileMetadata>(
            r#"
            SELECT file_id, original_file, thumbnail_path, file_size, file_type,
                   created_at, updated_at
            FROM file_metadata
            WHERE file_id = ?
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list_for_source(&self, original_file: &str) -> Result<Vec<FileMetadata>, RecordError> {
        let records = sqlx::query_as::<_, FileMetadata>(
            r#"
            SELECT file_id, original_file, thumbnail_path, file_size, file_type,
                   created_at, updated_at
            FROM file_metadata
            WHERE original_file = ?
            ORDER BY created_at DESC
            "#,
        )
        .bind(original_file)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;

    fn record(file_id: &str, created_at: &str) -> FileMetadata {
        FileMetadata {
            file_id: file_id.to_string(),
            original_file: "s3://docs/reports/a.pdf".to_string(),
            thumbnail_path: "s3://docs/thumbnails/a.png".to_string(),
            file_size: 10240,
            file_type: "pdf".to_string(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    async fn store() -> SqliteMetadataStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        SqliteMetadataStore::new(pool)
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let store = store().await;
        let rec = record("id-1", "2024-04-01T00:00:00+00:00");

        store.upsert(&rec).await.unwrap();

        assert_eq!(store.get("id-1").await.unwrap(), Some(rec));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_upsert_replaces_same_key() {
        let store = store().await;
        store.upsert(&record("id-1", "2024-04-01T00:00:00+00:00")).await.unwrap();

        let mut updated = record("id-1", "2024-04-02T00:00:00+00:00");
        updated.file_size = 1;
        store.upsert(&updated).await.unwrap();

        let fetched = store.get("id-1").await.unwrap().unwrap();
        assert_eq!(fetched.file_size, 1);
        assert_eq!(fetched.updated_at, "2024-04-02T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_list_for_source() {
        let store = store().await;
        store.upsert(&record("id-1", "2024-04-01T00:00:00+00:00")).await.unwrap();
        store.upsert(&record("id-2", "2024-04-02T00:00:00+00:00")).await.unwrap();

        let records = store.list_for_source("s3://docs/reports/a.pdf").await.unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["id-2", "id-1"]);

        assert!(store.list_for_source("s3://docs/other.pdf").await.unwrap().is_empty());
    }
}
