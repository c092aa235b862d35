//! Event wire shapes and the normalized source reference

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::storage::ObjectUri;

/// Errors raised while reading a notification
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("Event is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("Unrecognized event shape: expected 'Records' or 'detail'")]
    UnrecognizedShape,

    #[error("Malformed '{shape}' event: {reason}")]
    Malformed { shape: &'static str, reason: String },

    #[error("Event contains no records")]
    NoRecords,

    #[error("Object key '{0}' is not valid percent-encoded UTF-8")]
    InvalidKey(String),
}

/// Bucket reference inside a notification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BucketRef {
    pub name: String,
}

/// Object reference inside a notification; `key` is still percent-encoded
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectRef {
    pub key: String,
    pub size: i64,
}

/// The `{bucket, object}` pair both shapes carry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObjectNotification {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

/// One entry of the batch shape
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationRecord {
    pub s3: ObjectNotification,
}

/// `{"Records": [{"s3": {...}}]}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchNotification {
    #[serde(rename = "Records")]
    pub records: Vec<NotificationRecord>,
}

/// `{"detail": {...}}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SingleNotification {
    pub detail: ObjectNotification,
}

/// An inbound notification in either supported shape
#[derive(Debug, Clone)]
pub enum IngestionEvent {
    Batch(BatchNotification),
    Single(SingleNotification),
}

impl IngestionEvent {
    /// Parse raw request bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ClassificationError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ClassificationError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Pick the shape by its top-level field; `Records` wins when both exist
    pub fn from_value(value: Value) -> Result<Self, ClassificationError> {
        if value.get("Records").is_some() {
            serde_json::from_value(value)
                .map(Self::Batch)
                .map_err(|e| ClassificationError::Malformed {
                    shape: "Records",
                    reason: e.to_string(),
                })
        } else if value.get("detail").is_some() {
            serde_json::from_value(value)
                .map(Self::Single)
                .map_err(|e| ClassificationError::Malformed {
                    shape: "detail",
                    reason: e.to_string(),
                })
        } else {
            Err(ClassificationError::UnrecognizedShape)
        }
    }

    /// The object this event describes; only the first batch record is used
    pub fn notification(&self) -> Result<&ObjectNotification, ClassificationError> {
        match self {
            IngestionEvent::Batch(batch) => batch
                .records
                .first()
                .map(|record| &record.s3)
                .ok_or(ClassificationError::NoRecords),
            IngestionEvent::Single(single) => Ok(&single.detail),
        }
    }
}

/// Immutable reference to the source document as it existed at trigger time
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceArtifact {
    pub bucket: String,
    /// Decoded object key
    pub key: String,
    pub size: i64,
}

impl SourceArtifact {
    pub fn uri(&self) -> ObjectUri {
        ObjectUri::new(&self.bucket, &self.key)
    }

    /// Final path segment of the key
    pub fn base_name(&self) -> &str {
        base_name(&self.key)
    }
}

/// Final `/`-separated segment of an object key
pub fn base_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
