//! Event classification
//!
//! Decides whether a notification describes a PDF this pipeline should
//! render. Thumbnails written under the configured prefix are rejected so
//! the pipeline never re-triggers on its own output.

use super::types::{ClassificationError, IngestionEvent, SourceArtifact};

const DOCUMENT_EXTENSION: &str = ".pdf";

/// Why an event was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Key does not end in `.pdf`
    NotPdf,
    /// Key lives under the thumbnail prefix
    DerivedArtifact,
}

/// Result of classifying an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Proceed(SourceArtifact),
    Skip { key: String, reason: SkipReason },
}

/// Gate in front of the pipeline
#[derive(Debug, Clone)]
pub struct EventClassifier {
    /// Lowercased thumbnail prefix
    prefix: String,
}

impl EventClassifier {
    /// Build a classifier for thumbnails written under `thumbnail_prefix`
    ///
    /// An empty prefix turns the derived-artifact check off: every `.pdf`
    /// key is processed. A literal prefix match would instead treat every
    /// key as a thumbnail and skip all events. Thumbnail keys end in
    /// `.png`, so the extension check still keeps them out.
    pub fn new(thumbnail_prefix: &str) -> Self {
        Self {
            prefix: thumbnail_prefix.to_lowercase(),
        }
    }

    /// Normalize an event and decide whether to process it
    pub fn classify(&self, event: &IngestionEvent) -> Result<Classification, ClassificationError> {
        let notification = event.notification()?;
        let key = decode_key(&notification.object.key)?;

        if let Some(reason) = self.skip_reason(&key) {
            return Ok(Classification::Skip { key, reason });
        }

        Ok(Classification::Proceed(SourceArtifact {
            bucket: notification.bucket.name.clone(),
            key,
            size: notification.object.size,
        }))
    }

    /// `None` when a decoded key should be processed
    pub fn skip_reason(&self, key: &str) -> Option<SkipReason> {
        let lowered = key.to_lowercase();

        if !lowered.ends_with(DOCUMENT_EXTENSION) {
            Some(SkipReason::NotPdf)
        } else if !self.prefix.is_empty() && lowered.starts_with(&self.prefix) {
            Some(SkipReason::DerivedArtifact)
        } else {
            None
        }
    }
}

/// Decode a notification key: `+` means space, then percent-decoding
pub fn decode_key(raw: &str) -> Result<String, ClassificationError> {
    let plus_decoded = raw.replace('+', " ");
    urlencoding::decode(&plus_decoded)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ClassificationError::InvalidKey(raw.to_string()))
}
