//! Run outcomes and the invocation result envelope

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::{SkipReason, SourceArtifact};

use super::error::PipelineError;
use super::publisher::ThumbnailTarget;

pub const SKIPPED_MESSAGE: &str = "Skipped non-PDF or thumbnail";
pub const EMPTY_DOCUMENT_MESSAGE: &str = "PDF has no pages.";
pub const PROCESSED_MESSAGE: &str = "Successfully processed PDF";

/// Successful end of a run
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub file_id: Uuid,
    pub source: SourceArtifact,
    pub thumbnail: ThumbnailTarget,
    pub width: u32,
    pub height: u32,
}

/// Terminal state of a run that did not fail
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Classifier rejected the event; the store was not touched
    Skipped { key: String, reason: SkipReason },
    /// Source document has zero pages
    EmptyDocument { source: SourceArtifact },
    Processed(ProcessedDocument),
}

/// Body of an invocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Processed {
        message: String,
        file_id: String,
        thumbnail_path: String,
    },
    Message(String),
}

/// `{statusCode, body}` envelope returned for every invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResult {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl InvocationResult {
    pub fn message(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            body: ResponseBody::Message(message.into()),
        }
    }
}

impl From<&RunOutcome> for InvocationResult {
    fn from(outcome: &RunOutcome) -> Self {
        match outcome {
            RunOutcome::Skipped { .. } => Self::message(200, SKIPPED_MESSAGE),
            RunOutcome::EmptyDocument { .. } => Self::message(400, EMPTY_DOCUMENT_MESSAGE),
            RunOutcome::Processed(done) => Self {
                status_code: 200,
                body: ResponseBody::Processed {
                    message: PROCESSED_MESSAGE.to_string(),
                    file_id: done.file_id.to_string(),
                    thumbnail_path: done.thumbnail.key.clone(),
                },
            },
        }
    }
}

impl From<&PipelineError> for InvocationResult {
    fn from(err: &PipelineError) -> Self {
        Self::message(500, err.to_string())
    }
}

impl From<&Result<RunOutcome, PipelineError>> for InvocationResult {
    fn from(result: &Result<RunOutcome, PipelineError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> SourceArtifact {
        SourceArtifact {
            bucket: "docs".to_string(),
            key: "reports/Q1 2024.pdf".to_string(),
            size: 10240,
        }
    }

    #[test]
    fn test_skipped_envelope() {
        let outcome = RunOutcome::Skipped {
            key: "thumbnails/x.pdf".to_string(),
            reason: SkipReason::DerivedArtifact,
        };
        let value = serde_json::to_value(InvocationResult::from(&outcome)).unwrap();
        assert_eq!(
            value,
            json!({"statusCode": 200, "body": "Skipped non-PDF or thumbnail"})
        );
    }

    #[test]
    fn test_empty_document_envelope() {
        let outcome = RunOutcome::EmptyDocument { source: source() };
        let value = serde_json::to_value(InvocationResult::from(&outcome)).unwrap();
        assert_eq!(value, json!({"statusCode": 400, "body": "PDF has no pages."}));
    }

    #[test]
    fn test_processed_envelope() {
        let file_id = Uuid::new_v4();
        let outcome = RunOutcome::Processed(ProcessedDocument {
            file_id,
            source: source(),
            thumbnail: ThumbnailTarget {
                bucket: "docs".to_string(),
                key: "thumbnails/Q1 2024.png".to_string(),
            },
            width: 155,
            height: 200,
        });

        let value = serde_json::to_value(InvocationResult::from(&outcome)).unwrap();
        assert_eq!(
            value,
            json!({
                "statusCode": 200,
                "body": {
                    "message": "Successfully processed PDF",
                    "file_id": file_id.to_string(),
                    "thumbnail_path": "thumbnails/Q1 2024.png"
                }
            })
        );
    }

    #[test]
    fn test_failure_envelope() {
        let err = PipelineError::Record(crate::pipeline::RecordError::Unavailable(
            "throttled".to_string(),
        ));
        let result = InvocationResult::from(&err);
        assert_eq!(result.status_code, 500);
        assert_eq!(
            result.body,
            ResponseBody::Message("Failed to store metadata: Metadata store unavailable: throttled".to_string())
        );
    }

    #[test]
    fn test_envelope_round_trips() {
        let result = InvocationResult::message(400, EMPTY_DOCUMENT_MESSAGE);
        let text = serde_json::to_string(&result).unwrap();
        let parsed: InvocationResult = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, result);
    }
}
