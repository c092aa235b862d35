//! Ingestion events
//!
//! Object-created notifications arrive in one of two wire shapes: the
//! batch `Records` shape of direct bucket notifications, or the single
//! `detail` shape delivered through an event bus. Both are reduced to a
//! [`SourceArtifact`] before anything else looks at them.

mod classifier;
mod types;

pub use classifier::{decode_key, Classification, EventClassifier, SkipReason};
pub use types::*;
