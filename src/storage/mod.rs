//! Storage module for S3-compatible backends
//!
//! The pipeline talks to object storage through [`BlobStore`], so any
//! backend (AWS S3, MinIO, R2, or the in-memory store used in tests) can be
//! handed to it by the host.

mod memory;
mod s3_client;
mod types;

pub use memory::MemoryBlobStore;
pub use s3_client::S3Client;
pub use types::*;
