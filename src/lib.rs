//! PDF Thumbnailer Library
//!
//! Event-driven thumbnail pipeline for PDFs in object storage. The server
//! binary is in main.rs.
//!
//! # Modules
//!
//! - `event`: notification decoding and classification
//! - `pipeline`: fetch, render, publish and record stages
//! - `render`: first-page rasterization and thumbnail encoding
//! - `storage`: S3 and in-memory blob stores

pub mod config;
pub mod db;
pub mod error;
pub mod event;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod state;
pub mod storage;
pub mod workspace;
