//! Page rendering and thumbnail generation
//!
//! - `pdf`: first-page rasterization via MuPDF
//! - `thumbnail`: bounded downscale and PNG encoding

mod pdf;
mod thumbnail;

use std::path::Path;

use thiserror::Error;

pub use pdf::{MupdfRenderer, RENDER_DPI};
pub use thumbnail::{fit_within, Thumbnail, ThumbnailBuilder, THUMBNAIL_CONTENT_TYPE, THUMBNAIL_EXTENSION};

/// Rendering and image processing errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Bytes are not a readable PDF
    #[error("Failed to open document: {0}")]
    Open(String),

    /// Document opened but the page could not be rasterized
    #[error("Failed to render page: {0}")]
    Page(String),

    /// Pixel buffer does not describe a valid image
    #[error("Invalid pixel data: {0}")]
    Pixels(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(String),
}

/// Uncompressed raster of a single page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub width: u32,
    pub height: u32,
    /// Components per pixel (1 gray, 3 RGB, 4 RGBA)
    pub channels: u8,
    /// Row-major samples, `width * height * channels` bytes
    pub samples: Vec<u8>,
}

/// What the renderer found in a document
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Document has no pages
    Empty,
    Rendered(RenderedPage),
}

/// Opens a paged document and rasterizes its first page
///
/// Implementations are blocking; callers run them on the blocking pool.
pub trait PageRenderer: Send + Sync {
    fn render_first_page(&self, path: &Path) -> Result<RenderOutcome, RenderError>;
}
