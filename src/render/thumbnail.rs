//! Thumbnail generation
//!
//! Turns a rendered page into a PNG that fits a bounding box. Pure
//! in-memory transform.

use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::config::ThumbnailSize;

use super::{RenderError, RenderedPage};

pub const THUMBNAIL_CONTENT_TYPE: &str = "image/png";
pub const THUMBNAIL_EXTENSION: &str = "png";

/// Encoded thumbnail
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct ThumbnailBuilder {
    bounds: ThumbnailSize,
}

impl ThumbnailBuilder {
    pub fn new(bounds: ThumbnailSize) -> Self {
        Self { bounds }
    }

    /// Downscale `page` to fit the bounds and encode it as PNG
    ///
    /// The page's sample buffer is reused as the image buffer.
    pub fn build(&self, page: RenderedPage) -> Result<Thumbnail, RenderError> {
        let image = decode_page(page)?;

        let (width, height) = fit_within(
            image.width(),
            image.height(),
            self.bounds.width,
            self.bounds.height,
        );
        let image = if (width, height) == (image.width(), image.height()) {
            image
        } else {
            image.resize_exact(width, height, FilterType::Lanczos3)
        };

        let mut data = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut data), image::ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;

        Ok(Thumbnail {
            data,
            width,
            height,
        })
    }
}

/// Wrap raw samples in an image buffer matching their channel count
fn decode_page(page: RenderedPage) -> Result<DynamicImage, RenderError> {
    if page.width == 0 || page.height == 0 {
        return Err(RenderError::Pixels(format!(
            "empty raster {}x{}",
            page.width, page.height
        )));
    }

    let expected = page.width as usize * page.height as usize * page.channels as usize;
    if page.samples.len() != expected {
        return Err(RenderError::Pixels(format!(
            "expected {} bytes for {}x{}x{}, got {}",
            expected,
            page.width,
            page.height,
            page.channels,
            page.samples.len()
        )));
    }

    let RenderedPage {
        width,
        height,
        channels,
        samples,
    } = page;
    let image = match channels {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        4 => RgbaImage::from_raw(width, height, samples).map(DynamicImage::ImageRgba8),
        n => {
            return Err(RenderError::Pixels(format!(
                "unsupported channel count {}",
                n
            )))
        }
    };

    image.ok_or_else(|| RenderError::Pixels("failed to create image buffer".to_string()))
}

/// Largest size that fits `max_width x max_height` with the same aspect
/// ratio as `width x height`. Never upscales; never returns a zero side.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, max_width.max(1));
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, max_height.max(1));

    (fitted_width, fitted_height)
}
