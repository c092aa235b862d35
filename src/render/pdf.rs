//! MuPDF page renderer
//!
//! Opens the workspace file as a PDF and rasterizes page 0 in device RGB.
//! The document and page handles never outlive `render_first_page`.

use std::path::Path;

use mupdf::{Colorspace, Document, Matrix};

use super::{PageRenderer, RenderError, RenderOutcome, RenderedPage};

/// Rasterization resolution for the first page
pub const RENDER_DPI: f32 = 150.0;

const POINTS_PER_INCH: f32 = 72.0;
const PDF_MIME: &str = "application/pdf";
const PDF_MAGIC: &[u8] = b"%PDF";
const HEADER_SEARCH_WINDOW: usize = 1024;

/// [`PageRenderer`] backed by MuPDF
#[derive(Debug, Clone, Copy)]
pub struct MupdfRenderer {
    dpi: f32,
}

impl MupdfRenderer {
    pub fn new() -> Self {
        Self::with_dpi(RENDER_DPI)
    }

    pub fn with_dpi(dpi: f32) -> Self {
        Self { dpi }
    }

    fn rasterize(&self, data: &[u8]) -> Result<RenderOutcome, RenderError> {
        if !has_pdf_header(data) {
            return Err(RenderError::Open("missing %PDF header".to_string()));
        }

        // Opened by MIME type rather than file name: keys like `Scan.PDF`
        // must open the same way as lowercase ones.
        let document =
            Document::from_bytes(data, PDF_MIME).map_err(|e| RenderError::Open(e.to_string()))?;

        let page_count = document
            .page_count()
            .map_err(|e| RenderError::Open(e.to_string()))?;
        if page_count <= 0 {
            return Ok(RenderOutcome::Empty);
        }

        let page = document
            .load_page(0)
            .map_err(|e| RenderError::Page(e.to_string()))?;

        let scale = self.dpi / POINTS_PER_INCH;
        let matrix = Matrix::new_scale(scale, scale);
        let colorspace = Colorspace::device_rgb();
        let pixmap = page
            .to_pixmap(&matrix, &colorspace, false, true)
            .map_err(|e| RenderError::Page(e.to_string()))?;

        Ok(RenderOutcome::Rendered(RenderedPage {
            width: pixmap.width() as u32,
            height: pixmap.height() as u32,
            channels: pixmap.n() as u8,
            samples: pixmap.samples().to_vec(),
        }))
    }
}

/// Readers accept the header anywhere in the first KiB
fn has_pdf_header(data: &[u8]) -> bool {
    let head = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    head.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

impl Default for MupdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for MupdfRenderer {
    fn render_first_page(&self, path: &Path) -> Result<RenderOutcome, RenderError> {
        let data = std::fs::read(path)?;
        let outcome = self.rasterize(&data)?;

        if let RenderOutcome::Rendered(page) = &outcome {
            tracing::debug!(
                path = %path.display(),
                width = page.width,
                height = page.height,
                dpi = self.dpi,
                "Rendered first page"
            );
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // MuPDF rebuilds the missing xref table, so these stay minimal.
    const ONE_PAGE_PDF: &[u8] = b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [3 0 R] /Count 1 >> endobj
3 0 obj << /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] >> endobj
trailer << /Root 1 0 R >>
%%EOF
";

    const ZERO_PAGE_PDF: &[u8] = b"%PDF-1.4
1 0 obj << /Type /Catalog /Pages 2 0 R >> endobj
2 0 obj << /Type /Pages /Kids [] /Count 0 >> endobj
trailer << /Root 1 0 R >>
%%EOF
";

    fn write_temp(dir: &TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_renders_first_page_at_150_dpi() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_temp(&temp_dir, "letter.pdf", ONE_PAGE_PDF);

        let outcome = MupdfRenderer::new().render_first_page(&path).unwrap();
        let page = match outcome {
            RenderOutcome::Rendered(page) => page,
            RenderOutcome::Empty => panic!("Expected a rendered page"),
        };

        // 8.5in x 11in at 150 DPI
        assert!((1274..=1276).contains(&page.width), "width {}", page.width);
        assert!((1649..=1651).contains(&page.height), "height {}", page.height);
        assert_eq!(page.channels, 3);
        assert_eq!(
            page.samples.len(),
            (page.width * page.height * page.channels as u32) as usize
        );
    }

    #[test]
    fn test_zero_pages_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_temp(&temp_dir, "empty.pdf", ZERO_PAGE_PDF);

        let outcome = MupdfRenderer::new().render_first_page(&path).unwrap();
        assert!(matches!(outcome, RenderOutcome::Empty));
    }

    #[test]
    fn test_garbage_is_render_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_temp(&temp_dir, "fake.pdf", b"this is not a pdf");

        let result = MupdfRenderer::new().render_first_page(&path);
        assert!(matches!(result, Err(RenderError::Open(_))));
    }

    #[test]
    fn test_pdf_header_detection() {
        assert!(has_pdf_header(b"%PDF-1.7\n"));
        assert!(has_pdf_header(b"\xef\xbb\xbf junk %PDF-1.4"));
        assert!(!has_pdf_header(b"PK\x03\x04"));
        assert!(!has_pdf_header(b""));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = MupdfRenderer::new().render_first_page(&temp_dir.path().join("nope.pdf"));
        assert!(matches!(result, Err(RenderError::Io(_))));
    }
}
