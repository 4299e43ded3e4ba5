//! Document handle backed by the MuPDF engine.

use std::path::{Path, PathBuf};

use mupdf::{Colorspace, Document, Matrix, Pixmap};

/// Raw rendered page bitmap, tightly packed RGB (3 bytes per pixel).
#[derive(Clone)]
pub struct PageImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Errors from the document engine seam.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("PDF engine: {0}")]
    Engine(#[from] mupdf::error::Error),

    #[error("document has no pages")]
    Empty,

    #[error("unsupported pixmap format: {channels} channels")]
    PixelFormat { channels: usize },

    #[error("pixmap buffer size mismatch")]
    BufferSize,
}

/// An open document. Immutable once opened; dropping it releases the
/// engine resources, however far `open` got.
pub struct Pdf {
    doc: Document,
    path: PathBuf,
    page_count: usize,
    aspect: f32,
}

impl Pdf {
    /// Open and parse the document at `path`.
    pub fn open(path: &Path) -> Result<Self, PdfError> {
        let doc = Document::open(path.to_string_lossy().as_ref())?;
        let page_count = doc.page_count()? as usize;
        if page_count == 0 {
            return Err(PdfError::Empty);
        }

        // Page 0 is the layout reference for the whole document. Documents
        // with heterogeneous page sizes get proportionally wrong row
        // heights for the other pages.
        let (width, height) = page_extent(&doc, 0)?;

        Ok(Self {
            doc,
            path: path.to_path_buf(),
            page_count,
            aspect: width / height,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Width/height ratio of page 0.
    #[must_use]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Intrinsic size of a page in PDF points, from that page's own bounds.
    pub fn page_extent(&self, index: usize) -> Result<(f32, f32), PdfError> {
        page_extent(&self.doc, index)
    }

    /// Rasterize a page at exactly `target_w` x `target_h` pixels, device
    /// RGB, no alpha.
    pub fn render(&self, index: usize, target_w: u32, target_h: u32) -> Result<PageImage, PdfError> {
        let page = self.doc.load_page(index as i32)?;
        let bounds = page.bounds()?;
        let sx = target_w as f32 / (bounds.x1 - bounds.x0);
        let sy = target_h as f32 / (bounds.y1 - bounds.y0);
        let transform = Matrix::new_scale(sx, sy);

        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&transform, &rgb, false, false)?;
        let pixels = tight_rgb(&pixmap)?;

        Ok(PageImage {
            pixels,
            width: pixmap.width(),
            height: pixmap.height(),
        })
    }
}

impl std::fmt::Debug for Pdf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pdf")
            .field("path", &self.path)
            .field("page_count", &self.page_count)
            .field("aspect", &self.aspect)
            .finish_non_exhaustive()
    }
}

fn page_extent(doc: &Document, index: usize) -> Result<(f32, f32), PdfError> {
    let page = doc.load_page(index as i32)?;
    let bounds = page.bounds()?;
    Ok((bounds.x1 - bounds.x0, bounds.y1 - bounds.y0))
}

/// Copy pixmap samples into a tightly packed RGB buffer, honoring the
/// engine's row stride.
fn tight_rgb(pixmap: &Pixmap) -> Result<Vec<u8>, PdfError> {
    let channels = pixmap.n() as usize;
    if channels != 3 {
        return Err(PdfError::PixelFormat { channels });
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let row_bytes = width * 3;
    let expected_min = stride.saturating_mul(height);
    if samples.len() < expected_min || row_bytes > stride {
        return Err(PdfError::BufferSize);
    }

    let mut out = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        let row_start = y * stride;
        out.extend_from_slice(&samples[row_start..row_start + row_bytes]);
    }

    Ok(out)
}
