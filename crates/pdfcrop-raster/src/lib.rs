//! pdfcrop-raster: grayscale page rendering for the raster bounding box.
//!
//! Pages are replayed through the content interpreter into a tiny-skia
//! pixmap: paths are filled and stroked with their gray level, images are
//! painted as black quads and glyphs as filled outline boxes. The result is
//! a [`GrayImage`] suitable for [`pdfcrop_core::raster_bounds`].

mod error;
mod painter;

pub use error::RasterError;

use pdfcrop_core::{GrayImage, Rect};
use pdfcrop_parse::{ContentInterpreter, FontCache, InterpreterOptions, LopdfDocument};
use tiny_skia::Pixmap;
use tracing::debug;

use crate::painter::PixmapPainter;

/// Largest pixmap side, in pixels.
const MAX_SIDE: u64 = 1 << 15;

/// Raster resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    /// Pixels per PDF unit; `1.0` renders at 72 dpi.
    pub scale: f64,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl RasterOptions {
    pub fn from_dpi(dpi: f64) -> Self {
        Self { scale: dpi / 72.0 }
    }
}

/// Renders pages of one document.
pub struct RasterRenderer<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a FontCache,
    options: RasterOptions,
    interpreter: InterpreterOptions,
}

impl<'a> RasterRenderer<'a> {
    pub fn new(doc: &'a LopdfDocument, fonts: &'a FontCache) -> Self {
        Self {
            doc,
            fonts,
            options: RasterOptions::default(),
            interpreter: InterpreterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RasterOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_interpreter_options(mut self, options: InterpreterOptions) -> Self {
        self.interpreter = options;
        self
    }

    pub fn options(&self) -> RasterOptions {
        self.options
    }

    /// Render the page at 0-based `index` over its media box.
    ///
    /// # Errors
    ///
    /// [`RasterError::InvalidScale`] for a non-positive scale,
    /// [`RasterError::Pixmap`] if the page is too large or empty at that
    /// scale, and [`RasterError::Backend`] if the page cannot be read.
    pub fn render_gray(&self, index: usize) -> Result<GrayImage, RasterError> {
        let scale = self.options.scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(RasterError::InvalidScale(scale));
        }
        let media = self.doc.page_media_box(index)?;
        let pixmap = allocate(&media, scale)?;
        debug!(
            page = index + 1,
            width = pixmap.width(),
            height = pixmap.height(),
            "rendering page"
        );

        let mut painter = PixmapPainter::new(pixmap, &media, scale, self.fonts);
        ContentInterpreter::new(self.doc, self.fonts)
            .with_options(self.interpreter)
            .run_page(index, &mut painter)?;
        Ok(painter.into_gray())
    }
}

/// Render one page with default interpreter options.
///
/// # Errors
///
/// See [`RasterRenderer::render_gray`].
pub fn render_gray(
    doc: &LopdfDocument,
    fonts: &FontCache,
    index: usize,
    options: RasterOptions,
) -> Result<GrayImage, RasterError> {
    RasterRenderer::new(doc, fonts)
        .with_options(options)
        .render_gray(index)
}

fn allocate(media: &Rect, scale: f64) -> Result<Pixmap, RasterError> {
    let width = (media.width() * scale).ceil().max(0.0) as u64;
    let height = (media.height() * scale).ceil().max(0.0) as u64;
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(RasterError::Pixmap { width, height });
    }
    Pixmap::new(width as u32, height as u32).ok_or(RasterError::Pixmap { width, height })
}
