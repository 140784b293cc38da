use pdfcrop_core::{BoundingBoxTracker, CropError, PageExtents, Rect, TrackerMode};
use pdfcrop_parse::{BackendError, ContentInterpreter};
use tracing::debug;

use crate::document::Document;

/// A single page of a [`Document`], measured on demand.
#[derive(Clone, Copy)]
pub struct PageView<'a> {
    doc: &'a Document,
    index: usize,
    media_box: Rect,
}

impl<'a> PageView<'a> {
    pub(crate) fn new(doc: &'a Document, index: usize, media_box: Rect) -> Self {
        Self {
            doc,
            index,
            media_box,
        }
    }

    /// 0-based page index.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based page number.
    pub fn page_number(&self) -> usize {
        self.index + 1
    }

    pub fn media_box(&self) -> Rect {
        self.media_box
    }

    pub fn crop_box(&self) -> Result<Option<Rect>, CropError> {
        self.doc.crop_box(self.index)
    }

    /// Vector bounding box of the page's marks under `mode`.
    ///
    /// # Errors
    ///
    /// [`CropError::ExtentComputation`] if the content stream cannot be read.
    pub fn vector_bounds(&self, mode: TrackerMode) -> Result<Option<Rect>, CropError> {
        let fonts = self.doc.fonts();
        let mut tracker = BoundingBoxTracker::new(fonts, mode);
        ContentInterpreter::new(self.doc.backend(), fonts)
            .with_options(self.doc.options().interpreter)
            .run_page(self.index, &mut tracker)
            .map_err(|e| extent_error(self.page_number(), e))?;
        if tracker.skipped_glyphs() > 0 {
            debug!(
                page = self.page_number(),
                skipped = tracker.skipped_glyphs(),
                "glyphs without outline"
            );
        }
        Ok(tracker.finish())
    }

    /// Ink box of the page rendered at the document's raster scale.
    #[cfg(feature = "raster")]
    pub fn raster_bounds(&self) -> Result<Option<Rect>, CropError> {
        let image = self.render_gray()?;
        let scale = self.doc.options().raster.scale;
        Ok(pdfcrop_core::raster_bounds(&image, &self.media_box, scale))
    }

    #[cfg(not(feature = "raster"))]
    pub fn raster_bounds(&self) -> Result<Option<Rect>, CropError> {
        Err(CropError::ExtentComputation {
            page: self.page_number(),
            message: "raster bounding box requires the `raster` feature".to_string(),
        })
    }

    /// Render the page to grayscale.
    #[cfg(feature = "raster")]
    pub fn render_gray(&self) -> Result<pdfcrop_core::GrayImage, CropError> {
        let options = self.doc.options();
        pdfcrop_raster::RasterRenderer::new(self.doc.backend(), self.doc.fonts())
            .with_options(options.raster)
            .with_interpreter_options(options.interpreter)
            .render_gray(self.index)
            .map_err(|e| match e {
                pdfcrop_raster::RasterError::Backend(e) => extent_error(self.page_number(), e),
                other => CropError::from(other).on_page(self.page_number()),
            })
    }
}

impl PageExtents for PageView<'_> {
    fn page_number(&self) -> usize {
        PageView::page_number(self)
    }

    fn media_box(&self) -> Rect {
        self.media_box
    }

    fn vector_bounds(&self, mode: TrackerMode) -> Result<Option<Rect>, CropError> {
        PageView::vector_bounds(self, mode)
    }

    fn raster_bounds(&self) -> Result<Option<Rect>, CropError> {
        PageView::raster_bounds(self)
    }
}

/// Failure to read a page's content, attributed to that page.
fn extent_error(page: usize, err: BackendError) -> CropError {
    match CropError::from(err) {
        CropError::Document(message) | CropError::Io(message) => {
            CropError::ExtentComputation { page, message }
        }
        other => other.on_page(page),
    }
}
