use std::io::Write;
use std::path::Path;

use pdfcrop_core::{CropError, DocumentModel, Rect};
use pdfcrop_parse::{FontCache, InterpreterOptions, LopdfDocument};
#[cfg(feature = "raster")]
use pdfcrop_raster::RasterOptions;
use tracing::debug;

use crate::page::PageView;

/// Settings shared by every page of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DocumentOptions {
    pub interpreter: InterpreterOptions,
    #[cfg(feature = "raster")]
    pub raster: RasterOptions,
}

/// An open PDF document.
///
/// Fonts are loaded lazily into a cache shared by all pages, so pages may be
/// measured concurrently through `&Document`.
pub struct Document {
    backend: LopdfDocument,
    fonts: FontCache,
    options: DocumentOptions,
}

impl Document {
    /// Open a PDF document from bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CropError::Document`] if the bytes are not a valid PDF or
    /// the document is encrypted with a non-empty password.
    pub fn open(bytes: &[u8]) -> Result<Self, CropError> {
        Self::open_with_options(bytes, DocumentOptions::default())
    }

    pub fn open_with_options(bytes: &[u8], options: DocumentOptions) -> Result<Self, CropError> {
        let backend = LopdfDocument::open(bytes)?;
        if backend.was_encrypted() {
            debug!("opened encrypted document with the empty password");
        }
        Ok(Self {
            backend,
            fonts: FontCache::new(),
            options,
        })
    }

    /// Open a PDF document from a file path.
    ///
    /// # Errors
    ///
    /// [`CropError::Io`] if the file cannot be read, otherwise as [`Document::open`].
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, CropError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|e| CropError::Io(e.to_string()))?;
        Self::open(&bytes)
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn page_count(&self) -> usize {
        self.backend.page_count()
    }

    /// A view of the page at 0-based `index`.
    ///
    /// # Errors
    ///
    /// [`CropError::Document`] if the index is out of range or the page has
    /// no usable media box.
    pub fn page(&self, index: usize) -> Result<PageView<'_>, CropError> {
        let media_box = self.backend.page_media_box(index)?;
        Ok(PageView::new(self, index, media_box))
    }

    pub fn media_box(&self, index: usize) -> Result<Rect, CropError> {
        Ok(self.backend.page_media_box(index)?)
    }

    /// The page's current crop box, `None` if it has none.
    pub fn crop_box(&self, index: usize) -> Result<Option<Rect>, CropError> {
        Ok(self.backend.page_crop_box(index)?)
    }

    pub fn set_crop_box(&mut self, index: usize, rect: Rect) -> Result<(), CropError> {
        Ok(self.backend.set_crop_box(index, rect)?)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), CropError> {
        Ok(self.backend.save(path)?)
    }

    pub fn save_to<W: Write>(&mut self, target: &mut W) -> Result<(), CropError> {
        Ok(self.backend.save_to(target)?)
    }

    pub fn backend(&self) -> &LopdfDocument {
        &self.backend
    }

    pub(crate) fn fonts(&self) -> &FontCache {
        &self.fonts
    }
}

impl DocumentModel for Document {
    fn page_count(&self) -> usize {
        Document::page_count(self)
    }

    fn media_box(&self, index: usize) -> Result<Rect, CropError> {
        Document::media_box(self, index)
    }

    fn set_crop_box(&mut self, index: usize, rect: Rect) -> Result<(), CropError> {
        Document::set_crop_box(self, index, rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::pdf_with_pages;

    #[test]
    fn open_and_count() {
        let doc = Document::open(&pdf_with_pages(&[b"", b"", b""])).unwrap();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.media_box(0).unwrap(), Rect::new(0.0, 0.0, 612.0, 792.0));
        assert_eq!(doc.crop_box(0).unwrap(), None);
    }

    #[test]
    fn open_invalid_bytes() {
        let err = Document::open(b"not a pdf").err().unwrap();
        assert!(matches!(err, CropError::Document(_)));
    }

    #[test]
    fn open_missing_file() {
        let err = Document::open_file("/nonexistent/input.pdf").err().unwrap();
        assert!(matches!(err, CropError::Io(_)));
    }

    #[test]
    fn page_out_of_range() {
        let doc = Document::open(&pdf_with_pages(&[b""])).unwrap();
        assert!(doc.page(1).is_err());
    }

    #[test]
    fn crop_box_survives_save() {
        let mut doc = Document::open(&pdf_with_pages(&[b"", b""])).unwrap();
        doc.set_crop_box(1, Rect::new(10.0, 20.0, 300.0, 400.0)).unwrap();
        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();

        let reopened = Document::open(&out).unwrap();
        assert_eq!(reopened.crop_box(0).unwrap(), None);
        assert_eq!(
            reopened.crop_box(1).unwrap(),
            Some(Rect::new(10.0, 20.0, 300.0, 400.0))
        );
    }

    #[test]
    fn usable_as_document_model() {
        fn first_media(model: &dyn DocumentModel) -> Rect {
            model.media_box(0).unwrap()
        }
        let doc = Document::open(&pdf_with_pages(&[b""])).unwrap();
        assert_eq!(first_media(&doc).width(), 612.0);
    }
}
