//! Crop strategies: where a page's raw crop box comes from.

use crate::error::CropError;
use crate::geometry::Rect;
use crate::margin::Margin;
use crate::tracker::TrackerMode;

/// Per-page view used by strategies to measure a page.
pub trait PageExtents {
    /// 1-indexed page number.
    fn page_number(&self) -> usize;

    fn media_box(&self) -> Rect;

    /// Vector bounding box of the page's marks, `None` for a blank page.
    ///
    /// # Errors
    ///
    /// Returns [`CropError::ExtentComputation`] when the page content cannot
    /// be read or decoded.
    fn vector_bounds(&self, mode: TrackerMode) -> Result<Option<Rect>, CropError>;

    /// Ink box of the rendered page, `None` if it renders all white.
    fn raster_bounds(&self) -> Result<Option<Rect>, CropError>;
}

/// Source of a page's raw crop box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CropStrategy {
    /// Fixed inset from the media box.
    Margin(Margin),
    /// Vector bounding box of paths, images and text.
    BoundingBox,
    /// Ink box of the page rendered to grayscale.
    RasterBoundingBox,
    /// Vector bounding box of text only.
    TextBoundingBox,
    /// Odd pages use the first strategy, even pages the second.
    Alternate(Box<[CropStrategy; 2]>),
}

impl Default for CropStrategy {
    fn default() -> Self {
        CropStrategy::Margin(Margin::default())
    }
}

impl CropStrategy {
    pub fn alternate(odd: CropStrategy, even: CropStrategy) -> Self {
        CropStrategy::Alternate(Box::new([odd, even]))
    }

    /// Mirror image of this strategy for facing pages.
    pub fn flipped(&self) -> Self {
        match self {
            CropStrategy::Margin(m) => CropStrategy::Margin(m.flip()),
            CropStrategy::Alternate(pair) => {
                let [odd, even] = &**pair;
                CropStrategy::alternate(odd.flipped(), even.flipped())
            }
            other => other.clone(),
        }
    }

    /// Use this strategy on odd pages and its mirror image on even pages.
    pub fn with_flip(self) -> Self {
        let flipped = self.flipped();
        CropStrategy::alternate(self, flipped)
    }

    /// The non-alternating strategy that applies to `page_number`.
    pub fn for_page(&self, page_number: usize) -> &CropStrategy {
        match self {
            CropStrategy::Alternate(pair) => {
                let chosen = if page_number % 2 == 1 { &pair[0] } else { &pair[1] };
                chosen.for_page(page_number)
            }
            other => other,
        }
    }

    /// Raw crop box of `page`, or `None` when the page shows no marks.
    pub fn raw_box<P: PageExtents + ?Sized>(&self, page: &P) -> Result<Option<Rect>, CropError> {
        match self {
            CropStrategy::Margin(m) => Ok(Some(m.apply(&page.media_box()))),
            CropStrategy::BoundingBox => page.vector_bounds(TrackerMode::All),
            CropStrategy::TextBoundingBox => page.vector_bounds(TrackerMode::TextOnly),
            CropStrategy::RasterBoundingBox => page.raster_bounds(),
            CropStrategy::Alternate(_) => self.for_page(page.page_number()).raw_box(page),
        }
    }

    /// Whether measuring this strategy needs the page's content stream.
    pub fn reads_content(&self) -> bool {
        match self {
            CropStrategy::Margin(_) => false,
            CropStrategy::Alternate(pair) => pair.iter().any(CropStrategy::reads_content),
            _ => true,
        }
    }
}
