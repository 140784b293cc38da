//! Collaborator interfaces implemented outside this crate.

pub use crate::content::ContentVisitor;
pub use crate::font::FontOutlineProvider;
pub use crate::strategy::PageExtents;

use crate::error::CropError;
use crate::geometry::Rect;

/// Page geometry access of a paginated document. Indices are 0-based.
pub trait DocumentModel {
    fn page_count(&self) -> usize;

    /// Full physical page rectangle, with inheritance resolved.
    fn media_box(&self, index: usize) -> Result<Rect, CropError>;

    /// Replace the visible area of a page.
    fn set_crop_box(&mut self, index: usize, rect: Rect) -> Result<(), CropError>;
}
