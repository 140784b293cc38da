//! Glyph outline access used by the bounding-box tracker.

use crate::content::FontRef;
use crate::error::CropError;
use crate::geometry::{Ctm, Rect};

/// How the bounds of a [`GlyphOutline`] relate to glyph space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineKind {
    /// Bounds are already in glyph space.
    Vector,
    /// Bounds are in font design units and must be rescaled by
    /// `1000 / units_per_em` before the font matrix applies (TrueType-style
    /// fonts whose font matrix assumes a 1000-unit em).
    Scaled { units_per_em: u16 },
    /// Bounds are a declared glyph box of a procedural (Type 3) glyph and
    /// are clipped against the font's overall bounding box.
    Procedural { font_bbox: Rect },
}

/// Ink bounds of a single glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphOutline {
    pub bounds: Rect,
    pub kind: OutlineKind,
}

impl GlyphOutline {
    pub fn vector(bounds: Rect) -> Self {
        Self {
            bounds,
            kind: OutlineKind::Vector,
        }
    }

    /// Bounds expressed in glyph space, with the kind-specific adjustment
    /// applied, together with the pre-transform to use before the font matrix.
    pub fn glyph_space(&self) -> (Rect, Ctm) {
        match self.kind {
            OutlineKind::Vector => (self.bounds, Ctm::identity()),
            OutlineKind::Scaled { units_per_em } => {
                let s = 1000.0 / f64::from(units_per_em.max(1));
                (self.bounds, Ctm::scale(s, s))
            }
            OutlineKind::Procedural { font_bbox } => {
                let b = self.bounds;
                let clipped = Rect::from_edges(
                    b.min_x.max(font_bbox.min_x),
                    b.min_y.max(font_bbox.min_y),
                    b.max_x.min(font_bbox.max_x),
                    b.max_y.min(font_bbox.max_y),
                );
                (clipped, Ctm::identity())
            }
        }
    }
}

/// Provides glyph-space outlines for the fonts referenced by a page.
///
/// Implementations shared across parallel page workers must be read-only
/// or synchronize lazy population internally.
pub trait FontOutlineProvider {
    /// Matrix mapping glyph space to text space.
    fn font_matrix(&self, font: FontRef) -> Ctm;

    /// Ink outline of the glyph drawn by `code`.
    ///
    /// # Errors
    ///
    /// Returns [`CropError::FontOutlineUnavailable`] when the glyph has no
    /// usable outline; callers skip such glyphs.
    fn outline_for(&self, font: FontRef, code: u32) -> Result<GlyphOutline, CropError>;
}

/// A provider that knows no fonts; every glyph is unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFonts;

impl FontOutlineProvider for NoFonts {
    fn font_matrix(&self, _font: FontRef) -> Ctm {
        Ctm::scale(0.001, 0.001)
    }

    fn outline_for(&self, font: FontRef, code: u32) -> Result<GlyphOutline, CropError> {
        Err(CropError::FontOutlineUnavailable { font: font.0, code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_outline_is_untouched() {
        let outline = GlyphOutline::vector(Rect::new(0.0, -200.0, 500.0, 700.0));
        let (bounds, pre) = outline.glyph_space();
        assert_eq!(bounds, Rect::new(0.0, -200.0, 500.0, 700.0));
        assert_eq!(pre, Ctm::identity());
    }

    #[test]
    fn scaled_outline_rescales_to_thousand_units() {
        let outline = GlyphOutline {
            bounds: Rect::new(0.0, 0.0, 1024.0, 2048.0),
            kind: OutlineKind::Scaled { units_per_em: 2048 },
        };
        let (bounds, pre) = outline.glyph_space();
        let scaled = bounds.transform(&pre);
        assert!((scaled.max_x - 500.0).abs() < 1e-9);
        assert!((scaled.max_y - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn procedural_outline_is_clipped_to_font_bbox() {
        let outline = GlyphOutline {
            bounds: Rect::new(-10.0, -10.0, 120.0, 80.0),
            kind: OutlineKind::Procedural {
                font_bbox: Rect::new(0.0, 0.0, 100.0, 100.0),
            },
        };
        let (bounds, _) = outline.glyph_space();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 100.0, 80.0));
    }

    #[test]
    fn no_fonts_is_always_unavailable() {
        let err = NoFonts.outline_for(FontRef(3), 65).unwrap_err();
        assert_eq!(err, CropError::FontOutlineUnavailable { font: 3, code: 65 });
    }
}
