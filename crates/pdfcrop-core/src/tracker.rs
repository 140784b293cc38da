//! Conservative bounding-box accumulation over a page's drawing primitives.
//!
//! [`BoundingBoxTracker`] is a small state machine: path construction grows
//! an in-progress extent, painting commits it to the page extent, and
//! `end_path` discards it. Bézier control points are included as-is, so the
//! result over-approximates curves. Clip paths never shrink the result.

use crate::content::{ContentVisitor, FillRule, Glyph};
use crate::font::FontOutlineProvider;
use crate::geometry::{Ctm, Point, Rect, grow};

/// Which primitives contribute to the tracked extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TrackerMode {
    /// Paths, images and glyphs.
    #[default]
    All,
    /// Glyphs only; path and image primitives are ignored.
    TextOnly,
}

/// Accumulates the smallest rectangle enclosing every visible mark.
pub struct BoundingBoxTracker<'a> {
    fonts: &'a dyn FontOutlineProvider,
    mode: TrackerMode,
    /// Extent of the path under construction, `None` when no path is active.
    path: Option<Rect>,
    /// Committed page extent.
    bounds: Option<Rect>,
    skipped_glyphs: usize,
}

impl<'a> BoundingBoxTracker<'a> {
    pub fn new(fonts: &'a dyn FontOutlineProvider, mode: TrackerMode) -> Self {
        Self {
            fonts,
            mode,
            path: None,
            bounds: None,
            skipped_glyphs: 0,
        }
    }

    pub fn mode(&self) -> TrackerMode {
        self.mode
    }

    /// Extent committed so far.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Number of glyphs skipped because their font had no usable outline.
    pub fn skipped_glyphs(&self) -> usize {
        self.skipped_glyphs
    }

    /// Consume the tracker, returning `None` if no mark was recorded.
    pub fn finish(self) -> Option<Rect> {
        self.bounds
    }

    fn tracks_paths(&self) -> bool {
        self.mode == TrackerMode::All
    }

    fn add_to_path(&mut self, p: Point) {
        match &mut self.path {
            Some(path) => path.include_point(p),
            None => self.path = Some(Rect::from_point(p)),
        }
    }

    fn commit_path(&mut self) {
        if let Some(path) = self.path.take() {
            grow(&mut self.bounds, &path);
        }
    }

    /// Page-space bounds of a glyph, or `None` if its outline is unavailable.
    fn glyph_bounds(&self, glyph: &Glyph) -> Option<Rect> {
        let outline = self.fonts.outline_for(glyph.font, glyph.code).ok()?;
        let (bounds, pre) = outline.glyph_space();
        let glyph_to_page: Ctm = pre
            .concat(&self.fonts.font_matrix(glyph.font))
            .concat(&glyph.text_rendering_matrix);
        Some(bounds.transform(&glyph_to_page))
    }
}

impl ContentVisitor for BoundingBoxTracker<'_> {
    fn move_to(&mut self, p: Point) {
        if self.tracks_paths() {
            self.add_to_path(p);
        }
    }

    fn line_to(&mut self, p: Point) {
        if self.tracks_paths() {
            self.add_to_path(p);
        }
    }

    fn curve_to(&mut self, cp1: Point, cp2: Point, end: Point) {
        if self.tracks_paths() {
            self.add_to_path(cp1);
            self.add_to_path(cp2);
            self.add_to_path(end);
        }
    }

    fn append_rectangle(&mut self, corners: [Point; 4]) {
        if self.tracks_paths() {
            for p in corners {
                self.add_to_path(p);
            }
        }
    }

    fn end_path(&mut self) {
        self.path = None;
    }

    fn stroke_path(&mut self) {
        self.commit_path();
    }

    fn fill_path(&mut self, _rule: FillRule) {
        self.commit_path();
    }

    fn fill_and_stroke_path(&mut self, _rule: FillRule) {
        self.commit_path();
    }

    fn draw_image(&mut self, ctm: &Ctm) {
        if self.tracks_paths() {
            let unit = Rect::new(0.0, 0.0, 1.0, 1.0);
            grow(&mut self.bounds, &unit.transform(ctm));
        }
    }

    fn show_glyph(&mut self, glyph: &Glyph) {
        match self.glyph_bounds(glyph) {
            Some(rect) => grow(&mut self.bounds, &rect),
            None => self.skipped_glyphs += 1,
        }
    }
}
