//! Drawing primitives and the visitor trait that consumes them.
//!
//! A content-stream source (see `pdfcrop-parse`) walks a page and calls
//! [`ContentVisitor`] methods in drawing order. Coordinates handed to the
//! path callbacks are already transformed into page space.

use crate::geometry::{Ctm, Point};

/// Opaque reference to a font known to a [`FontOutlineProvider`](crate::FontOutlineProvider).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontRef(pub usize);

/// Winding rule of a fill or clip operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// A single glyph being shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Maps text space to page space for this glyph.
    pub text_rendering_matrix: Ctm,
    pub font: FontRef,
    /// Character code as it appears in the content stream.
    pub code: u32,
}

/// Current paint parameters, reduced to what a grayscale renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Stroke gray level, `0.0` = black, `1.0` = white.
    pub stroke_gray: f32,
    /// Fill gray level, `0.0` = black, `1.0` = white.
    pub fill_gray: f32,
    /// Line width in page-space units.
    pub line_width: f64,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            stroke_gray: 0.0,
            fill_gray: 0.0,
            line_width: 1.0,
        }
    }
}

/// One drawing primitive of a page's content.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic Bézier with two control points and an end point.
    CurveTo { cp1: Point, cp2: Point, end: Point },
    ClosePath,
    /// Rectangle appended to the current path, given by its four corners.
    AppendRect([Point; 4]),
    Clip(FillRule),
    /// End the path without painting it.
    EndPath,
    StrokePath,
    FillPath(FillRule),
    FillAndStrokePath(FillRule),
    /// Image placed by the given CTM (unit square → page space).
    DrawImage(Ctm),
    ShowGlyph(Glyph),
    SetPaint(Paint),
}

impl DrawOp {
    /// Deliver this primitive to a visitor.
    pub fn visit(&self, visitor: &mut dyn ContentVisitor) {
        match self {
            DrawOp::MoveTo(p) => visitor.move_to(*p),
            DrawOp::LineTo(p) => visitor.line_to(*p),
            DrawOp::CurveTo { cp1, cp2, end } => visitor.curve_to(*cp1, *cp2, *end),
            DrawOp::ClosePath => visitor.close_path(),
            DrawOp::AppendRect(corners) => visitor.append_rectangle(*corners),
            DrawOp::Clip(rule) => visitor.clip(*rule),
            DrawOp::EndPath => visitor.end_path(),
            DrawOp::StrokePath => visitor.stroke_path(),
            DrawOp::FillPath(rule) => visitor.fill_path(*rule),
            DrawOp::FillAndStrokePath(rule) => visitor.fill_and_stroke_path(*rule),
            DrawOp::DrawImage(ctm) => visitor.draw_image(ctm),
            DrawOp::ShowGlyph(glyph) => visitor.show_glyph(glyph),
            DrawOp::SetPaint(paint) => visitor.set_paint(*paint),
        }
    }
}

/// Replay a recorded sequence of primitives into a visitor.
pub fn replay(ops: &[DrawOp], visitor: &mut dyn ContentVisitor) {
    for op in ops {
        op.visit(visitor);
    }
}

/// Callbacks for page drawing primitives.
///
/// All methods default to no-ops so implementors subscribe only to the
/// primitives they care about.
pub trait ContentVisitor {
    fn move_to(&mut self, _p: Point) {}

    fn line_to(&mut self, _p: Point) {}

    fn curve_to(&mut self, _cp1: Point, _cp2: Point, _end: Point) {}

    fn close_path(&mut self) {}

    fn append_rectangle(&mut self, _corners: [Point; 4]) {}

    /// Intersect the clip with the current path. The path stays current
    /// until the next painting or `end_path` call.
    fn clip(&mut self, _rule: FillRule) {}

    fn end_path(&mut self) {}

    fn stroke_path(&mut self) {}

    fn fill_path(&mut self, _rule: FillRule) {}

    fn fill_and_stroke_path(&mut self, _rule: FillRule) {}

    /// An image is painted into the unit square mapped by `ctm`.
    fn draw_image(&mut self, _ctm: &Ctm) {}

    fn show_glyph(&mut self, _glyph: &Glyph) {}

    /// Paint parameters changed.
    fn set_paint(&mut self, _paint: Paint) {}
}

/// A visitor that records every primitive it receives.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub ops: Vec<DrawOp>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContentVisitor for Recorder {
    fn move_to(&mut self, p: Point) {
        self.ops.push(DrawOp::MoveTo(p));
    }

    fn line_to(&mut self, p: Point) {
        self.ops.push(DrawOp::LineTo(p));
    }

    fn curve_to(&mut self, cp1: Point, cp2: Point, end: Point) {
        self.ops.push(DrawOp::CurveTo { cp1, cp2, end });
    }

    fn close_path(&mut self) {
        self.ops.push(DrawOp::ClosePath);
    }

    fn append_rectangle(&mut self, corners: [Point; 4]) {
        self.ops.push(DrawOp::AppendRect(corners));
    }

    fn clip(&mut self, rule: FillRule) {
        self.ops.push(DrawOp::Clip(rule));
    }

    fn end_path(&mut self) {
        self.ops.push(DrawOp::EndPath);
    }

    fn stroke_path(&mut self) {
        self.ops.push(DrawOp::StrokePath);
    }

    fn fill_path(&mut self, rule: FillRule) {
        self.ops.push(DrawOp::FillPath(rule));
    }

    fn fill_and_stroke_path(&mut self, rule: FillRule) {
        self.ops.push(DrawOp::FillAndStrokePath(rule));
    }

    fn draw_image(&mut self, ctm: &Ctm) {
        self.ops.push(DrawOp::DrawImage(*ctm));
    }

    fn show_glyph(&mut self, glyph: &Glyph) {
        self.ops.push(DrawOp::ShowGlyph(*glyph));
    }

    fn set_paint(&mut self, paint: Paint) {
        self.ops.push(DrawOp::SetPaint(paint));
    }
}
