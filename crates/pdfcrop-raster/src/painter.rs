//! Pixmap painter: a [`ContentVisitor`] that draws page primitives with tiny-skia.

use pdfcrop_core::{
    ContentVisitor, Ctm, FillRule, FontOutlineProvider, GrayImage, Glyph, Paint, Point, Rect,
};
use tiny_skia::{Color, PathBuilder, Pixmap, Stroke, Transform};
use tracing::trace;

/// Draws into a white pixmap covering `media` at `scale` pixels per unit.
///
/// Coordinates arrive in page space; a single base transform flips them into
/// pixel rows with row 0 at the top of the media box.
pub(crate) struct PixmapPainter<'f> {
    pixmap: Pixmap,
    base: Transform,
    fonts: &'f dyn FontOutlineProvider,
    path: PathBuilder,
    paint: Paint,
}

impl<'f> PixmapPainter<'f> {
    pub(crate) fn new(
        mut pixmap: Pixmap,
        media: &Rect,
        scale: f64,
        fonts: &'f dyn FontOutlineProvider,
    ) -> Self {
        pixmap.fill(Color::WHITE);
        let s = scale as f32;
        let base = Transform::from_row(
            s,
            0.0,
            0.0,
            -s,
            (-media.min_x * scale) as f32,
            (media.max_y * scale) as f32,
        );
        Self {
            pixmap,
            base,
            fonts,
            path: PathBuilder::new(),
            paint: Paint::default(),
        }
    }

    /// Red channel of the (opaque, gray) pixmap.
    pub(crate) fn into_gray(self) -> GrayImage {
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let pixels = self
            .pixmap
            .data()
            .chunks_exact(4)
            .map(|px| px[0])
            .collect();
        GrayImage {
            width,
            height,
            pixels,
        }
    }

    fn take_path(&mut self) -> Option<tiny_skia::Path> {
        std::mem::replace(&mut self.path, PathBuilder::new()).finish()
    }

    fn fill(&mut self, path: &tiny_skia::Path, gray: f32, rule: FillRule) {
        let rule = match rule {
            FillRule::NonZero => tiny_skia::FillRule::Winding,
            FillRule::EvenOdd => tiny_skia::FillRule::EvenOdd,
        };
        self.pixmap
            .fill_path(path, &solid(gray), rule, self.base, None);
    }

    fn stroke(&mut self, path: &tiny_skia::Path) {
        let stroke = Stroke {
            width: self.paint.line_width.max(0.0) as f32,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &solid(self.paint.stroke_gray), &stroke, self.base, None);
    }

    /// Fill `rect` mapped through `ctm`.
    fn fill_quad(&mut self, rect: &Rect, ctm: &Ctm, gray: f32) {
        let mut pb = PathBuilder::new();
        for (i, corner) in rect.corners().into_iter().enumerate() {
            let p = ctm.transform_point(corner);
            if i == 0 {
                pb.move_to(p.x as f32, p.y as f32);
            } else {
                pb.line_to(p.x as f32, p.y as f32);
            }
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, gray, FillRule::NonZero);
        }
    }
}

/// Opaque paint of gray level `gray` (`0.0` black, `1.0` white).
fn solid(gray: f32) -> tiny_skia::Paint<'static> {
    let level = (gray.clamp(0.0, 1.0) * 255.0).round() as u8;
    let mut paint = tiny_skia::Paint::default();
    paint.set_color(Color::from_rgba8(level, level, level, 255));
    paint.anti_alias = false;
    paint
}

impl ContentVisitor for PixmapPainter<'_> {
    fn move_to(&mut self, p: Point) {
        self.path.move_to(p.x as f32, p.y as f32);
    }

    fn line_to(&mut self, p: Point) {
        self.path.line_to(p.x as f32, p.y as f32);
    }

    fn curve_to(&mut self, cp1: Point, cp2: Point, end: Point) {
        self.path.cubic_to(
            cp1.x as f32,
            cp1.y as f32,
            cp2.x as f32,
            cp2.y as f32,
            end.x as f32,
            end.y as f32,
        );
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn append_rectangle(&mut self, corners: [Point; 4]) {
        let [first, rest @ ..] = corners;
        self.path.move_to(first.x as f32, first.y as f32);
        for p in rest {
            self.path.line_to(p.x as f32, p.y as f32);
        }
        self.path.close();
    }

    fn end_path(&mut self) {
        self.path.clear();
    }

    fn stroke_path(&mut self) {
        if let Some(path) = self.take_path() {
            self.stroke(&path);
        }
    }

    fn fill_path(&mut self, rule: FillRule) {
        if let Some(path) = self.take_path() {
            self.fill(&path, self.paint.fill_gray, rule);
        }
    }

    fn fill_and_stroke_path(&mut self, rule: FillRule) {
        if let Some(path) = self.take_path() {
            self.fill(&path, self.paint.fill_gray, rule);
            self.stroke(&path);
        }
    }

    fn draw_image(&mut self, ctm: &Ctm) {
        self.fill_quad(&Rect::new(0.0, 0.0, 1.0, 1.0), ctm, 0.0);
    }

    fn show_glyph(&mut self, glyph: &Glyph) {
        let outline = match self.fonts.outline_for(glyph.font, glyph.code) {
            Ok(outline) => outline,
            Err(e) => {
                trace!("raster: {e}");
                return;
            }
        };
        let (bounds, pre) = outline.glyph_space();
        let glyph_to_page = pre
            .concat(&self.fonts.font_matrix(glyph.font))
            .concat(&glyph.text_rendering_matrix);
        self.fill_quad(&bounds, &glyph_to_page, self.paint.fill_gray);
    }

    fn set_paint(&mut self, paint: Paint) {
        self.paint = paint;
    }
}
