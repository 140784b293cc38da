//! Content stream interpreter.
//!
//! Decodes a page's content with lopdf and drives a [`ContentVisitor`] with
//! page-space drawing primitives. Operators are grouped as in the PDF
//! reference:
//!
//! - graphics state: `q`, `Q`, `cm`, `w`, `gs`
//! - color: `g G rg RG k K cs CS sc scn SC SCN`, reduced to gray
//! - path construction and painting: `m l c v y h re`, `S s f F f* B B* b b* n`
//! - clipping: `W W*`
//! - text: `BT ET Tf Tc Tw Tz TL Ts Td TD T* Tm Tj TJ ' "`
//! - XObjects: `Do`, plus inline images
//!
//! Unknown operators are ignored and operators with malformed operands are
//! skipped.

use std::collections::HashSet;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Object, ObjectId};
use pdfcrop_core::{ContentVisitor, Ctm, FillRule, Glyph, Paint, Point};
use tracing::{trace, warn};

use crate::error::BackendError;
use crate::fonts::FontCache;
use crate::interpreter_state::InterpreterState;
use crate::lopdf_backend::{LopdfDocument, decode_stream, number_array, object_to_f64, resolve};
use crate::text_state::TextState;

/// Interpreter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterOptions {
    /// Deepest form XObject nesting that is still interpreted.
    pub max_form_depth: usize,
}

impl Default for InterpreterOptions {
    fn default() -> Self {
        Self { max_form_depth: 12 }
    }
}

/// Walks page content of one document.
pub struct ContentInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a FontCache,
    options: InterpreterOptions,
}

impl<'a> ContentInterpreter<'a> {
    pub fn new(doc: &'a LopdfDocument, fonts: &'a FontCache) -> Self {
        Self {
            doc,
            fonts,
            options: InterpreterOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InterpreterOptions) -> Self {
        self.options = options;
        self
    }

    /// Interpret the page at 0-based `index`.
    ///
    /// # Errors
    ///
    /// [`BackendError::Parse`] if the page or its content cannot be read,
    /// [`BackendError::Interpreter`] if the content stream cannot be decoded.
    pub fn run_page(
        &self,
        index: usize,
        visitor: &mut dyn ContentVisitor,
    ) -> Result<(), BackendError> {
        let page_id = self.doc.page_id(index)?;
        let content = self.doc.page_content(page_id)?;
        let resources = self.doc.page_resources(page_id)?;
        self.run_content(&content, resources, visitor)
    }

    /// Interpret a raw content stream against `resources`.
    pub fn run_content(
        &self,
        content: &[u8],
        resources: &'a Dictionary,
        visitor: &mut dyn ContentVisitor,
    ) -> Result<(), BackendError> {
        let operations = decode_operations(content)?;
        self.run_operations(&operations, resources, visitor);
        Ok(())
    }

    /// Interpret already decoded operations against `resources`.
    pub fn run_operations(
        &self,
        operations: &[Operation],
        resources: &'a Dictionary,
        visitor: &mut dyn ContentVisitor,
    ) {
        let mut run = Run {
            interpreter: self,
            visitor,
            active_forms: HashSet::new(),
            last_paint: None,
        };
        let mut scope = Scope::new(resources, InterpreterState::new(), 0);
        run.execute(operations, &mut scope);
    }
}

fn decode_operations(content: &[u8]) -> Result<Vec<Operation>, BackendError> {
    Content::decode(content)
        .map(|c| c.operations)
        .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))
}

/// Per content stream state: the page itself or one form XObject.
struct Scope<'a> {
    resources: &'a Dictionary,
    state: InterpreterState,
    text: TextState,
    current_point: Option<Point>,
    subpath_start: Option<Point>,
    depth: usize,
}

impl<'a> Scope<'a> {
    fn new(resources: &'a Dictionary, state: InterpreterState, depth: usize) -> Self {
        let mut text = TextState::new();
        text.params = state.current().text;
        Self {
            resources,
            state,
            text,
            current_point: None,
            subpath_start: None,
            depth,
        }
    }

    fn ctm(&self) -> Ctm {
        *self.state.ctm()
    }

    /// User space point to page space.
    fn page_point(&self, x: f64, y: f64) -> Point {
        self.ctm().transform_point(Point::new(x, y))
    }

    fn reset_path(&mut self) {
        self.current_point = None;
        self.subpath_start = None;
    }
}

struct Run<'i, 'a, 'v> {
    interpreter: &'i ContentInterpreter<'a>,
    visitor: &'v mut dyn ContentVisitor,
    /// Form XObjects currently being interpreted, for cycle detection.
    active_forms: HashSet<ObjectId>,
    last_paint: Option<Paint>,
}

impl<'a> Run<'_, 'a, '_> {
    fn doc(&self) -> &'a lopdf::Document {
        self.interpreter.doc.inner()
    }

    fn execute(&mut self, operations: &[Operation], scope: &mut Scope<'a>) {
        for op in operations {
            if self.apply(op, scope).is_none() {
                trace!(operator = op.operator.as_str(), operands = ?op.operands, "skipped operator");
            }
        }
    }

    /// Apply one operator. `None` means its operands were malformed.
    fn apply(&mut self, op: &Operation, scope: &mut Scope<'a>) -> Option<()> {
        match op.operator.as_str() {
            // graphics state
            "q" => {
                scope.state.current_mut().text = scope.text.params;
                scope.state.save_state();
            }
            "Q" => {
                if scope.state.restore_state() {
                    scope.text.params = scope.state.current().text;
                } else {
                    warn!("unbalanced Q operator ignored");
                }
            }
            "cm" => {
                let m = numbers::<6>(op)?;
                scope.state.concat_matrix(&Ctm::from_array(m));
            }
            "w" => {
                let [width] = numbers::<1>(op)?;
                scope.state.set_line_width(width);
            }
            "gs" => self.ext_gstate(op, scope)?,

            // color
            "g" | "rg" | "k" | "sc" | "scn" => {
                scope.state.set_non_stroking_color(&color_operands(op)?);
            }
            "G" | "RG" | "K" | "SC" | "SCN" => {
                scope.state.set_stroking_color(&color_operands(op)?);
            }
            "cs" => scope.state.set_non_stroking_color(&[0.0]),
            "CS" => scope.state.set_stroking_color(&[0.0]),

            // path construction
            "m" => {
                let [x, y] = numbers::<2>(op)?;
                let p = scope.page_point(x, y);
                scope.current_point = Some(p);
                scope.subpath_start = Some(p);
                self.visitor.move_to(p);
            }
            "l" => {
                let [x, y] = numbers::<2>(op)?;
                let p = scope.page_point(x, y);
                scope.current_point = Some(p);
                self.visitor.line_to(p);
            }
            "c" => {
                let [x1, y1, x2, y2, x3, y3] = numbers::<6>(op)?;
                let end = scope.page_point(x3, y3);
                self.visitor
                    .curve_to(scope.page_point(x1, y1), scope.page_point(x2, y2), end);
                scope.current_point = Some(end);
            }
            "v" => {
                let [x2, y2, x3, y3] = numbers::<4>(op)?;
                let cp1 = scope.current_point?;
                let end = scope.page_point(x3, y3);
                self.visitor.curve_to(cp1, scope.page_point(x2, y2), end);
                scope.current_point = Some(end);
            }
            "y" => {
                let [x1, y1, x3, y3] = numbers::<4>(op)?;
                let end = scope.page_point(x3, y3);
                self.visitor.curve_to(scope.page_point(x1, y1), end, end);
                scope.current_point = Some(end);
            }
            "h" => {
                self.visitor.close_path();
                scope.current_point = scope.subpath_start;
            }
            "re" => {
                let [x, y, w, h] = numbers::<4>(op)?;
                let corners = [
                    scope.page_point(x, y),
                    scope.page_point(x + w, y),
                    scope.page_point(x + w, y + h),
                    scope.page_point(x, y + h),
                ];
                self.visitor.append_rectangle(corners);
                scope.current_point = Some(corners[0]);
                scope.subpath_start = Some(corners[0]);
            }

            // path painting
            "S" => self.paint(scope, |v| v.stroke_path()),
            "s" => self.paint(scope, |v| {
                v.close_path();
                v.stroke_path();
            }),
            "f" | "F" => self.paint(scope, |v| v.fill_path(FillRule::NonZero)),
            "f*" => self.paint(scope, |v| v.fill_path(FillRule::EvenOdd)),
            "B" => self.paint(scope, |v| v.fill_and_stroke_path(FillRule::NonZero)),
            "B*" => self.paint(scope, |v| v.fill_and_stroke_path(FillRule::EvenOdd)),
            "b" => self.paint(scope, |v| {
                v.close_path();
                v.fill_and_stroke_path(FillRule::NonZero);
            }),
            "b*" => self.paint(scope, |v| {
                v.close_path();
                v.fill_and_stroke_path(FillRule::EvenOdd);
            }),
            "n" => {
                self.visitor.end_path();
                scope.reset_path();
            }
            "W" => self.visitor.clip(FillRule::NonZero),
            "W*" => self.visitor.clip(FillRule::EvenOdd),

            // text objects and state
            "BT" => scope.text.begin_text(),
            "ET" => scope.text.end_text(),
            "Tf" => self.set_font(op, scope)?,
            "Tc" => scope.text.params.char_spacing = numbers::<1>(op)?[0],
            "Tw" => scope.text.params.word_spacing = numbers::<1>(op)?[0],
            "Tz" => scope.text.params.h_scaling = numbers::<1>(op)?[0],
            "TL" => scope.text.params.leading = numbers::<1>(op)?[0],
            "Ts" => scope.text.params.rise = numbers::<1>(op)?[0],
            "Td" => {
                let [tx, ty] = numbers::<2>(op)?;
                scope.text.move_text_position(tx, ty);
            }
            "TD" => {
                let [tx, ty] = numbers::<2>(op)?;
                scope.text.move_text_position_and_set_leading(tx, ty);
            }
            "T*" => scope.text.move_to_next_line(),
            "Tm" => scope.text.set_text_matrix(Ctm::from_array(numbers::<6>(op)?)),

            // text showing
            "Tj" => {
                let bytes = string_operand(op.operands.last()?)?;
                self.show_text(scope, bytes);
            }
            "'" => {
                let bytes = string_operand(op.operands.last()?)?;
                scope.text.move_to_next_line();
                self.show_text(scope, bytes);
            }
            "\"" => {
                let [aw, ac] = match op.operands.as_slice() {
                    [aw, ac, _] => [object_to_f64(aw).ok()?, object_to_f64(ac).ok()?],
                    _ => return None,
                };
                let bytes = string_operand(op.operands.last()?)?;
                scope.text.params.word_spacing = aw;
                scope.text.params.char_spacing = ac;
                scope.text.move_to_next_line();
                self.show_text(scope, bytes);
            }
            "TJ" => {
                let items = op.operands.last()?.as_array().ok()?;
                for item in items {
                    match item {
                        Object::String(bytes, _) => self.show_text(scope, bytes),
                        other => {
                            if let Ok(amount) = object_to_f64(other) {
                                let tx = scope.text.tj_adjustment(amount);
                                scope.text.advance(tx);
                            }
                        }
                    }
                }
            }

            // XObjects and inline images
            "Do" => self.do_xobject(op, scope)?,
            // one image per `BI`, whether or not `ID`/`EI` arrive as separate operators
            "BI" => {
                self.sync_paint(scope);
                self.visitor.draw_image(&scope.ctm());
            }

            _ => {}
        }
        Some(())
    }

    fn sync_paint(&mut self, scope: &Scope<'a>) {
        let paint = scope.state.paint();
        if self.last_paint != Some(paint) {
            self.visitor.set_paint(paint);
            self.last_paint = Some(paint);
        }
    }

    fn paint(&mut self, scope: &mut Scope<'a>, f: impl FnOnce(&mut dyn ContentVisitor)) {
        self.sync_paint(scope);
        f(&mut *self.visitor);
        scope.reset_path();
    }

    fn ext_gstate(&mut self, op: &Operation, scope: &mut Scope<'a>) -> Option<()> {
        let name = op.operands.first()?.as_name().ok()?;
        let params = named_resource(self.doc(), scope.resources, b"ExtGState", name)
            .and_then(|o| resolve(self.doc(), o).as_dict().ok());
        let Some(params) = params else {
            warn!(
                name = %String::from_utf8_lossy(name),
                "missing ExtGState resource"
            );
            return Some(());
        };
        if let Some(width) = params
            .get(b"LW")
            .ok()
            .and_then(|o| object_to_f64(resolve(self.doc(), o)).ok())
        {
            scope.state.set_line_width(width);
        }
        Some(())
    }

    fn set_font(&mut self, op: &Operation, scope: &mut Scope<'a>) -> Option<()> {
        let [name, size] = op.operands.as_slice() else {
            return None;
        };
        let name = name.as_name().ok()?;
        let size = object_to_f64(size).ok()?;
        scope.text.params.font_size = size;
        scope.text.params.font = match named_resource(self.doc(), scope.resources, b"Font", name) {
            Some(font_obj) => Some(self.interpreter.fonts.load(self.doc(), font_obj)),
            None => {
                warn!(
                    name = %String::from_utf8_lossy(name),
                    "missing font resource"
                );
                None
            }
        };
        Some(())
    }

    fn show_text(&mut self, scope: &mut Scope<'a>, bytes: &[u8]) {
        let Some(font_ref) = scope.text.params.font else {
            trace!("text shown without a font");
            return;
        };
        let Some(font) = self.interpreter.fonts.get(font_ref) else {
            return;
        };
        self.sync_paint(scope);
        let ctm = scope.ctm();
        for code in font.codes(bytes) {
            let glyph = Glyph {
                text_rendering_matrix: scope.text.rendering_matrix(&ctm),
                font: font_ref,
                code,
            };
            self.visitor.show_glyph(&glyph);
            let is_space = !font.two_byte() && code == 32;
            let tx = scope.text.glyph_advance(font.advance(code), is_space);
            scope.text.advance(tx);
        }
    }

    fn do_xobject(&mut self, op: &Operation, scope: &mut Scope<'a>) -> Option<()> {
        let name = op.operands.first()?.as_name().ok()?;
        let Some(obj) = named_resource(self.doc(), scope.resources, b"XObject", name) else {
            warn!(
                name = %String::from_utf8_lossy(name),
                "missing XObject resource"
            );
            return Some(());
        };
        let id = match obj {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        let Ok(stream) = resolve(self.doc(), obj).as_stream() else {
            warn!(
                name = %String::from_utf8_lossy(name),
                "XObject is not a stream"
            );
            return Some(());
        };

        match stream.dict.get(b"Subtype").and_then(Object::as_name) {
            Ok(b"Image") => {
                self.sync_paint(scope);
                self.visitor.draw_image(&scope.ctm());
            }
            Ok(b"Form") => self.run_form(id, stream, scope),
            _ => trace!("ignored XObject subtype"),
        }
        Some(())
    }

    fn run_form(&mut self, id: Option<ObjectId>, stream: &'a lopdf::Stream, scope: &mut Scope<'a>) {
        let depth = scope.depth + 1;
        if depth > self.interpreter.options.max_form_depth {
            warn!(depth, "form XObject nesting too deep, skipped");
            return;
        }
        if let Some(id) = id {
            if !self.active_forms.insert(id) {
                warn!(?id, "form XObject draws itself, skipped");
                return;
            }
        }

        let matrix = stream
            .dict
            .get(b"Matrix")
            .ok()
            .and_then(|m| number_array(self.doc(), m))
            .and_then(|m| <[f64; 6]>::try_from(m).ok())
            .map_or(Ctm::identity(), Ctm::from_array);
        let resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .and_then(|r| resolve(self.doc(), r).as_dict().ok())
            .unwrap_or(scope.resources);

        let result = decode_stream(stream).and_then(|bytes| decode_operations(&bytes));
        match result {
            Ok(operations) => {
                let mut inherited = *scope.state.current();
                inherited.ctm = matrix.concat(&scope.ctm());
                inherited.text = scope.text.params;
                let mut form_scope =
                    Scope::new(resources, InterpreterState::from_graphics_state(inherited), depth);
                self.execute(&operations, &mut form_scope);
            }
            Err(e) => warn!("unreadable form XObject skipped: {e}"),
        }

        if let Some(id) = id {
            self.active_forms.remove(&id);
        }
    }
}

/// Look up `/<category>/<name>` in a resources dictionary.
fn named_resource<'a>(
    doc: &'a lopdf::Document,
    resources: &'a Dictionary,
    category: &[u8],
    name: &[u8],
) -> Option<&'a Object> {
    resolve(doc, resources.get(category).ok()?)
        .as_dict()
        .ok()?
        .get(name)
        .ok()
}

/// The last `N` operands as numbers.
fn numbers<const N: usize>(op: &Operation) -> Option<[f64; N]> {
    let start = op.operands.len().checked_sub(N)?;
    let mut out = [0.0; N];
    for (slot, obj) in out.iter_mut().zip(&op.operands[start..]) {
        *slot = object_to_f64(obj).ok()?;
    }
    Some(out)
}

/// Color components of a color operator. A pattern name paints black.
fn color_operands(op: &Operation) -> Option<Vec<f32>> {
    if matches!(op.operands.last(), Some(Object::Name(_))) {
        return Some(vec![0.0]);
    }
    op.operands
        .iter()
        .map(|o| object_to_f64(o).ok().map(|v| v as f32))
        .collect()
}

fn string_operand(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lopdf_backend::test_pdf;
    use lopdf::dictionary;
    use pdfcrop_core::{DrawOp, Recorder};

    fn record(content: &[u8]) -> Vec<DrawOp> {
        let doc = LopdfDocument::open(&test_pdf::with_content(content)).unwrap();
        let fonts = FontCache::new();
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts)
            .run_page(0, &mut recorder)
            .unwrap();
        recorder.ops
    }

    fn without_paint(ops: Vec<DrawOp>) -> Vec<DrawOp> {
        ops.into_iter()
            .filter(|op| !matches!(op, DrawOp::SetPaint(_)))
            .collect()
    }

    #[test]
    fn rectangle_fill() {
        let ops = without_paint(record(b"10 20 30 40 re f"));
        assert_eq!(
            ops,
            vec![
                DrawOp::AppendRect([
                    Point::new(10.0, 20.0),
                    Point::new(40.0, 20.0),
                    Point::new(40.0, 60.0),
                    Point::new(10.0, 60.0),
                ]),
                DrawOp::FillPath(FillRule::NonZero),
            ]
        );
    }

    #[test]
    fn path_points_are_transformed_by_ctm() {
        let ops = without_paint(record(b"q 2 0 0 2 100 50 cm 0 0 m 10 5 l S Q 1 1 m 2 2 l n"));
        assert_eq!(
            ops,
            vec![
                DrawOp::MoveTo(Point::new(100.0, 50.0)),
                DrawOp::LineTo(Point::new(120.0, 60.0)),
                DrawOp::StrokePath,
                DrawOp::MoveTo(Point::new(1.0, 1.0)),
                DrawOp::LineTo(Point::new(2.0, 2.0)),
                DrawOp::EndPath,
            ]
        );
    }

    #[test]
    fn curve_shorthands_use_current_point() {
        let ops = without_paint(record(b"0 0 m 1 1 2 2 v 3 3 4 4 y h f*"));
        assert_eq!(
            ops[1],
            DrawOp::CurveTo {
                cp1: Point::new(0.0, 0.0),
                cp2: Point::new(1.0, 1.0),
                end: Point::new(2.0, 2.0),
            }
        );
        assert_eq!(
            ops[2],
            DrawOp::CurveTo {
                cp1: Point::new(3.0, 3.0),
                cp2: Point::new(4.0, 4.0),
                end: Point::new(4.0, 4.0),
            }
        );
        assert_eq!(ops[3], DrawOp::ClosePath);
        assert_eq!(ops[4], DrawOp::FillPath(FillRule::EvenOdd));
    }

    #[test]
    fn close_and_paint_variants() {
        let ops = without_paint(record(b"0 0 m 1 0 l s 0 0 m 1 0 l b* 0 0 m W n"));
        assert_eq!(
            ops,
            vec![
                DrawOp::MoveTo(Point::new(0.0, 0.0)),
                DrawOp::LineTo(Point::new(1.0, 0.0)),
                DrawOp::ClosePath,
                DrawOp::StrokePath,
                DrawOp::MoveTo(Point::new(0.0, 0.0)),
                DrawOp::LineTo(Point::new(1.0, 0.0)),
                DrawOp::ClosePath,
                DrawOp::FillAndStrokePath(FillRule::EvenOdd),
                DrawOp::MoveTo(Point::new(0.0, 0.0)),
                DrawOp::Clip(FillRule::NonZero),
                DrawOp::EndPath,
            ]
        );
    }

    #[test]
    fn paint_reflects_color_and_width() {
        let ops = record(b"0.5 g 1 0 0 RG 4 w 0 0 10 10 re B");
        let paint = ops.iter().find_map(|op| match op {
            DrawOp::SetPaint(p) => Some(*p),
            _ => None,
        });
        let paint = paint.unwrap();
        assert_eq!(paint.fill_gray, 0.5);
        assert!((paint.stroke_gray - 0.299).abs() < 1e-6);
        assert_eq!(paint.line_width, 4.0);
    }

    #[test]
    fn paint_is_sent_only_when_it_changes() {
        let ops = record(b"0 0 1 1 re f 2 2 1 1 re f 1 g 4 4 1 1 re f");
        let paints = ops
            .iter()
            .filter(|op| matches!(op, DrawOp::SetPaint(_)))
            .count();
        assert_eq!(paints, 2);
    }

    #[test]
    fn inline_image_is_drawn_once() {
        let doc = LopdfDocument::open(&test_pdf::with_content(b"")).unwrap();
        let fonts = FontCache::new();
        let resources = Dictionary::new();
        let operations = vec![
            Operation::new("cm", vec![10.into(), 0.into(), 0.into(), 10.into(), 50.into(), 60.into()]),
            Operation::new("BI", vec![]),
            Operation::new("ID", vec![]),
            Operation::new("EI", vec![]),
        ];
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts).run_operations(&operations, &resources, &mut recorder);

        let images: Vec<_> = without_paint(recorder.ops);
        assert_eq!(
            images,
            vec![DrawOp::DrawImage(Ctm::new(10.0, 0.0, 0.0, 10.0, 50.0, 60.0))]
        );
    }

    #[test]
    fn pattern_color_paints_black() {
        let ops = record(b"1 g /P1 scn 0 0 10 10 re f");
        let last_paint = ops.iter().rev().find_map(|op| match op {
            DrawOp::SetPaint(p) => Some(*p),
            _ => None,
        });
        assert_eq!(last_paint.unwrap().fill_gray, 0.0);
    }

    #[test]
    fn malformed_and_unknown_operators_are_skipped() {
        let ops = without_paint(record(b"/Foo l 1 2 zz 0 0 5 5 re f"));
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[1], DrawOp::FillPath(_)));
    }

    #[test]
    fn unbalanced_restore_is_tolerated() {
        let ops = without_paint(record(b"Q Q 0 0 1 1 re S"));
        assert_eq!(ops.len(), 2);
    }

    #[test]
    fn text_with_standard_font() {
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                },
            },
        };
        let bytes = test_pdf::with_pages(&[b"BT /F1 10 Tf 72 700 Td (AA) Tj ET"], resources);
        let doc = LopdfDocument::open(&bytes).unwrap();
        let fonts = FontCache::new();
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts)
            .run_page(0, &mut recorder)
            .unwrap();

        let glyphs: Vec<Glyph> = recorder
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ShowGlyph(g) => Some(*g),
                _ => None,
            })
            .collect();
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].code, 65);
        let trm = glyphs[0].text_rendering_matrix;
        assert_eq!((trm.a, trm.d, trm.e, trm.f), (10.0, 10.0, 72.0, 700.0));
        // Helvetica 'A' advances 0.667 em
        let second = glyphs[1].text_rendering_matrix;
        assert!((second.e - 78.67).abs() < 1e-9);
        assert_eq!(fonts.len(), 1);
    }

    #[test]
    fn tj_array_adjustments_and_quote_operators() {
        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => dictionary! { "Subtype" => "Type1", "BaseFont" => "Courier" },
            },
        };
        let content = b"BT /F1 10 Tf 12 TL 0 100 Td [(A) -1000 (B)] TJ (C) ' 2 1 (D) \" ET";
        let bytes = test_pdf::with_pages(&[content], resources);
        let doc = LopdfDocument::open(&bytes).unwrap();
        let fonts = FontCache::new();
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts)
            .run_page(0, &mut recorder)
            .unwrap();

        let origins: Vec<(f64, f64)> = recorder
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::ShowGlyph(g) => Some((g.text_rendering_matrix.e, g.text_rendering_matrix.f)),
                _ => None,
            })
            .collect();
        // Courier advances 6 per glyph at size 10; -1000 moves right by 10
        assert_eq!(origins.len(), 4);
        assert!((origins[0].0 - 0.0).abs() < 1e-9);
        assert!((origins[1].0 - 16.0).abs() < 1e-9);
        assert_eq!(origins[2], (0.0, 88.0));
        assert_eq!(origins[3], (0.0, 76.0));
    }

    #[test]
    fn text_without_font_is_skipped() {
        let ops = record(b"BT (abc) Tj ET");
        assert!(!ops.iter().any(|op| matches!(op, DrawOp::ShowGlyph(_))));
    }

    /// Page drawing an image directly and through a translated form.
    fn image_and_form_pdf() -> Vec<u8> {
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let image = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0],
        ));
        let form = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 100.into(), 100.into()],
                "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 50.into(), 0.into()],
                "Resources" => dictionary! { "XObject" => dictionary! { "Im1" => image } },
            },
            b"q 10 0 0 10 0 0 cm /Im1 Do Q".to_vec(),
        ));
        let resources = dictionary! {
            "XObject" => dictionary! { "Im1" => image, "Fm1" => form },
        };
        let pages_id = doc.new_object_id();
        let content = doc.add_object(Stream::new(
            dictionary! {},
            b"q 20 0 0 30 5 5 cm /Im1 Do Q /Fm1 Do /Missing Do".to_vec(),
        ));
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content,
            "Resources" => resources,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page)],
                "Count" => 1i64,
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    fn recorded_images(options: InterpreterOptions) -> Vec<Ctm> {
        let doc = LopdfDocument::open(&image_and_form_pdf()).unwrap();
        let fonts = FontCache::new();
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts)
            .with_options(options)
            .run_page(0, &mut recorder)
            .unwrap();
        recorder
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::DrawImage(ctm) => Some(*ctm),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn image_xobject_and_forms() {
        assert_eq!(
            recorded_images(InterpreterOptions::default()),
            vec![
                Ctm::new(20.0, 0.0, 0.0, 30.0, 5.0, 5.0),
                Ctm::new(10.0, 0.0, 0.0, 10.0, 50.0, 0.0),
            ]
        );
    }

    #[test]
    fn forms_beyond_depth_limit_are_skipped() {
        assert_eq!(InterpreterOptions::default().max_form_depth, 12);
        assert_eq!(
            recorded_images(InterpreterOptions { max_form_depth: 0 }),
            vec![Ctm::new(20.0, 0.0, 0.0, 30.0, 5.0, 5.0)]
        );
    }

    #[test]
    fn self_referencing_form_terminates() {
        use lopdf::{Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let form_id = doc.new_object_id();
        let form = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Form",
                "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                "Resources" => dictionary! { "XObject" => dictionary! { "Fm1" => form_id } },
            },
            b"0 0 1 1 re f /Fm1 Do".to_vec(),
        );
        doc.objects.insert(form_id, Object::Stream(form));
        let pages_id = doc.new_object_id();
        let content = doc.add_object(Stream::new(dictionary! {}, b"/Fm1 Do".to_vec()));
        let page = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content,
            "Resources" => dictionary! { "XObject" => dictionary! { "Fm1" => form_id } },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::from(page)],
                "Count" => 1i64,
            }),
        );
        let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let doc = LopdfDocument::open(&bytes).unwrap();
        let fonts = FontCache::new();
        let mut recorder = Recorder::new();
        ContentInterpreter::new(&doc, &fonts)
            .run_page(0, &mut recorder)
            .unwrap();
        let fills = recorder
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillPath(_)))
            .count();
        assert_eq!(fills, 1);
    }
}
