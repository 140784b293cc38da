//! Text state for the content stream interpreter.
//!
//! Tracks the text object (`BT`/`ET`), font selection (`Tf`), the text and
//! line matrices (`Tm`, `Td`, `TD`, `T*`) and the spacing parameters, and
//! computes the text rendering matrix of each glyph.

use pdfcrop_core::{Ctm, FontRef};

/// Text parameters that belong to the graphics state and are saved by `q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextParams {
    /// `Tc`, in unscaled text space units.
    pub char_spacing: f64,
    /// `Tw`, applied to single-byte code 32 only.
    pub word_spacing: f64,
    /// `Tz`, percentage with 100 = normal.
    pub h_scaling: f64,
    /// `TL`
    pub leading: f64,
    pub font: Option<FontRef>,
    pub font_size: f64,
    /// `Ts`
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 100.0,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            rise: 0.0,
        }
    }
}

impl TextParams {
    /// Horizontal scaling as a fraction (1.0 = 100%).
    pub fn th(&self) -> f64 {
        self.h_scaling / 100.0
    }
}

/// Text matrices of the current text object plus the text parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextState {
    pub params: TextParams,
    in_text_object: bool,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    pub fn line_matrix(&self) -> &Ctm {
        &self.line_matrix
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
    }

    /// `ET`
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tm`: replace (not concatenate) both matrices.
    pub fn set_text_matrix(&mut self, m: Ctm) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: offset from the start of the current line.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::translate(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: `-ty TL` followed by `tx ty Td`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Move the text matrix right by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::translate(tx, 0.0).concat(&self.text_matrix);
    }

    /// Text rendering matrix for a glyph at the current position:
    /// `[fs·Th 0 0 fs 0 rise] × Tm × CTM`.
    pub fn rendering_matrix(&self, ctm: &Ctm) -> Ctm {
        let p = &self.params;
        Ctm::new(p.font_size * p.th(), 0.0, 0.0, p.font_size, 0.0, p.rise)
            .concat(&self.text_matrix)
            .concat(ctm)
    }

    /// Horizontal displacement after showing a glyph whose width is `w0`
    /// (text space units per unit font size).
    pub fn glyph_advance(&self, w0: f64, is_space: bool) -> f64 {
        let p = &self.params;
        let word = if is_space { p.word_spacing } else { 0.0 };
        (w0 * p.font_size + p.char_spacing + word) * p.th()
    }

    /// Displacement of a `TJ` number adjustment (thousandths of an em).
    pub fn tj_adjustment(&self, amount: f64) -> f64 {
        -amount / 1000.0 * self.params.font_size * self.params.th()
    }
}
