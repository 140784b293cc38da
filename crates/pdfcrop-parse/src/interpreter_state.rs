//! Graphics state stack for the content stream interpreter.
//!
//! Implements the `q`/`Q` stack, CTM concatenation via `cm`, line width and
//! the color operators reduced to a gray level for the raster renderer.

use pdfcrop_core::{Ctm, Paint};

use crate::text_state::TextParams;

/// Parameters saved and restored by `q`/`Q`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    pub ctm: Ctm,
    /// `w`, in user space units.
    pub line_width: f64,
    pub stroke_gray: f32,
    pub fill_gray: f32,
    pub text: TextParams,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Ctm::identity(),
            line_width: 1.0,
            stroke_gray: 0.0,
            fill_gray: 0.0,
            text: TextParams::default(),
        }
    }
}

/// Current graphics state plus the stack of saved states.
#[derive(Debug, Clone, Default)]
pub struct InterpreterState {
    current: GraphicsState,
    stack: Vec<GraphicsState>,
}

impl InterpreterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an inherited graphics state with an empty stack
    /// (form XObjects).
    pub fn from_graphics_state(current: GraphicsState) -> Self {
        Self {
            current,
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Ctm {
        &self.current.ctm
    }

    pub fn current(&self) -> &GraphicsState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut GraphicsState {
        &mut self.current
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`
    pub fn save_state(&mut self) {
        self.stack.push(self.current);
    }

    /// `Q`. Returns `false` on an unbalanced restore.
    pub fn restore_state(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.current = saved;
                true
            }
            None => false,
        }
    }

    /// `cm`: CTM' = M × CTM.
    pub fn concat_matrix(&mut self, m: &Ctm) {
        self.current.ctm = m.concat(&self.current.ctm);
    }

    /// `w`
    pub fn set_line_width(&mut self, width: f64) {
        self.current.line_width = width;
    }

    /// `G`, `RG`, `K`, `SC`, `SCN`
    pub fn set_stroking_color(&mut self, components: &[f32]) {
        if let Some(gray) = gray_from_components(components) {
            self.current.stroke_gray = gray;
        }
    }

    /// `g`, `rg`, `k`, `sc`, `scn`
    pub fn set_non_stroking_color(&mut self, components: &[f32]) {
        if let Some(gray) = gray_from_components(components) {
            self.current.fill_gray = gray;
        }
    }

    /// Paint parameters in device terms.
    pub fn paint(&self) -> Paint {
        Paint {
            stroke_gray: self.current.stroke_gray,
            fill_gray: self.current.fill_gray,
            line_width: self.current.line_width * self.current.ctm.mean_scale(),
        }
    }
}

/// Reduce color components to a gray level, choosing the color space by
/// component count. Other counts are not a device color and yield `None`.
pub fn gray_from_components(components: &[f32]) -> Option<f32> {
    let gray = match *components {
        [g] => g,
        [r, g, b] => 0.299 * r + 0.587 * g + 0.114 * b,
        [c, m, y, k] => 1.0 - (0.3 * c + 0.59 * m + 0.11 * y + k).min(1.0),
        _ => return None,
    };
    Some(gray.clamp(0.0, 1.0))
}
