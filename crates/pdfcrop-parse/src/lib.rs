//! pdfcrop-parse: lopdf backend for pdfcrop.
//!
//! This crate opens and rewrites PDF documents ([`LopdfDocument`]), walks
//! page content streams ([`ContentInterpreter`]) and provides glyph
//! outlines for the bounding-box tracker ([`FontCache`]). It depends on
//! pdfcrop-core for shared data types.

pub mod error;
pub mod fonts;
pub mod interpreter;
pub mod interpreter_state;
pub mod lopdf_backend;
pub mod standard_fonts;
pub mod text_state;

pub use error::BackendError;
pub use fonts::{FontCache, LoadedFont};
pub use interpreter::{ContentInterpreter, InterpreterOptions};
pub use lopdf_backend::LopdfDocument;
pub use pdfcrop_core;
