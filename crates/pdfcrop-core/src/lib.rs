//! pdfcrop-core: Backend-independent crop box computation.
//!
//! This crate provides the geometry types, the bounding-box tracker, the
//! margin/aspect model, the crop pipeline and the page selector used by
//! pdfcrop-rs. It does not read PDF files; content and fonts arrive through
//! the traits in [`provider`].

pub mod aspect;
pub mod content;
pub mod error;
pub mod font;
pub mod geometry;
pub mod margin;
pub mod pipeline;
pub mod provider;
pub mod raster;
pub mod selector;
pub mod strategy;
pub mod tracker;

pub use aspect::{Aspect, PaperSize};
pub use content::{ContentVisitor, DrawOp, FillRule, FontRef, Glyph, Paint, Recorder, replay};
pub use error::CropError;
pub use font::{FontOutlineProvider, GlyphOutline, NoFonts, OutlineKind};
pub use geometry::{Ctm, Point, Rect};
pub use margin::{Length, Margin};
pub use pipeline::{AspectTarget, CropPipeline};
pub use provider::DocumentModel;
pub use raster::{GrayImage, raster_bounds};
pub use selector::{PageIndex, PageMatcher, PageRange, PageSelector, Parity};
pub use strategy::{CropStrategy, PageExtents};
pub use tracker::{BoundingBoxTracker, TrackerMode};
