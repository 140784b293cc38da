//! pdfcrop: compute and write PDF crop boxes.
//!
//! This is the public API facade crate for pdfcrop-rs. It re-exports types
//! from pdfcrop-core and uses pdfcrop-parse (and, with the `raster` feature,
//! pdfcrop-raster) to measure pages.
//!
//! # Architecture
//!
//! - **pdfcrop-core**: geometry, tracker, margins, pipeline, page selector
//! - **pdfcrop-parse**: lopdf document model, content interpreter, fonts
//! - **pdfcrop-raster**: grayscale page rendering
//! - **pdfcrop** (this crate): [`Document`], [`PageView`] and [`Cropper`]
//!
//! # Example
//!
//! ```ignore
//! use pdfcrop::{Cropper, CropPipeline, CropStrategy, Document};
//!
//! let mut doc = Document::open_file("in.pdf")?;
//! let pipeline = CropPipeline::new(CropStrategy::BoundingBox).with_padding(10.0)?;
//! Cropper::new(pipeline).apply(&mut doc)?;
//! doc.save("out.pdf")?;
//! ```

mod cropper;
mod document;
mod page;

pub use cropper::{CropPlan, Cropper, PageCrop};
pub use document::{Document, DocumentOptions};
pub use page::PageView;

pub use pdfcrop_core::{
    Aspect, AspectTarget, CropError, CropPipeline, CropStrategy, Margin, PageSelector, PaperSize,
    Parity, Rect, TrackerMode,
};
pub use pdfcrop_parse::InterpreterOptions;
#[cfg(feature = "raster")]
pub use pdfcrop_raster::RasterOptions;

pub use pdfcrop_core;
pub use pdfcrop_parse;
