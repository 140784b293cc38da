//! Error type for pdfcrop.
//!
//! [`CropError`] covers both configuration-time failures (margin, page
//! range, aspect and paper-size literals) and per-page failures raised while
//! computing content extents. Configuration errors are fatal to the whole
//! run; extent errors identify the page they came from.

use std::fmt;

/// Errors raised while configuring or running a crop.
#[derive(Debug, Clone, PartialEq)]
pub enum CropError {
    /// A margin literal could not be parsed.
    InvalidMarginSyntax(String),
    /// A page selector literal could not be parsed.
    InvalidPageRangeSyntax(String),
    /// An aspect-ratio literal could not be parsed or is not positive.
    InvalidAspectSyntax(String),
    /// An aspect literal named a paper size that is not in the table.
    UnknownPaperSize(String),
    /// Padding must be a finite, non-negative length.
    InvalidPadding(f64),
    /// The drawing operations (or raster) of a page could not be obtained.
    ExtentComputation {
        /// 1-indexed page number, `0` if not yet known.
        page: usize,
        /// Description of the underlying failure.
        message: String,
    },
    /// No outline is available for a glyph. Recovered inside the tracker.
    FontOutlineUnavailable {
        /// Font reference the glyph was drawn with.
        font: usize,
        /// Character code of the glyph.
        code: u32,
    },
    /// The document container is malformed or cannot be modified.
    Document(String),
    /// I/O error reading or writing a document.
    Io(String),
}

impl CropError {
    /// Attach a page number to an extent error that was raised without one.
    pub fn on_page(self, page: usize) -> Self {
        match self {
            CropError::ExtentComputation { page: 0, message } => {
                CropError::ExtentComputation { page, message }
            }
            other => other,
        }
    }

    /// Whether this error comes from parsing user configuration.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            CropError::InvalidMarginSyntax(_)
                | CropError::InvalidPageRangeSyntax(_)
                | CropError::InvalidAspectSyntax(_)
                | CropError::UnknownPaperSize(_)
                | CropError::InvalidPadding(_)
        )
    }
}

impl fmt::Display for CropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CropError::InvalidMarginSyntax(msg) => write!(f, "invalid margin: {msg}"),
            CropError::InvalidPageRangeSyntax(msg) => write!(f, "invalid page range: {msg}"),
            CropError::InvalidAspectSyntax(msg) => write!(f, "invalid aspect ratio: {msg}"),
            CropError::UnknownPaperSize(name) => write!(f, "unknown paper size: '{name}'"),
            CropError::InvalidPadding(value) => {
                write!(f, "invalid padding: {value} (must be finite and >= 0)")
            }
            CropError::ExtentComputation { page: 0, message } => {
                write!(f, "failed to compute page extent: {message}")
            }
            CropError::ExtentComputation { page, message } => {
                write!(f, "failed to compute extent of page {page}: {message}")
            }
            CropError::FontOutlineUnavailable { font, code } => {
                write!(f, "no outline for glyph {code} of font #{font}")
            }
            CropError::Document(msg) => write!(f, "document error: {msg}"),
            CropError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for CropError {}

impl From<std::io::Error> for CropError {
    fn from(err: std::io::Error) -> Self {
        CropError::Io(err.to_string())
    }
}
