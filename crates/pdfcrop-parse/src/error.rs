//! Error types for the lopdf backend and the content interpreter.
//!
//! [`BackendError`] is derived with [`thiserror`] and converts into
//! [`CropError`] at the crate boundary.

use pdfcrop_core::CropError;
use thiserror::Error;

/// Error type for PDF backend operations.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Document structure, syntax or object resolution failed.
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Reading or writing PDF data failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A font program or font dictionary could not be used.
    #[error("font error: {0}")]
    Font(String),

    /// A content stream could not be interpreted.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// The document is encrypted and cannot be opened with an empty password.
    #[error("document is encrypted: {0}")]
    Encrypted(String),

    /// A core library error.
    #[error(transparent)]
    Core(#[from] CropError),
}

impl From<BackendError> for CropError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(msg) | BackendError::Encrypted(msg) => CropError::Document(msg),
            BackendError::Io(e) => CropError::Io(e.to_string()),
            BackendError::Font(msg) | BackendError::Interpreter(msg) => {
                CropError::ExtentComputation {
                    page: 0,
                    message: msg,
                }
            }
            BackendError::Core(e) => e,
        }
    }
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}
