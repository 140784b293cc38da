//! Error type for page rasterization.

use pdfcrop_core::CropError;
use pdfcrop_parse::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    /// The page could not be read or interpreted.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Scale must be finite and positive.
    #[error("invalid raster scale: {0}")]
    InvalidScale(f64),

    /// The pixmap for the page could not be allocated.
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u64, height: u64 },
}

impl From<RasterError> for CropError {
    fn from(err: RasterError) -> Self {
        match err {
            RasterError::Backend(e) => e.into(),
            other => CropError::ExtentComputation {
                page: 0,
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixmap_error_message() {
        let err = RasterError::Pixmap {
            width: 0,
            height: 10,
        };
        assert_eq!(err.to_string(), "cannot allocate a 0x10 pixmap");
    }

    #[test]
    fn converts_to_extent_error() {
        let err: CropError = RasterError::InvalidScale(-1.0).into();
        assert!(matches!(err, CropError::ExtentComputation { page: 0, .. }));
    }

    #[test]
    fn backend_error_keeps_its_mapping() {
        let err: CropError = RasterError::from(BackendError::Parse("broken".into())).into();
        assert_eq!(err, CropError::Document("broken".into()));
    }
}
