//! Crate-level error type
//!
//! Every public mask operation returns a [`MaskError`]. Failures raised by
//! the libraries underneath (file system, image decoding, the TIFF layer,
//! ndarray reshapes) are wrapped with the original cause kept available
//! through `source()`.

use std::fmt;
use std::io;

use crate::tiff::errors::TiffError;

/// Tagged error for mask operations
#[derive(Debug)]
pub enum MaskError {
    /// File system failure (missing file, permission denied, ...)
    Io(io::Error),
    /// Image could not be decoded
    Image(image::ImageError),
    /// TIFF encoding or decoding failure
    Tiff(TiffError),
    /// Malformed or unsupported shapefile content
    Shapefile(String),
    /// Grid/geotransform problems during rasterization
    Geometry(String),
    /// Feature extraction could not run
    Extraction(String),
    /// Array shape mismatch
    Shape(ndarray::ShapeError),
    /// Degenerate input to the threshold computation
    Threshold(String),
    /// Invalid configuration value
    Config(String),
}

impl fmt::Display for MaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaskError::Io(e) => write!(f, "I/O error: {}", e),
            MaskError::Image(e) => write!(f, "Image decode error: {}", e),
            MaskError::Tiff(e) => write!(f, "{}", e),
            MaskError::Shapefile(msg) => write!(f, "Shapefile error: {}", msg),
            MaskError::Geometry(msg) => write!(f, "Geometry error: {}", msg),
            MaskError::Extraction(msg) => write!(f, "Feature extraction error: {}", msg),
            MaskError::Shape(e) => write!(f, "Shape error: {}", e),
            MaskError::Threshold(msg) => write!(f, "Threshold error: {}", msg),
            MaskError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for MaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MaskError::Io(e) => Some(e),
            MaskError::Image(e) => Some(e),
            MaskError::Tiff(e) => Some(e),
            MaskError::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for MaskError {
    fn from(error: io::Error) -> Self {
        MaskError::Io(error)
    }
}

impl From<image::ImageError> for MaskError {
    fn from(error: image::ImageError) -> Self {
        // Surface plain file-system failures as I/O, not as decode errors
        match error {
            image::ImageError::IoError(e) => MaskError::Io(e),
            other => MaskError::Image(other),
        }
    }
}

impl From<TiffError> for MaskError {
    fn from(error: TiffError) -> Self {
        match error {
            TiffError::IoError(e) => MaskError::Io(e),
            other => MaskError::Tiff(other),
        }
    }
}

impl From<ndarray::ShapeError> for MaskError {
    fn from(error: ndarray::ShapeError) -> Self {
        MaskError::Shape(error)
    }
}

/// Result type for mask operations
pub type MaskResult<T> = Result<T, MaskError>;
