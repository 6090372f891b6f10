//! Custom error types for the TIFF layer

use std::fmt;
use std::io;

/// Errors raised while reading or writing mask TIFF files
#[derive(Debug)]
pub enum TiffError {
    /// I/O error
    IoError(io::Error),
    /// Invalid byte order marker
    InvalidByteOrder(u16),
    /// Invalid BigTIFF header
    InvalidBigTIFFHeader,
    /// Unsupported TIFF version
    UnsupportedVersion(u16),
    /// Tag not found
    TagNotFound(u16),
    /// Unsupported field type
    UnsupportedFieldType(u16),
    /// Unsupported compression method
    UnsupportedCompression(u64),
    /// Image dimensions not found
    MissingDimensions,
    /// The raster is not a single-band 8-bit image
    UnsupportedSampleLayout { bits_per_sample: u64, samples_per_pixel: u64 },
    /// Decoded strip data does not cover the raster
    StripSizeMismatch { expected: usize, actual: usize },
    /// Generic error with message
    GenericError(String),
}

impl fmt::Display for TiffError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiffError::IoError(e) => write!(f, "I/O error: {}", e),
            TiffError::InvalidByteOrder(v) => write!(f, "Invalid byte order marker: {:#06x}", v),
            TiffError::InvalidBigTIFFHeader => write!(f, "Invalid BigTIFF header"),
            TiffError::UnsupportedVersion(v) => write!(f, "Unsupported TIFF version: {}", v),
            TiffError::TagNotFound(tag) => write!(f, "Tag not found: {}", tag),
            TiffError::UnsupportedFieldType(ft) => write!(f, "Unsupported field type: {}", ft),
            TiffError::UnsupportedCompression(c) => write!(f, "Unsupported compression method: {}", c),
            TiffError::MissingDimensions => write!(f, "Image dimensions not found"),
            TiffError::UnsupportedSampleLayout { bits_per_sample, samples_per_pixel } => write!(
                f,
                "Unsupported sample layout: {} bits x {} samples (expected 8 bits x 1 sample)",
                bits_per_sample, samples_per_pixel
            ),
            TiffError::StripSizeMismatch { expected, actual } => write!(
                f,
                "Strip data covers {} bytes but the raster needs {}",
                actual, expected
            ),
            TiffError::GenericError(msg) => write!(f, "TIFF error: {}", msg),
        }
    }
}

impl std::error::Error for TiffError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TiffError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for TiffError {
    fn from(error: io::Error) -> Self {
        TiffError::IoError(error)
    }
}

impl From<String> for TiffError {
    fn from(msg: String) -> Self {
        TiffError::GenericError(msg)
    }
}

/// Result type for TIFF operations
pub type TiffResult<T> = Result<T, TiffError>;
