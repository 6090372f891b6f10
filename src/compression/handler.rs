//! Compression handler trait definition

use crate::tiff::errors::TiffResult;

/// Strategy trait for one strip compression method
pub trait CompressionHandler: Send + Sync {
    /// Decompress a strip
    fn decompress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Compress a strip
    fn compress(&self, data: &[u8]) -> TiffResult<Vec<u8>>;

    /// Human-readable name of this compression method
    fn name(&self) -> &'static str;

    /// TIFF Compression tag value
    fn code(&self) -> u16;
}
