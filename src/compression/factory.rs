//! Compression handler lookup

use std::fmt;
use std::str::FromStr;

use crate::tiff::constants::compression;
use crate::tiff::errors::{TiffError, TiffResult};
use super::handler::CompressionHandler;
use super::uncompressed::UncompressedHandler;
use super::deflate::AdobeDeflateHandler;
use super::zstd::ZstdHandler;

/// Factory for creating compression handlers
pub struct CompressionFactory;

impl CompressionFactory {
    /// Create a handler for a TIFF Compression tag value
    pub fn create_handler(code: u64) -> TiffResult<Box<dyn CompressionHandler>> {
        match code {
            c if c == compression::NONE as u64 => Ok(Box::new(UncompressedHandler)),
            c if c == compression::DEFLATE as u64 => Ok(Box::new(AdobeDeflateHandler)),
            c if c == compression::ZSTD as u64 => Ok(Box::new(ZstdHandler::new())),
            _ => Err(TiffError::UnsupportedCompression(code))
        }
    }
}

/// Strip compression applied when writing a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskCompression {
    #[default]
    None,
    Deflate,
    Zstd,
}

impl MaskCompression {
    /// TIFF Compression tag value
    pub fn code(&self) -> u16 {
        match self {
            MaskCompression::None => compression::NONE,
            MaskCompression::Deflate => compression::DEFLATE,
            MaskCompression::Zstd => compression::ZSTD,
        }
    }

    /// Handler that encodes strips for this setting
    pub fn handler(&self) -> Box<dyn CompressionHandler> {
        match self {
            MaskCompression::None => Box::new(UncompressedHandler),
            MaskCompression::Deflate => Box::new(AdobeDeflateHandler),
            MaskCompression::Zstd => Box::new(ZstdHandler::new()),
        }
    }
}

impl FromStr for MaskCompression {
    type Err = TiffError;

    fn from_str(name: &str) -> TiffResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "uncompressed" | "none" => Ok(MaskCompression::None),
            "deflate" | "zip" | "adobe deflate" => Ok(MaskCompression::Deflate),
            "zstd" => Ok(MaskCompression::Zstd),
            _ => Err(TiffError::GenericError(format!("Unknown compression type: {}", name)))
        }
    }
}

impl fmt::Display for MaskCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.handler().name())
    }
}
