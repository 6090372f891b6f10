//! Strip compression for mask rasters
//!
//! Each supported TIFF compression scheme is a [`CompressionHandler`]; the
//! [`CompressionFactory`] maps TIFF compression codes to handlers when
//! reading, and [`MaskCompression`] is the writer-facing choice.

mod handler;
mod uncompressed;
mod deflate;
mod factory;
mod zstd;

pub use handler::CompressionHandler;
pub use uncompressed::UncompressedHandler;
pub use deflate::AdobeDeflateHandler;
pub use factory::{CompressionFactory, MaskCompression};
pub use zstd::ZstdHandler;
