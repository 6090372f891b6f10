//! TIFF and GeoTIFF support
//!
//! A reader for the IFD structure of TIFF and BigTIFF files in either byte
//! order, and a builder that writes little-endian (Big)TIFF files with
//! GeoTIFF georeferencing tags.

pub mod errors;
pub mod ifd;
pub mod types;
pub mod reader;
pub mod builder;
mod builders;
pub(crate) mod constants;
pub(crate) mod validation;
mod tests;

pub use crate::io::byte_order::{BigEndianHandler, ByteOrder, ByteOrderHandler, LittleEndianHandler};
pub use errors::{TiffError, TiffResult};
pub use ifd::{IFD, IFDEntry};
pub use reader::TiffReader;
pub use types::TIFF;
pub use builder::TiffBuilder;
pub use builders::geo_tags::GeoTagsBuilder;
