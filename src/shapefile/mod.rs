//! ESRI shapefile support
//!
//! Only the main `.shp` file is read; polygons are all a mask needs, so
//! sidecar index and attribute files are ignored.

mod reader;

pub use reader::{load_shapefile_to_multipolygon, ShapeType, ShapefileHeader, ShapefileReader};

/// Magic number at the start of every `.shp` file
pub const FILE_CODE: i32 = 9994;

/// Format version written by every known producer
pub const VERSION: i32 = 1000;

/// Size of the fixed file header in bytes
pub const HEADER_SIZE: u64 = 100;

/// Size of a record header (number + content length) in bytes
pub const RECORD_HEADER_SIZE: u64 = 8;

#[cfg(test)]
pub(crate) use reader::tests as fixtures;
