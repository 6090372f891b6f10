//! Coordinate handling for georeferenced masks
//!
//! Affine geotransforms, world-space bounding boxes and EPSG classification.

mod bbox;
mod crs;
mod geotransform;

pub use self::bbox::BoundingBox;
pub use self::crs::CoordinateSystem;
pub use self::geotransform::GeoTransform;
