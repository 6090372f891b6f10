//! Binary raster mask toolkit
//!
//! Saves masks as GeoTIFF, loads them from images, rasterizes shapefile
//! polygons into them and derives them from NDXI features with Otsu's
//! threshold. See [`mask`] for the four operations.

pub mod io;
pub mod tiff;
pub mod utils;
pub mod compression;
pub mod extractor;
pub mod coordinate;
pub mod errors;
pub mod shapefile;
pub mod rasterize;
pub mod image;
pub mod generator;
pub mod features;
pub mod extract;
pub mod threshold;
pub mod mask;
pub mod config;
pub mod cli;
pub mod commands;
pub mod api;

pub use crate::api::MaskKit;
pub use crate::errors::{MaskError, MaskResult};

pub use coordinate::{BoundingBox, CoordinateSystem, GeoTransform};
pub use mask::{
    get_ndxi_mask, load_mask_from_file, load_mask_from_shapefile, read_mask_geotiff, save_mask_to_file,
    MaskWriter,
};
