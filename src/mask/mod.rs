//! Mask operations
//!
//! The four entry points of the crate: write a mask GeoTIFF, decode a mask
//! from any image file, rasterize a shapefile into a mask and threshold an
//! NDXI feature into a mask. Each is independent of the others.

mod loader;
mod ndxi;
mod stats;
mod writer;

pub use loader::{load_mask_from_file, load_mask_from_shapefile, read_mask_geotiff, GeoMask};
pub use ndxi::{collapse_feature_values, get_ndxi_mask, threshold_below_otsu};
pub use stats::MaskStats;
pub use writer::{save_mask_to_file, MaskPixel, MaskWriter};
