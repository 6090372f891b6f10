//! Pixel extraction from mask TIFF files
//!
//! The strip reader decodes raster data; the mask extractor ties it to the
//! IFD reader and the GeoTIFF model tags.

mod strip_reader;
mod mask_extractor;

pub use strip_reader::{apply_horizontal_predictor, StripReader};
pub use mask_extractor::{ExtractedMask, MaskExtractor};
