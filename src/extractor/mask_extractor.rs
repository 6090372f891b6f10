//! Mask GeoTIFF extraction
//!
//! Combines the IFD reader, the strip reader and the GeoTIFF model tags into
//! one pass over a mask file.

use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::coordinate::GeoTransform;
use crate::io::byte_order::ByteOrder;
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::tags;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::{GeoTagsBuilder, TiffReader};

use super::strip_reader::StripReader;

/// Pixels and metadata of the first raster in a mask file
#[derive(Debug, Clone)]
pub struct ExtractedMask {
    /// Number of columns
    pub width: usize,
    /// Number of rows
    pub height: usize,
    /// Row-major pixel values
    pub pixels: Vec<u8>,
    /// TIFF Compression tag value
    pub compression: u64,
    /// Affine transform from the model tags, if present
    pub geotransform: Option<GeoTransform>,
    /// EPSG code from the GeoKey directory, if present
    pub epsg: Option<u32>,
    /// Whether the file is a BigTIFF
    pub is_big_tiff: bool,
    /// Byte order of the file
    pub byte_order: ByteOrder,
}

/// Reads mask rasters out of (Geo)TIFF files
pub struct MaskExtractor;

impl MaskExtractor {
    /// Extract the first raster of the file at `path`
    pub fn extract_file<P: AsRef<Path>>(path: P) -> TiffResult<ExtractedMask> {
        let path = path.as_ref();
        info!("Extracting mask from {}", path.display());

        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::extract(&mut reader)
    }

    /// Extract the first raster from any seekable source
    pub fn extract<R: SeekableReader>(reader: &mut R) -> TiffResult<ExtractedMask> {
        let mut tiff_reader = TiffReader::new();
        let tiff = tiff_reader.read(reader)?;
        let ifd = tiff.main_ifd()
            .ok_or_else(|| TiffError::GenericError("TIFF file contains no IFD".to_string()))?;

        let (width, height) = ifd.get_dimensions().ok_or(TiffError::MissingDimensions)?;
        let pixels = StripReader::new(reader, ifd, &tiff_reader).extract()?;

        let geotransform = Self::read_geotransform(reader, ifd, &tiff_reader)?;
        let epsg = if ifd.has_tag(tags::GEO_KEY_DIRECTORY_TAG) {
            let keys = tiff_reader.read_tag_values(reader, ifd, tags::GEO_KEY_DIRECTORY_TAG)?;
            GeoTagsBuilder::epsg_from_geo_keys(&keys)
        } else {
            None
        };
        debug!("Georeferencing: transform {:?}, EPSG {:?}", geotransform, epsg);

        Ok(ExtractedMask {
            width: width as usize,
            height: height as usize,
            pixels,
            compression: ifd.get_compression(),
            geotransform,
            epsg,
            is_big_tiff: tiff.is_big_tiff,
            byte_order: tiff.byte_order,
        })
    }

    /// Rebuild the affine transform from ModelTransformation, or from
    /// ModelPixelScale + ModelTiepoint
    fn read_geotransform<R: SeekableReader>(
        reader: &mut R,
        ifd: &IFD,
        tiff_reader: &TiffReader
    ) -> TiffResult<Option<GeoTransform>> {
        if ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG) {
            let m = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TRANSFORMATION_TAG)?;
            if m.len() < 8 {
                return Err(TiffError::GenericError(format!(
                    "ModelTransformation has {} values, expected 16", m.len())));
            }
            return Ok(Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]])));
        }

        if !(ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && ifd.has_tag(tags::MODEL_TIEPOINT_TAG)) {
            return Ok(None);
        }

        let scale = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_PIXEL_SCALE_TAG)?;
        let tiepoint = tiff_reader.read_tag_doubles(reader, ifd, tags::MODEL_TIEPOINT_TAG)?;
        if scale.len() < 2 || tiepoint.len() < 6 {
            return Err(TiffError::GenericError("Invalid pixel scale or tiepoint data".to_string()));
        }

        // The tiepoint may anchor any raster position, not only (0, 0)
        let (i, j, x, y) = (tiepoint[0], tiepoint[1], tiepoint[3], tiepoint[4]);
        let (sx, sy) = (scale[0], scale[1]);

        Ok(Some(GeoTransform::new(x - i * sx, y + j * sy, sx, -sy)))
    }
}
