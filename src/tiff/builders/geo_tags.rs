//! GeoTIFF tag strategies
//!
//! Turns a plain mask TIFF into a GeoTIFF: the affine geotransform goes into
//! the model tags, the coordinate system into the GeoKey directory.

use std::collections::BTreeMap;

use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::tiff::ifd::IFD;
use crate::tiff::constants::{tags, field_types, geo_keys, raster_type};
use crate::utils::write_utils;
use log::{debug, info};

/// Handles GeoTIFF tags
pub struct GeoTagsBuilder;

impl GeoTagsBuilder {
    /// Write a geotransform into the model tags
    ///
    /// North-up transforms use ModelPixelScale + ModelTiepoint, which every
    /// GeoTIFF reader understands. Rotated transforms need the full
    /// ModelTransformation matrix.
    pub fn add_geotransform(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        transform: &GeoTransform
    ) {
        info!("Adding geotransform {}", transform);

        if transform.is_north_up() {
            let pixel_scale = [transform.pixel_width, -transform.pixel_height, 0.0];
            let tiepoint = [0.0, 0.0, 0.0, transform.origin_x, transform.origin_y, 0.0];

            write_utils::create_external_tag(
                ifd,
                external_data,
                ifd_index,
                tags::MODEL_PIXEL_SCALE_TAG,
                field_types::DOUBLE,
                pixel_scale.len() as u64,
                write_utils::doubles_to_le_bytes(&pixel_scale)
            );
            write_utils::create_external_tag(
                ifd,
                external_data,
                ifd_index,
                tags::MODEL_TIEPOINT_TAG,
                field_types::DOUBLE,
                tiepoint.len() as u64,
                write_utils::doubles_to_le_bytes(&tiepoint)
            );
        } else {
            let matrix = Self::transformation_matrix(transform);
            debug!("Transform is rotated, writing ModelTransformation");

            write_utils::create_external_tag(
                ifd,
                external_data,
                ifd_index,
                tags::MODEL_TRANSFORMATION_TAG,
                field_types::DOUBLE,
                matrix.len() as u64,
                write_utils::doubles_to_le_bytes(&matrix)
            );
        }
    }

    /// Row-major 4x4 ModelTransformation matrix for a geotransform
    pub fn transformation_matrix(transform: &GeoTransform) -> [f64; 16] {
        [
            transform.pixel_width, transform.row_rotation, 0.0, transform.origin_x,
            transform.col_rotation, transform.pixel_height, 0.0, transform.origin_y,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ]
    }

    /// Write a GeoKeyDirectory naming the coordinate system
    pub fn add_geo_key_directory(
        ifd: &mut IFD,
        external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
        ifd_index: usize,
        crs: &CoordinateSystem
    ) {
        info!("Adding GeoKey directory for {}", crs.description());

        let directory = Self::geo_key_directory(crs);
        write_utils::create_external_tag(
            ifd,
            external_data,
            ifd_index,
            tags::GEO_KEY_DIRECTORY_TAG,
            field_types::SHORT,
            directory.len() as u64,
            write_utils::shorts_to_le_bytes(&directory)
        );
    }

    /// GeoKeyDirectory SHORT array: a 4-value header, then
    /// `(key, location, count, value)` per key in ascending key order
    pub fn geo_key_directory(crs: &CoordinateSystem) -> Vec<u16> {
        let cs_key = if crs.is_geographic() {
            geo_keys::GEOGRAPHIC_TYPE
        } else {
            geo_keys::PROJECTED_CS_TYPE
        };

        // Location 0 means the value is stored in the key itself
        let keys: [(u16, u16); 3] = [
            (geo_keys::GT_MODEL_TYPE, crs.model_type()),
            (geo_keys::GT_RASTER_TYPE, raster_type::PIXEL_IS_AREA),
            (cs_key, crs.epsg_code() as u16),
        ];

        let mut directory = Vec::with_capacity(4 + 4 * keys.len());
        directory.extend_from_slice(&geo_keys::DIRECTORY_VERSION);
        directory.push(keys.len() as u16);
        for (key, value) in keys {
            directory.extend_from_slice(&[key, 0, 1, value]);
        }

        directory
    }

    /// EPSG code named by a GeoKeyDirectory, if any
    pub fn epsg_from_geo_keys(directory: &[u64]) -> Option<u32> {
        let key_count = *directory.get(3)? as usize;

        directory.get(4..4 + 4 * key_count)?
            .chunks_exact(4)
            .find(|key| {
                let id = key[0] as u16;
                (id == geo_keys::GEOGRAPHIC_TYPE || id == geo_keys::PROJECTED_CS_TYPE) && key[1] == 0
            })
            .map(|key| key[3] as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiff::constants::model_type;

    #[test]
    fn test_north_up_uses_scale_and_tiepoint() {
        let mut ifd = IFD::new(0, 0);
        let mut external = BTreeMap::new();
        let transform = GeoTransform::new(500.0, 900.0, 2.0, -2.0);

        GeoTagsBuilder::add_geotransform(&mut ifd, &mut external, 0, &transform);

        assert!(ifd.has_tag(tags::MODEL_PIXEL_SCALE_TAG));
        assert!(ifd.has_tag(tags::MODEL_TIEPOINT_TAG));
        assert!(!ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG));
        assert_eq!(external[&(0, tags::MODEL_TIEPOINT_TAG)].len(), 48);
    }

    #[test]
    fn test_rotated_uses_transformation() {
        let mut ifd = IFD::new(0, 0);
        let mut external = BTreeMap::new();
        let transform = GeoTransform::from_gdal([0.0, 1.0, 0.5, 0.0, 0.5, -1.0]);

        GeoTagsBuilder::add_geotransform(&mut ifd, &mut external, 0, &transform);

        assert!(ifd.has_tag(tags::MODEL_TRANSFORMATION_TAG));
        assert_eq!(ifd.get_entry(tags::MODEL_TRANSFORMATION_TAG).map(|e| e.count), Some(16));
    }

    #[test]
    fn test_geo_key_directory_layout() {
        let directory = GeoTagsBuilder::geo_key_directory(&CoordinateSystem::from_epsg(32631));
        assert_eq!(directory, vec![
            1, 1, 0, 3,
            geo_keys::GT_MODEL_TYPE, 0, 1, model_type::PROJECTED,
            geo_keys::GT_RASTER_TYPE, 0, 1, raster_type::PIXEL_IS_AREA,
            geo_keys::PROJECTED_CS_TYPE, 0, 1, 32631,
        ]);

        let as_u64: Vec<u64> = directory.iter().map(|v| *v as u64).collect();
        assert_eq!(GeoTagsBuilder::epsg_from_geo_keys(&as_u64), Some(32631));
        assert_eq!(GeoTagsBuilder::epsg_from_geo_keys(&[1, 1, 0]), None);
    }
}
