//! Mask loaders

use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

use crate::coordinate::GeoTransform;
use crate::errors::MaskResult;
use crate::extractor::MaskExtractor;
use crate::rasterize::rasterize_polygons;
use crate::shapefile::load_shapefile_to_multipolygon;

/// Decodes any image file into a luminance array `(rows, cols)`
///
/// Pixel values keep their stored depth: an 8-bit image yields 0..=255 and
/// a 16-bit image its raw 16-bit values. Colour images are reduced to
/// luminance at their own depth. The content is not checked to be binary.
pub fn load_mask_from_file<P: AsRef<Path>>(path: P) -> MaskResult<Array2<u16>> {
    let path = path.as_ref();
    info!("Loading mask image {}", path.display());

    let decoded = image::open(path)?;
    let color = decoded.color();
    let (cols, rows) = (decoded.width() as usize, decoded.height() as usize);

    let values: Vec<u16> = if color.bytes_per_pixel() == color.channel_count() {
        decoded.into_luma8().into_raw().into_iter().map(u16::from).collect()
    } else {
        decoded.into_luma16().into_raw()
    };
    debug!("Decoded {}x{} mask from {:?}", rows, cols, color);

    Ok(Array2::from_shape_vec((rows, cols), values)?)
}

/// Rasterizes every polygon of a shapefile onto a `(rows, cols)` grid
///
/// Pixels whose centre falls inside any polygon are `true`.
pub fn load_mask_from_shapefile<P: AsRef<Path>>(
    path: P,
    shape: (usize, usize),
    transform: &GeoTransform,
) -> MaskResult<Array2<bool>> {
    let (multipolygon, _header) = load_shapefile_to_multipolygon(path)?;
    rasterize_polygons(&multipolygon, shape, transform)
}

/// Mask GeoTIFF read through the crate's own TIFF reader
#[derive(Debug, Clone)]
pub struct GeoMask {
    /// Pixels as `(rows, cols)`
    pub pixels: Array2<u8>,
    pub geotransform: Option<GeoTransform>,
    pub epsg: Option<u32>,
    /// TIFF Compression tag value
    pub compression: u64,
    pub is_big_tiff: bool,
}

/// Reads a single-band 8-bit mask GeoTIFF with its georeferencing
pub fn read_mask_geotiff<P: AsRef<Path>>(path: P) -> MaskResult<GeoMask> {
    let extracted = MaskExtractor::extract_file(path)?;
    let pixels = Array2::from_shape_vec((extracted.height, extracted.width), extracted.pixels)?;

    Ok(GeoMask {
        pixels,
        geotransform: extracted.geotransform,
        epsg: extracted.epsg,
        compression: extracted.compression,
        is_big_tiff: extracted.is_big_tiff,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::MaskError;
    use crate::mask::{save_mask_to_file, MaskWriter};
    use crate::shapefile::fixtures::{build_polygon_shapefile, square, square_ccw};
    use ndarray::array;
    use tempfile::tempdir;

    #[test]
    fn test_load_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask.png");
        image::GrayImage::from_raw(3, 2, vec![0, 255, 0, 1, 1, 0]).unwrap().save(&path).unwrap();

        let mask = load_mask_from_file(&path).unwrap();
        assert_eq!(mask, array![[0u16, 255, 0], [1, 1, 0]]);
    }

    #[test]
    fn test_sixteen_bit_values_are_not_rescaled() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask16.png");
        image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::from_raw(2, 2, vec![0, 1, 1, 0])
            .unwrap()
            .save(&path)
            .unwrap();

        let mask = load_mask_from_file(&path).unwrap();
        assert_eq!(mask, array![[0u16, 1], [1, 0]]);
    }

    #[test]
    fn test_eight_bit_rgb_keeps_eight_bit_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask_rgb.png");
        image::RgbImage::from_raw(2, 1, vec![0, 0, 0, 1, 1, 1]).unwrap().save(&path).unwrap();

        let mask = load_mask_from_file(&path).unwrap();
        assert_eq!(mask, array![[0u16, 1]]);
    }

    #[test]
    fn test_saved_mask_decodes_with_image_crate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mask.tif");
        let mask = array![[true, false], [false, false], [true, true]];
        save_mask_to_file(&mask, &path).unwrap();

        let loaded = load_mask_from_file(&path).unwrap();
        assert_eq!(loaded, mask.mapv(|p| p as u16));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = load_mask_from_file(dir.path().join("absent.png"));
        assert!(matches!(result, Err(MaskError::Io(_))));
    }

    #[test]
    fn test_shapefile_mask() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("field.shp");
        std::fs::write(&path, build_polygon_shapefile(5, &[vec![square(1.0, 1.0, 3.0, 3.0)]])).unwrap();

        // 4x4 grid of unit pixels with its top-left corner at (0, 4)
        let mask = load_mask_from_shapefile(&path, (4, 4), &GeoTransform::new(0.0, 4.0, 1.0, -1.0)).unwrap();
        assert_eq!(mask.dim(), (4, 4));
        assert_eq!(mask.iter().filter(|p| **p).count(), 4);
        assert!(mask[[1, 1]] && mask[[2, 2]]);
        assert!(!mask[[0, 0]] && !mask[[3, 3]]);
    }

    #[test]
    fn test_hole_listed_after_another_exterior_stays_unset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("parcels.shp");
        std::fs::write(&path, build_polygon_shapefile(5, &[vec![
            square(0.0, 0.0, 4.0, 4.0),
            square(6.0, 6.0, 8.0, 8.0),
            square_ccw(1.0, 1.0, 3.0, 3.0),
        ]])).unwrap();

        let mask = load_mask_from_shapefile(&path, (10, 10), &GeoTransform::new(0.0, 10.0, 1.0, -1.0)).unwrap();
        // 16 - 4 pixels of the holed square plus the 4 of the other one
        assert_eq!(mask.iter().filter(|p| **p).count(), 16);
        assert!(!mask[[7, 1]] && !mask[[8, 2]]);
        assert!(mask[[6, 0]] && mask[[3, 6]]);
    }

    #[test]
    fn test_read_geotiff_keeps_georeferencing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("geo.tif");
        let transform = GeoTransform::new(-10.0, 50.0, 0.5, -0.5);
        let mask = array![[1u8, 0, 1]];
        MaskWriter::new().geotransform(transform).epsg(4326).write(&mask, &path).unwrap();

        let read = read_mask_geotiff(&path).unwrap();
        assert_eq!(read.pixels, mask);
        assert_eq!(read.geotransform, Some(transform));
        assert_eq!(read.epsg, Some(4326));
        assert!(!read.is_big_tiff);
    }
}
