//! NDXI threshold mask

use log::info;
use ndarray::{Array2, Array3, Axis};

use crate::errors::{MaskError, MaskResult};
use crate::extract::extract_features_parallel;
use crate::features::{FeatureSet, Ndxi, NdxiKind};
use crate::generator::WindowGenerator;
use crate::threshold::threshold_otsu;

/// Thresholds an NDXI feature below its Otsu cut
///
/// A single feature with one window spanning `x_size x y_size` is extracted
/// for every cell of `generator`. Cells whose value is strictly below the
/// Otsu threshold are `true`; a constant feature yields an all-`false` mask.
///
/// # Arguments
/// * `generator` - Source of the windows
/// * `kind` - Band pair of the index, `NdxiKind::default()` for NIR NDVI
///
/// # Returns
/// Mask of shape `(x_size, y_size)`
pub fn get_ndxi_mask<G: WindowGenerator>(generator: &G, kind: NdxiKind) -> MaskResult<Array2<bool>> {
    let window = (generator.x_size(), generator.y_size());
    info!("Computing {} mask over {}x{} cells", kind, window.0, window.1);

    let mut features = FeatureSet::new();
    features.add(Box::new(Ndxi::new(kind, vec![window])));

    let values = extract_features_parallel(&features, generator)?;
    threshold_below_otsu(&collapse_feature_values(values)?)
}

/// Drops the trailing feature axis of a single-value feature array
pub fn collapse_feature_values(values: Array3<f64>) -> MaskResult<Array2<f64>> {
    let depth = values.len_of(Axis(2));
    if depth != 1 {
        return Err(MaskError::Extraction(format!(
            "Expected one value per cell, got {}", depth)));
    }
    Ok(values.index_axis_move(Axis(2), 0))
}

/// `true` where a value lies strictly below the Otsu threshold of `values`
pub fn threshold_below_otsu(values: &Array2<f64>) -> MaskResult<Array2<bool>> {
    let threshold = threshold_otsu(values.iter())?;
    info!("Otsu threshold: {}", threshold);
    Ok(values.mapv(|v| v < threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{FullGenerator, Window, WindowShape};
    use crate::image::{Image, Satellite};
    use ndarray::Array2;

    /// Hands out the single pixel under each cell whatever the requested shape
    struct PixelGenerator {
        image: Image,
    }

    impl PixelGenerator {
        /// NIR values giving an NDVI of `ndvi` against a red band of 1
        fn from_ndvi(ndvi: &Array2<f64>) -> Self {
            let nir = ndvi.mapv(|v| (1.0 + v) / (1.0 - v));
            let red = Array2::ones(ndvi.dim());
            let zeros = Array2::zeros(ndvi.dim());
            let bands = vec![zeros.clone(), zeros, red, nir];
            PixelGenerator { image: Image::from_bands(bands, Satellite::Quickbird.band_order()).unwrap() }
        }
    }

    impl WindowGenerator for PixelGenerator {
        fn x_size(&self) -> usize {
            self.image.shape().0
        }

        fn y_size(&self) -> usize {
            self.image.shape().1
        }

        fn window(&self, x: usize, y: usize, _shape: WindowShape) -> MaskResult<Window<'_>> {
            Ok(Window::new(&self.image, x..x + 1, y..y + 1))
        }
    }

    #[test]
    fn test_two_clusters_split_low_from_high() {
        let ndvi = Array2::from_shape_fn((4, 6), |(r, c)| if (r + c) % 2 == 0 { 0.1 } else { 0.9 });
        let mask = get_ndxi_mask(&PixelGenerator::from_ndvi(&ndvi), NdxiKind::default()).unwrap();

        assert_eq!(mask.dim(), (4, 6));
        assert_eq!(mask, ndvi.mapv(|v| v < 0.5));
    }

    #[test]
    fn test_constant_feature_is_all_false() {
        let ndvi = Array2::from_elem((3, 3), 0.4);
        let mask = get_ndxi_mask(&PixelGenerator::from_ndvi(&ndvi), NdxiKind::NirNdvi).unwrap();
        assert!(mask.iter().all(|p| !p));
    }

    #[test]
    fn test_full_generator_shape() {
        let bands = (0..4).map(|b| Array2::from_shape_fn((6, 5), |(r, c)| (b + r * c + 1) as f64)).collect();
        let image = Image::from_bands(bands, Satellite::Quickbird.band_order()).unwrap();
        let generator = FullGenerator::new(image, (2, 2)).unwrap();

        let mask = get_ndxi_mask(&generator, NdxiKind::Ndwi).unwrap();
        assert_eq!(mask.dim(), (3, 3));
    }

    #[test]
    fn test_collapse_rejects_multiple_values() {
        assert!(collapse_feature_values(Array3::zeros((2, 2, 2))).is_err());
        assert_eq!(collapse_feature_values(Array3::zeros((2, 3, 1))).unwrap().dim(), (2, 3));
    }
}
