//! Parallel feature extraction
//!
//! Computes every feature of a [`FeatureSet`] for every cell of a
//! [`WindowGenerator`]. Rows of cells are spread over the global rayon
//! pool; the call returns once all rows are done.

use log::{debug, info};
use ndarray::Array3;
use rayon::prelude::*;

use crate::errors::{MaskError, MaskResult};
use crate::features::FeatureSet;
use crate::generator::WindowGenerator;
use crate::utils::progress::ProgressTracker;

/// Extracts all features over the generator's grid
///
/// # Arguments
/// * `features` - Features to compute, in value-array order
/// * `generator` - Source of the windows
///
/// # Returns
/// Array of shape `(x_size, y_size, features.index_size())`
pub fn extract_features_parallel<G: WindowGenerator>(
    features: &FeatureSet,
    generator: &G,
) -> MaskResult<Array3<f64>> {
    let (x_size, y_size) = (generator.x_size(), generator.y_size());
    let index_size = features.index_size();

    if features.is_empty() || index_size == 0 {
        return Err(MaskError::Extraction("No features to extract".to_string()));
    }
    if x_size == 0 || y_size == 0 {
        return Err(MaskError::Extraction(format!(
            "Generator has an empty grid: {}x{}", x_size, y_size)));
    }

    info!("Extracting {} values per cell over {}x{} cells", index_size, x_size, y_size);
    let progress = ProgressTracker::new(x_size as u64, "Extracting features");

    let rows = (0..x_size)
        .into_par_iter()
        .map(|x| {
            let row = extract_row(features, generator, x, y_size, index_size);
            progress.increment(1);
            row
        })
        .collect::<MaskResult<Vec<Vec<f64>>>>()?;

    progress.finish();
    debug!("Feature extraction finished");

    let values: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(Array3::from_shape_vec((x_size, y_size, index_size), values)?)
}

/// Values of every cell in row `x`, laid out cell after cell
fn extract_row<G: WindowGenerator>(
    features: &FeatureSet,
    generator: &G,
    x: usize,
    y_size: usize,
    index_size: usize,
) -> MaskResult<Vec<f64>> {
    let mut row = vec![0.0; y_size * index_size];

    for (y, cell) in row.chunks_mut(index_size).enumerate() {
        let mut offset = 0;
        for feature in features.iter() {
            let size = feature.size();
            for &shape in feature.windows() {
                let window = generator.window(x, y, shape)?;
                feature.compute(&window, &mut cell[offset..offset + size])?;
                offset += size;
            }
        }
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Ndxi, NdxiKind};
    use crate::generator::FullGenerator;
    use crate::image::{Image, Satellite};
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn generator() -> FullGenerator {
        // NIR brighter than red on the left half only
        let red = Array2::from_elem((4, 4), 1.0);
        let nir = Array2::from_shape_fn((4, 4), |(_, c)| if c < 2 { 3.0 } else { 1.0 });
        let zeros = Array2::zeros((4, 4));
        let image = Image::from_bands(vec![red, zeros.clone(), zeros, nir], Satellite::Pleiades.band_order()).unwrap();
        FullGenerator::new(image, (2, 2)).unwrap()
    }

    #[test]
    fn test_extracts_every_cell() {
        let mut features = FeatureSet::new();
        features.add(Box::new(Ndxi::new(NdxiKind::NirNdvi, vec![(2, 2)])));
        features.add(Box::new(Ndxi::new(NdxiKind::RgNdvi, vec![(1, 1), (2, 2)])));

        let values = extract_features_parallel(&features, &generator()).unwrap();

        assert_eq!(values.dim(), (2, 2, 3));
        assert_relative_eq!(values[[0, 0, 0]], 0.5);
        assert_relative_eq!(values[[1, 1, 0]], 0.0);
        assert_relative_eq!(values[[1, 0, 2]], 1.0);
    }

    #[test]
    fn test_rejects_empty_feature_set() {
        let result = extract_features_parallel(&FeatureSet::new(), &generator());
        assert!(matches!(result, Err(MaskError::Extraction(_))));
    }
}
