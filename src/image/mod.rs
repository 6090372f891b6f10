//! Multi-band satellite imagery
//!
//! An [`Image`] holds one `f64` plane per band together with a
//! [`BandOrder`] naming them, so features ask for "the NIR band" rather
//! than a channel index.

mod bands;

pub use bands::{Band, BandOrder, Satellite};

use std::path::Path;

use log::info;
use ndarray::{Array2, ArrayView2};

use crate::errors::{MaskError, MaskResult};

/// Multi-band raster with named bands
#[derive(Debug, Clone)]
pub struct Image {
    bands: Vec<Array2<f64>>,
    band_order: BandOrder,
}

impl Image {
    /// Builds an image from one array per band
    ///
    /// All bands must share one shape, and there must be exactly one array
    /// per band in `band_order`.
    pub fn from_bands(bands: Vec<Array2<f64>>, band_order: BandOrder) -> MaskResult<Self> {
        if bands.len() != band_order.len() {
            return Err(MaskError::Extraction(format!(
                "Band order names {} bands, got {} arrays", band_order.len(), bands.len())));
        }

        if let Some(first) = bands.first() {
            if let Some(other) = bands.iter().find(|b| b.dim() != first.dim()) {
                return Err(MaskError::Extraction(format!(
                    "Band shapes differ: {:?} and {:?}", first.dim(), other.dim())));
            }
        }

        Ok(Image { bands, band_order })
    }

    /// Decodes an image file, naming its channels after the satellite's bands
    ///
    /// Samples are scaled to `[0, 1]` by the decoder; normalized-difference
    /// features do not depend on that scale.
    pub fn open<P: AsRef<Path>>(path: P, satellite: Satellite) -> MaskResult<Self> {
        let path = path.as_ref();
        let band_order = satellite.band_order();
        info!("Opening {} image {}", satellite, path.display());

        let decoded = ::image::open(path)?;
        let channels = decoded.color().channel_count() as usize;
        if channels < band_order.len() {
            return Err(MaskError::Extraction(format!(
                "{} has {} channels, {} imagery needs {}",
                path.display(), channels, satellite, band_order.len())));
        }

        let rgba = decoded.into_rgba32f();
        let (cols, rows) = rgba.dimensions();
        let (rows, cols) = (rows as usize, cols as usize);

        let mut bands = vec![Array2::<f64>::zeros((rows, cols)); band_order.len()];
        for (x, y, pixel) in rgba.enumerate_pixels() {
            for (band, plane) in bands.iter_mut().enumerate() {
                plane[[y as usize, x as usize]] = pixel.0[band] as f64;
            }
        }

        Self::from_bands(bands, band_order)
    }

    /// Image size as `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        self.bands.first().map(|b| b.dim()).unwrap_or((0, 0))
    }

    /// Names of the bands, in storage order
    pub fn band_order(&self) -> &BandOrder {
        &self.band_order
    }

    /// View of a named band
    pub fn band(&self, band: Band) -> MaskResult<ArrayView2<'_, f64>> {
        self.band_order.index_of(band)
            .and_then(|i| self.bands.get(i))
            .map(|b| b.view())
            .ok_or_else(|| MaskError::Extraction(format!("Image has no {} band", band)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup_follows_order() {
        let order = Satellite::Pleiades.band_order();
        let bands = (0..4).map(|i| Array2::from_elem((2, 3), i as f64)).collect();
        let image = Image::from_bands(bands, order).unwrap();

        assert_eq!(image.shape(), (2, 3));
        assert_eq!(image.band(Band::Red).unwrap()[[0, 0]], 0.0);
        assert_eq!(image.band(Band::Blue).unwrap()[[1, 2]], 2.0);
        assert_eq!(image.band(Band::Nir).unwrap()[[1, 1]], 3.0);
    }

    #[test]
    fn test_missing_band() {
        let bands = (0..3).map(|_| Array2::zeros((1, 1))).collect();
        let image = Image::from_bands(bands, Satellite::Rgb.band_order()).unwrap();
        assert!(matches!(image.band(Band::Nir), Err(MaskError::Extraction(_))));
    }

    #[test]
    fn test_rejects_mismatched_bands() {
        let bands = vec![Array2::zeros((2, 2)), Array2::zeros((2, 3)), Array2::zeros((2, 2))];
        assert!(Image::from_bands(bands, Satellite::Rgb.band_order()).is_err());

        let too_few = vec![Array2::zeros((2, 2))];
        assert!(Image::from_bands(too_few, Satellite::Rgb.band_order()).is_err());
    }
}
