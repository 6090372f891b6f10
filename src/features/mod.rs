//! Window features
//!
//! A [`Feature`] turns one window of an image into a fixed number of
//! values. Features are grouped in a [`FeatureSet`] which fixes their
//! order in the extracted value array.

mod ndxi;

pub use ndxi::{Ndxi, NdxiKind};

use std::fmt;

use log::debug;

use crate::errors::MaskResult;
use crate::generator::{Window, WindowShape};

/// Feature computed over windows of an image
pub trait Feature: Send + Sync {
    /// Unique name inside a feature set
    fn name(&self) -> &str;

    /// Window shapes the feature is computed for
    fn windows(&self) -> &[WindowShape];

    /// Number of values produced per window
    fn size(&self) -> usize;

    /// Compute the feature for one window
    ///
    /// # Arguments
    /// * `window` - Pixels the feature is computed over
    /// * `out` - Destination slice of exactly `size()` values
    fn compute(&self, window: &Window<'_>, out: &mut [f64]) -> MaskResult<()>;

    /// Number of values this feature contributes to the value array
    fn index_size(&self) -> usize {
        self.windows().len() * self.size()
    }
}

/// Ordered collection of features with unique names
#[derive(Default)]
pub struct FeatureSet {
    features: Vec<Box<dyn Feature>>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a feature, replacing any feature with the same name in place
    pub fn add(&mut self, feature: Box<dyn Feature>) {
        match self.features.iter().position(|f| f.name() == feature.name()) {
            Some(index) => {
                debug!("Replacing feature {}", feature.name());
                self.features[index] = feature;
            }
            None => self.features.push(feature),
        }
    }

    /// Total number of values per cell
    pub fn index_size(&self) -> usize {
        self.features.iter().map(|f| f.index_size()).sum()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Feature> {
        self.features.iter().find(|f| f.name() == name).map(|f| f.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Feature> {
        self.features.iter().map(|f| f.as_ref())
    }
}

impl fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter().map(|feature| feature.name())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_replaces_by_name() {
        let mut set = FeatureSet::new();
        set.add(Box::new(Ndxi::new(NdxiKind::NirNdvi, vec![(3, 3)])));
        set.add(Box::new(Ndxi::new(NdxiKind::Ndwi, vec![(5, 5)])));
        set.add(Box::new(Ndxi::new(NdxiKind::NirNdvi, vec![(1, 1), (2, 2)])));

        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().map(|f| f.name()), Some("nir_ndvi"));
        assert_eq!(set.get("nir_ndvi").map(|f| f.windows().len()), Some(2));
        assert_eq!(set.index_size(), 3);
    }

    #[test]
    fn test_empty_set() {
        let set = FeatureSet::new();
        assert!(set.is_empty());
        assert_eq!(set.index_size(), 0);
        assert!(set.get("nir_ndvi").is_none());
    }
}
