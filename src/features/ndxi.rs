//! Normalized difference indices
//!
//! `(a - b) / (a + b)` for a pair of bands, averaged over a window.

use std::fmt;
use std::str::FromStr;

use crate::errors::{MaskError, MaskResult};
use crate::generator::{Window, WindowShape};
use crate::image::Band;

use super::Feature;

/// Band pair of a normalized difference index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NdxiKind {
    /// (NIR - Red) / (NIR + Red)
    #[default]
    NirNdvi,
    /// (Red - Green) / (Red + Green)
    RgNdvi,
    /// (Red - Blue) / (Red + Blue)
    RbNdvi,
    /// (Green - NIR) / (Green + NIR)
    Ndwi,
}

impl NdxiKind {
    /// Bands `(a, b)` of `(a - b) / (a + b)`
    pub fn bands(&self) -> (Band, Band) {
        match self {
            NdxiKind::NirNdvi => (Band::Nir, Band::Red),
            NdxiKind::RgNdvi => (Band::Red, Band::Green),
            NdxiKind::RbNdvi => (Band::Red, Band::Blue),
            NdxiKind::Ndwi => (Band::Green, Band::Nir),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NdxiKind::NirNdvi => "nir_ndvi",
            NdxiKind::RgNdvi => "rg_ndvi",
            NdxiKind::RbNdvi => "rb_ndvi",
            NdxiKind::Ndwi => "ndwi",
        }
    }
}

impl FromStr for NdxiKind {
    type Err = MaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "nir_ndvi" | "ndvi" => Ok(NdxiKind::NirNdvi),
            "rg_ndvi" => Ok(NdxiKind::RgNdvi),
            "rb_ndvi" => Ok(NdxiKind::RbNdvi),
            "ndwi" => Ok(NdxiKind::Ndwi),
            other => Err(MaskError::Config(format!("Unknown NDXI feature: {}", other))),
        }
    }
}

impl fmt::Display for NdxiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Window mean of a normalized difference index
#[derive(Debug, Clone)]
pub struct Ndxi {
    kind: NdxiKind,
    windows: Vec<WindowShape>,
}

impl Ndxi {
    pub fn new(kind: NdxiKind, windows: Vec<WindowShape>) -> Self {
        Ndxi { kind, windows }
    }

    pub fn kind(&self) -> NdxiKind {
        self.kind
    }
}

impl Feature for Ndxi {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn windows(&self) -> &[WindowShape] {
        &self.windows
    }

    fn size(&self) -> usize {
        1
    }

    fn compute(&self, window: &Window<'_>, out: &mut [f64]) -> MaskResult<()> {
        let (band_a, band_b) = self.kind.bands();
        let a = window.band(band_a)?;
        let b = window.band(band_b)?;

        let (sum, count) = a.iter().zip(b.iter())
            .filter_map(|(&a, &b)| {
                let total = a + b;
                (total != 0.0).then(|| (a - b) / total)
            })
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

        let slot = out.first_mut()
            .ok_or_else(|| MaskError::Extraction("No output slot for NDXI value".to_string()))?;
        *slot = if count == 0 { f64::NAN } else { sum / count as f64 };

        Ok(())
    }
}
