//! Band names and per-satellite band layouts

use std::fmt;
use std::str::FromStr;

use crate::errors::MaskError;

/// Spectral band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Blue,
    Green,
    Red,
    Nir,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Blue => "blue",
            Band::Green => "green",
            Band::Red => "red",
            Band::Nir => "nir",
        };
        f.write_str(name)
    }
}

/// Storage order of the bands in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandOrder(Vec<Band>);

impl BandOrder {
    pub fn new(bands: Vec<Band>) -> Self {
        BandOrder(bands)
    }

    /// Storage index of a band
    pub fn index_of(&self, band: Band) -> Option<usize> {
        self.0.iter().position(|b| *b == band)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Known sensors and their band layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Satellite {
    /// Blue, green, red, NIR
    #[default]
    Quickbird,
    /// Red, green, blue, NIR
    Pleiades,
    /// Red, green, blue
    Rgb,
}

impl Satellite {
    pub fn band_order(&self) -> BandOrder {
        match self {
            Satellite::Quickbird => BandOrder::new(vec![Band::Blue, Band::Green, Band::Red, Band::Nir]),
            Satellite::Pleiades => BandOrder::new(vec![Band::Red, Band::Green, Band::Blue, Band::Nir]),
            Satellite::Rgb => BandOrder::new(vec![Band::Red, Band::Green, Band::Blue]),
        }
    }
}

impl FromStr for Satellite {
    type Err = MaskError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.trim().to_lowercase().as_str() {
            "quickbird" | "worldview" => Ok(Satellite::Quickbird),
            "pleiades" => Ok(Satellite::Pleiades),
            "rgb" => Ok(Satellite::Rgb),
            other => Err(MaskError::Config(format!("Unknown satellite: {}", other))),
        }
    }
}

impl fmt::Display for Satellite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Satellite::Quickbird => "quickbird",
            Satellite::Pleiades => "pleiades",
            Satellite::Rgb => "rgb",
        };
        f.write_str(name)
    }
}
