//! Coordinate reference systems identified by EPSG code

use crate::tiff::constants::model_type;

/// Identifier for common coordinate systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateSystem {
    /// WGS 84 (EPSG:4326)
    WGS84,
    /// Web Mercator (EPSG:3857)
    WebMercator,
    /// UTM zone on WGS 84 (EPSG:326xx north, 327xx south)
    UTM(u8, bool),
    /// Another geographic (lat/lon) system
    Geographic(u32),
    /// Another projected system
    Projected(u32),
}

impl CoordinateSystem {
    /// Classifies an EPSG code
    ///
    /// Codes 4000-4999 are treated as geographic, everything else as projected.
    pub fn from_epsg(epsg: u32) -> Self {
        match epsg {
            4326 => CoordinateSystem::WGS84,
            3857 => CoordinateSystem::WebMercator,
            32601..=32660 => CoordinateSystem::UTM((epsg - 32600) as u8, true),
            32701..=32760 => CoordinateSystem::UTM((epsg - 32700) as u8, false),
            4000..=4999 => CoordinateSystem::Geographic(epsg),
            _ => CoordinateSystem::Projected(epsg),
        }
    }

    /// Get the EPSG code for this coordinate system
    pub fn epsg_code(&self) -> u32 {
        match self {
            CoordinateSystem::WGS84 => 4326,
            CoordinateSystem::WebMercator => 3857,
            CoordinateSystem::UTM(zone, true) => 32600 + *zone as u32,
            CoordinateSystem::UTM(zone, false) => 32700 + *zone as u32,
            CoordinateSystem::Geographic(code) | CoordinateSystem::Projected(code) => *code,
        }
    }

    /// Whether coordinates are latitude/longitude
    pub fn is_geographic(&self) -> bool {
        matches!(self, CoordinateSystem::WGS84 | CoordinateSystem::Geographic(_))
    }

    /// GTModelTypeGeoKey value for this system
    pub fn model_type(&self) -> u16 {
        if self.is_geographic() {
            model_type::GEOGRAPHIC
        } else {
            model_type::PROJECTED
        }
    }

    /// Get a description of this coordinate system
    pub fn description(&self) -> String {
        match self {
            CoordinateSystem::WGS84 => "WGS 84 (EPSG:4326)".to_string(),
            CoordinateSystem::WebMercator => "Web Mercator (EPSG:3857)".to_string(),
            CoordinateSystem::UTM(zone, true) => format!("UTM Zone {}N (EPSG:{})", zone, self.epsg_code()),
            CoordinateSystem::UTM(zone, false) => format!("UTM Zone {}S (EPSG:{})", zone, self.epsg_code()),
            CoordinateSystem::Geographic(code) | CoordinateSystem::Projected(code) => format!("EPSG:{}", code),
        }
    }
}
