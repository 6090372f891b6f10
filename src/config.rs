//! Runtime configuration
//!
//! Defaults are compiled in from `mask_defaults.toml`. A user TOML file is
//! layered on top key by key, so it only needs the keys it changes.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use log::{debug, warn};
use toml::Value;

use crate::compression::MaskCompression;
use crate::errors::{MaskError, MaskResult};
use crate::features::NdxiKind;
use crate::image::Satellite;

lazy_static! {
    static ref DEFAULT_CONFIG: MaskConfig = {
        let content = include_str!("../mask_defaults.toml");
        MaskConfig::from_toml_str(content, &MaskConfig::fallback()).unwrap_or_else(|e| {
            warn!("Failed to parse built-in defaults: {}", e);
            MaskConfig::fallback()
        })
    };
}

/// Settings for mask generation and output
#[derive(Debug, Clone, PartialEq)]
pub struct MaskConfig {
    /// Band layout of input imagery
    pub satellite: Satellite,
    /// Index used by the NDXI mask
    pub feature: NdxiKind,
    /// Generator step as `(rows, cols)`
    pub step: (usize, usize),
    /// Strip compression of written masks
    pub compression: MaskCompression,
    /// EPSG code attached to written masks
    pub epsg: Option<u32>,
}

impl Default for MaskConfig {
    fn default() -> Self {
        DEFAULT_CONFIG.clone()
    }
}

impl MaskConfig {
    fn fallback() -> Self {
        MaskConfig {
            satellite: Satellite::default(),
            feature: NdxiKind::default(),
            step: (1, 1),
            compression: MaskCompression::default(),
            epsg: None,
        }
    }

    /// Loads a TOML file over the built-in defaults
    pub fn load<P: AsRef<Path>>(path: P) -> MaskResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content, &Self::default())
    }

    /// Parses TOML content, taking missing keys from `base`
    pub fn from_toml_str(content: &str, base: &MaskConfig) -> MaskResult<Self> {
        let value: Value = content.parse()
            .map_err(|e: toml::de::Error| MaskError::Config(e.to_string()))?;
        let mut config = base.clone();

        if let Some(ndxi) = value.get("ndxi") {
            if let Some(name) = string_key(ndxi, "ndxi.satellite")? {
                config.satellite = name.parse()?;
            }
            if let Some(name) = string_key(ndxi, "ndxi.feature")? {
                config.feature = name.parse()?;
            }
            if let Some(rows) = positive_key(ndxi, "ndxi.step_rows")? {
                config.step.0 = rows;
            }
            if let Some(cols) = positive_key(ndxi, "ndxi.step_cols")? {
                config.step.1 = cols;
            }
        }

        if let Some(output) = value.get("output") {
            if let Some(name) = string_key(output, "output.compression")? {
                config.compression = name.parse()
                    .map_err(|e| MaskError::Config(format!("output.compression: {}", e)))?;
            }
            if let Some(code) = positive_key(output, "output.epsg")? {
                let code = u32::try_from(code)
                    .map_err(|_| MaskError::Config(format!("output.epsg out of range: {}", code)))?;
                config.epsg = Some(code);
            }
        }

        Ok(config)
    }
}

/// Value of `table[key]` as a string; `path` is the dotted name used in errors
fn string_key<'a>(table: &'a Value, path: &str) -> MaskResult<Option<&'a str>> {
    let key = path.rsplit('.').next().unwrap_or(path);
    match table.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(MaskError::Config(format!("{} must be a string, got {}", path, other))),
    }
}

/// Value of `table[key]` as a positive integer
fn positive_key(table: &Value, path: &str) -> MaskResult<Option<usize>> {
    let key = path.rsplit('.').next().unwrap_or(path);
    match table.get(key) {
        None => Ok(None),
        Some(Value::Integer(n)) if *n > 0 => Ok(Some(*n as usize)),
        Some(other) => Err(MaskError::Config(format!("{} must be a positive integer, got {}", path, other))),
    }
}
