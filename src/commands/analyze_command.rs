//! Mask GeoTIFF analysis command
//!
//! Reports the TIFF structure of a mask file, its georeferencing and how
//! many pixels are set.

use std::path::Path;

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::required_arg;
use crate::coordinate::CoordinateSystem;
use crate::errors::MaskResult;
use crate::mask::{read_mask_geotiff, MaskStats};
use crate::tiff::TiffReader;
use crate::utils::logger::Logger;
use crate::utils::tag_utils;

/// Command for analyzing a mask file
pub struct AnalyzeCommand<'a> {
    /// Path to the input file
    input_file: String,
    /// List every IFD entry
    verbose: bool,
    /// Run-summary log
    logger: &'a Logger,
}

impl<'a> AnalyzeCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> MaskResult<Self> {
        Ok(AnalyzeCommand {
            input_file: required_arg(args, "input", "input file")?,
            verbose: args.get_flag("verbose"),
            logger,
        })
    }
}

impl<'a> Command for AnalyzeCommand<'a> {
    fn execute(&self) -> MaskResult<()> {
        info!("Analyzing {}", self.input_file);
        let report = analysis_report(&self.input_file, self.verbose)?;

        println!("{}", report);
        self.logger.log(&report)?;
        Ok(())
    }
}

/// Text report of a mask file's structure, georeferencing and coverage
///
/// # Arguments
/// * `path` - Mask GeoTIFF to analyze
/// * `verbose` - Include every IFD entry of the first IFD
pub fn analysis_report<P: AsRef<Path>>(path: P, verbose: bool) -> MaskResult<String> {
    let path = path.as_ref();
    let tiff = TiffReader::new().load(path)?;
    let mask = read_mask_geotiff(path)?;

    let mut lines = vec![
        format!("Mask analysis: {}", path.display()),
        format!("  Format: {} ({})", if tiff.is_big_tiff { "BigTIFF" } else { "TIFF" }, tiff.byte_order.name()),
        format!("  IFDs: {}", tiff.ifd_count()),
        format!("  Compression: {}", tag_utils::describe_value(crate::tiff::constants::tags::COMPRESSION, mask.compression)),
    ];

    if verbose {
        if let Some(ifd) = tiff.main_ifd() {
            lines.extend(ifd.entries.iter().map(|entry| format!("    {}", entry.description())));
        }
    }

    match &mask.geotransform {
        Some(transform) => lines.push(format!("  Geotransform: {}", transform)),
        None => lines.push("  Geotransform: none".to_string()),
    }
    match mask.epsg {
        Some(code) => lines.push(format!("  CRS: {}", CoordinateSystem::from_epsg(code).description())),
        None => lines.push("  CRS: none".to_string()),
    }

    lines.push(format!("  {}", MaskStats::from_mask(&mask.pixels)));
    Ok(lines.join("\n"))
}
