//! Image to mask GeoTIFF conversion command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::{output_writer, required_arg, resolve_config};
use crate::errors::MaskResult;
use crate::mask::{load_mask_from_file, MaskStats, MaskWriter};
use crate::utils::logger::Logger;

/// Command decoding any image as a mask and saving it as GeoTIFF
pub struct ConvertCommand<'a> {
    input_file: String,
    output_file: String,
    writer: MaskWriter,
    logger: &'a Logger,
}

impl<'a> ConvertCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> MaskResult<Self> {
        let config = resolve_config(args)?;

        Ok(ConvertCommand {
            input_file: required_arg(args, "input", "input file")?,
            output_file: required_arg(args, "output", "output file path for conversion")?,
            writer: output_writer(&config),
            logger,
        })
    }
}

impl<'a> Command for ConvertCommand<'a> {
    fn execute(&self) -> MaskResult<()> {
        info!("Converting {} to mask GeoTIFF {}", self.input_file, self.output_file);

        let mask = load_mask_from_file(&self.input_file)?;
        self.writer.write(&mask, &self.output_file)?;

        let summary = format!("Converted {} -> {}: {}", self.input_file, self.output_file, MaskStats::from_mask(&mask));
        info!("{}", summary);
        self.logger.log(&summary)?;
        Ok(())
    }
}
