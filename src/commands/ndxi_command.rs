//! NDXI threshold mask command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::{output_writer, required_arg, resolve_config};
use crate::config::MaskConfig;
use crate::errors::MaskResult;
use crate::generator::FullGenerator;
use crate::image::Image;
use crate::mask::{get_ndxi_mask, MaskStats, MaskWriter};
use crate::utils::logger::Logger;

/// Command thresholding an image's NDXI into a mask GeoTIFF
pub struct NdxiCommand<'a> {
    input_file: String,
    output_file: String,
    config: MaskConfig,
    writer: MaskWriter,
    logger: &'a Logger,
}

impl<'a> NdxiCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> MaskResult<Self> {
        let config = resolve_config(args)?;

        Ok(NdxiCommand {
            input_file: required_arg(args, "input", "input image")?,
            output_file: required_arg(args, "output", "output file path")?,
            writer: output_writer(&config),
            config,
            logger,
        })
    }
}

impl<'a> Command for NdxiCommand<'a> {
    fn execute(&self) -> MaskResult<()> {
        info!("Computing {} mask of {} ({} imagery, step {:?})",
              self.config.feature, self.input_file, self.config.satellite, self.config.step);

        let image = Image::open(&self.input_file, self.config.satellite)?;
        let generator = FullGenerator::new(image, self.config.step)?;
        let mask = get_ndxi_mask(&generator, self.config.feature)?;
        self.writer.write(&mask, &self.output_file)?;

        let summary = format!("{} mask {} -> {}: {}",
                              self.config.feature, self.input_file, self.output_file, MaskStats::from_mask(&mask));
        info!("{}", summary);
        self.logger.log(&summary)?;
        Ok(())
    }
}
