//! Shapefile rasterization command

use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::Command;
use crate::commands::{output_writer, parse_pair, required_arg, resolve_config};
use crate::coordinate::GeoTransform;
use crate::errors::MaskResult;
use crate::mask::{load_mask_from_shapefile, MaskStats, MaskWriter};
use crate::utils::logger::Logger;

/// Command rasterizing a shapefile's polygons into a mask GeoTIFF
///
/// The output carries the grid's geotransform.
pub struct ShapefileCommand<'a> {
    input_file: String,
    output_file: String,
    shape: (usize, usize),
    transform: GeoTransform,
    writer: MaskWriter,
    logger: &'a Logger,
}

impl<'a> ShapefileCommand<'a> {
    pub fn new(args: &ArgMatches, logger: &'a Logger) -> MaskResult<Self> {
        let config = resolve_config(args)?;
        let shape = parse_pair(&required_arg(args, "shape", "--shape rows,cols")?, "shape")?;
        let transform = GeoTransform::parse_gdal(&required_arg(args, "transform", "--transform c,a,b,f,d,e")?)?;

        Ok(ShapefileCommand {
            input_file: required_arg(args, "input", "input shapefile")?,
            output_file: required_arg(args, "output", "output file path")?,
            shape,
            transform,
            writer: output_writer(&config).geotransform(transform),
            logger,
        })
    }
}

impl<'a> Command for ShapefileCommand<'a> {
    fn execute(&self) -> MaskResult<()> {
        info!("Rasterizing {} onto {}x{} grid", self.input_file, self.shape.0, self.shape.1);

        let mask = load_mask_from_shapefile(&self.input_file, self.shape, &self.transform)?;
        self.writer.write(&mask, &self.output_file)?;

        let summary = format!("Rasterized {} -> {}: {}", self.input_file, self.output_file, MaskStats::from_mask(&mask));
        info!("{}", summary);
        self.logger.log(&summary)?;
        Ok(())
    }
}
