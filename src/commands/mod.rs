//! CLI command implementations
//!
//! One command per mask operation, selected from the CLI flags by
//! [`MaskkitCommandFactory`]. Settings come from the built-in defaults,
//! then `--config`, then individual flags.

pub mod command_traits;
pub mod analyze_command;
pub mod convert_command;
pub mod shapefile_command;
pub mod ndxi_command;

pub use command_traits::{Command, CommandFactory};
pub use analyze_command::AnalyzeCommand;
pub use convert_command::ConvertCommand;
pub use shapefile_command::ShapefileCommand;
pub use ndxi_command::NdxiCommand;

use clap::ArgMatches;
use log::debug;

use crate::config::MaskConfig;
use crate::errors::{MaskError, MaskResult};
use crate::mask::MaskWriter;
use crate::utils::logger::Logger;

/// Picks the command for the given CLI flags, analysis by default
#[derive(Default)]
pub struct MaskkitCommandFactory;

impl MaskkitCommandFactory {
    pub fn new() -> Self {
        MaskkitCommandFactory
    }
}

impl<'a> CommandFactory<'a> for MaskkitCommandFactory {
    fn create_command(&self, args: &ArgMatches, logger: &'a Logger) -> MaskResult<Box<dyn Command + 'a>> {
        if args.get_flag("shapefile") {
            Ok(Box::new(ShapefileCommand::new(args, logger)?))
        } else if args.get_flag("ndxi") {
            Ok(Box::new(NdxiCommand::new(args, logger)?))
        } else if args.get_flag("convert") {
            Ok(Box::new(ConvertCommand::new(args, logger)?))
        } else {
            Ok(Box::new(AnalyzeCommand::new(args, logger)?))
        }
    }
}

/// Settings from defaults, `--config` and flags, in increasing precedence
pub fn resolve_config(args: &ArgMatches) -> MaskResult<MaskConfig> {
    let mut config = match args.get_one::<String>("config") {
        Some(path) => MaskConfig::load(path)?,
        None => MaskConfig::default(),
    };

    if let Some(name) = args.get_one::<String>("satellite") {
        config.satellite = name.parse()?;
    }
    if let Some(name) = args.get_one::<String>("feature") {
        config.feature = name.parse()?;
    }
    if let Some(step) = args.get_one::<String>("step") {
        config.step = parse_pair(step, "step")?;
        if config.step.0 == 0 || config.step.1 == 0 {
            return Err(MaskError::Config(format!("Step must be positive: {}", step)));
        }
    }
    if let Some(name) = args.get_one::<String>("compression-name") {
        config.compression = name.parse()
            .map_err(|e| MaskError::Config(format!("{}", e)))?;
    }
    if let Some(code) = args.get_one::<String>("epsg") {
        let code = code.trim().parse::<u32>()
            .map_err(|_| MaskError::Config(format!("Invalid EPSG code: {}", code)))?;
        config.epsg = Some(code);
    }

    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

/// Mask writer carrying the configured compression and EPSG code
pub fn output_writer(config: &MaskConfig) -> MaskWriter {
    let writer = MaskWriter::new().compression(config.compression);
    match config.epsg {
        Some(code) => writer.epsg(code),
        None => writer,
    }
}

/// Value of a required string argument
pub(crate) fn required_arg(args: &ArgMatches, name: &str, purpose: &str) -> MaskResult<String> {
    args.get_one::<String>(name)
        .cloned()
        .ok_or_else(|| MaskError::Config(format!("Missing {}", purpose)))
}

/// Parses `"a,b"` into two unsigned integers
pub fn parse_pair(text: &str, what: &str) -> MaskResult<(usize, usize)> {
    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    let invalid = || MaskError::Config(format!("Invalid {} '{}', expected two comma-separated integers", what, text));

    match parts.as_slice() {
        [a, b] => Ok((a.parse().map_err(|_| invalid())?, b.parse().map_err(|_| invalid())?)),
        _ => Err(invalid()),
    }
}
