//! Command pattern interfaces

use crate::errors::MaskResult;
use crate::utils::logger::Logger;

/// An executable CLI operation
pub trait Command {
    /// Run the command to completion
    fn execute(&self) -> MaskResult<()>;
}

/// Builds the command matching a set of CLI arguments
pub trait CommandFactory<'a> {
    /// Create a command from parsed arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `logger` - Run-summary log shared by all commands
    fn create_command(&self, args: &clap::ArgMatches, logger: &'a Logger) -> MaskResult<Box<dyn Command + 'a>>;
}
