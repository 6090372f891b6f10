use std::process;
use log::{error, LevelFilter};

use maskkit::cli::build_cli;
use maskkit::commands::{CommandFactory, MaskkitCommandFactory};
use maskkit::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };
    if let Err(e) = Logger::init_global_logger("maskkit-global.log", level) {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let log_file = matches.get_one::<String>("log-file").map(String::as_str).unwrap_or("maskkit.log");
    let logger = match Logger::new(log_file) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    let factory = MaskkitCommandFactory::new();
    match factory.create_command(&matches, &logger) {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            process::exit(1);
        }
    };
}
