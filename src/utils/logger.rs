//! File-backed logger
//!
//! Serves both as the global `log` backend of the binary (console plus log
//! file) and as a plain run-summary writer used by the facade and commands.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use log::{Log, Record, Metadata, LevelFilter};

/// Logger writing to a file and, as a `log` backend, to the console
pub struct Logger {
    file: Mutex<Option<File>>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger writing to `log_file`, truncating it
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    pub fn new<P: AsRef<Path>>(log_file: P) -> io::Result<Self> {
        Self::with_level(log_file, LevelFilter::Info)
    }

    /// Creates a logger that lets records up to `level` through
    pub fn with_level<P: AsRef<Path>>(log_file: P, level: LevelFilter) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Mutex::new(Some(file)),
            level,
        })
    }

    /// Appends one line to the log file
    pub fn log(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        if let Some(file) = guard.as_mut() {
            writeln!(file, "{}", message)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Installs a logger for `log_file` as the global `log` backend
    pub fn init_global_logger<P: AsRef<Path>>(log_file: P, level: LevelFilter) -> io::Result<()> {
        let global_logger = Logger::with_level(log_file, level)?;

        if log::set_boxed_logger(Box::new(global_logger)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }

        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let _ = Logger::log(self, &message);

            eprintln!("{}", message);
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("maskkit.log");
        let logger = Logger::new(&path).unwrap();

        logger.log("first").unwrap();
        logger.log("second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn test_level_filter() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::with_level(dir.path().join("quiet.log"), LevelFilter::Warn).unwrap();

        let info = Metadata::builder().level(log::Level::Info).build();
        let error = Metadata::builder().level(log::Level::Error).build();
        assert!(!logger.enabled(&info));
        assert!(logger.enabled(&error));
    }
}
