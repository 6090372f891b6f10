//! Utility modules shared across the crate

pub mod logger;
pub(crate) mod progress;
pub(crate) mod write_utils;
pub(crate) mod ifd_utils;
pub(crate) mod format_utils;
pub(crate) mod tag_utils;
