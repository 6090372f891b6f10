//! Low-level binary I/O shared by the TIFF and shapefile readers

pub mod seekable;
pub mod byte_order;
