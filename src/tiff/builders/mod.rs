//! TIFF builder strategy modules
//!
//! Strategy implementations used by [`TiffBuilder`](crate::tiff::TiffBuilder),
//! organized by tag category, plus the file layout writer.

pub mod basic_tags;
pub mod geo_tags;
pub mod writer;
