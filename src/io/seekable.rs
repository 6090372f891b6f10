//! Seekable reader trait
//!
//! The TIFF reader and the shapefile parser both jump around in the file
//! (IFD chains, strip offsets, record framing), so they take readers that
//! can read and seek.

use std::io::{Read, Seek};

/// Trait for readers that can both read and seek
pub trait SeekableReader: Read + Seek + Send + Sync {}

// Blanket implementation for any type that implements the required traits
impl<T: Read + Seek + Send + Sync> SeekableReader for T {}
