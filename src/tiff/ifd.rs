//! Image File Directory (IFD) structures
//!
//! An IFD is the tag table describing one raster in a TIFF file. Mask files
//! only ever carry a single IFD, but the structures follow the general
//! format so files written by other tools can be inspected too.

use std::collections::HashMap;
use std::fmt;
use crate::tiff::constants::{field_types, tags};
use log::{debug, trace};
use crate::utils::tag_utils;

/// Represents an Image File Directory (IFD) in a TIFF file
#[derive(Debug, Clone)]
pub struct IFD {
    /// Entries in this IFD, in insertion order
    pub entries: Vec<IFDEntry>,
    /// IFD number (0-based)
    pub number: usize,
    /// Offset to this IFD in the file
    pub offset: u64,
    /// Cached tag values for quick lookup
    tag_map: HashMap<u16, IFDEntry>,
}

/// Represents an entry in an Image File Directory (IFD)
///
/// For values that fit in the entry, `value_offset` holds the value itself;
/// otherwise it is the file offset of the value array.
#[derive(Debug, Clone, PartialEq)]
pub struct IFDEntry {
    /// TIFF tag identifier
    pub tag: u16,
    /// Field type
    pub field_type: u16,
    /// Number of values
    pub count: u64,
    /// Value or offset to values
    pub value_offset: u64,
}

impl IFDEntry {
    /// Creates a new IFD entry
    pub fn new(tag: u16, field_type: u16, count: u64, value_offset: u64) -> Self {
        trace!("New IFD entry: tag={} ({}), type={} ({}), count={}, value/offset={}",
               tag, tag_utils::get_tag_name(tag),
               field_type, tag_utils::get_field_type_name(field_type),
               count, value_offset);

        Self {
            tag,
            field_type,
            count,
            value_offset,
        }
    }

    /// Size in bytes of one value of this entry's field type
    pub fn get_field_type_size(&self) -> usize {
        match self.field_type {
            field_types::BYTE | field_types::ASCII | field_types::SBYTE | field_types::UNDEFINED => 1,
            field_types::SHORT | field_types::SSHORT => 2,
            field_types::LONG | field_types::SLONG | field_types::FLOAT => 4,
            field_types::RATIONAL | field_types::SRATIONAL | field_types::DOUBLE => 8,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => 8,
            _ => {
                debug!("Unknown field type: {}, assuming 1 byte", self.field_type);
                1
            }
        }
    }

    /// Total size in bytes of this entry's values, saturating at `u64::MAX`
    pub fn data_size(&self) -> u64 {
        (self.get_field_type_size() as u64).saturating_mul(self.count)
    }

    /// Whether the values are stored inline in `value_offset`
    pub fn is_value_inline(&self, is_big_tiff: bool) -> bool {
        let inline_size = if is_big_tiff { 8 } else { 4 };
        self.data_size() <= inline_size
    }

    /// Returns a human-readable description of this entry
    pub fn description(&self) -> String {
        format!("Tag: {} ({}), Type: {} ({}), Count: {}, Value/Offset: {}",
                self.tag, tag_utils::get_tag_name(self.tag),
                self.field_type, tag_utils::get_field_type_name(self.field_type),
                self.count, tag_utils::describe_value(self.tag, self.value_offset))
    }
}

impl IFD {
    /// Creates a new, empty IFD
    pub fn new(number: usize, offset: u64) -> Self {
        debug!("Creating new IFD #{} at offset {}", number, offset);

        Self {
            entries: Vec::new(),
            number,
            offset,
            tag_map: HashMap::new(),
        }
    }

    /// Adds an entry, replacing any existing entry with the same tag
    pub fn add_entry(&mut self, entry: IFDEntry) {
        trace!("Adding entry to IFD #{}: {}", self.number, entry.description());

        self.entries.retain(|e| e.tag != entry.tag);
        self.tag_map.insert(entry.tag, entry.clone());
        self.entries.push(entry);
    }

    /// Gets a tag value (value_offset) directly
    pub fn get_tag_value(&self, tag: u16) -> Option<u64> {
        self.tag_map.get(&tag).map(|entry| entry.value_offset)
    }

    /// Checks if this IFD has a specific tag
    pub fn has_tag(&self, tag: u16) -> bool {
        self.tag_map.contains_key(&tag)
    }

    /// Gets an IFD entry by tag
    pub fn get_entry(&self, tag: u16) -> Option<&IFDEntry> {
        self.tag_map.get(&tag)
    }

    /// Width and height of the raster, if both tags are present
    pub fn get_dimensions(&self) -> Option<(u64, u64)> {
        let width = self.get_tag_value(tags::IMAGE_WIDTH)?;
        let height = self.get_tag_value(tags::IMAGE_LENGTH)?;
        Some((width, height))
    }

    /// Number of samples per pixel (1 when the tag is missing)
    pub fn get_samples_per_pixel(&self) -> u64 {
        self.get_tag_value(tags::SAMPLES_PER_PIXEL).unwrap_or(1)
    }

    /// Bits per sample (1 when the tag is missing, per the TIFF default)
    ///
    /// Multi-sample images store an offset here instead of a value; callers
    /// check the sample count first.
    pub fn get_bits_per_sample(&self) -> u64 {
        self.get_tag_value(tags::BITS_PER_SAMPLE).unwrap_or(1)
    }

    /// Compression code (1 = none when the tag is missing)
    pub fn get_compression(&self) -> u64 {
        self.get_tag_value(tags::COMPRESSION).unwrap_or(1)
    }

    /// Whether this IFD carries any georeferencing tags
    pub fn is_georeferenced(&self) -> bool {
        self.has_tag(tags::MODEL_TRANSFORMATION_TAG)
            || (self.has_tag(tags::MODEL_PIXEL_SCALE_TAG) && self.has_tag(tags::MODEL_TIEPOINT_TAG))
    }

    /// Gets the number of entries in this IFD
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for IFD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IFD #{} (offset: {})", self.number, self.offset)?;
        writeln!(f, "  Number of entries: {}", self.entries.len())?;

        if let Some((width, height)) = self.get_dimensions() {
            writeln!(f, "  Dimensions: {}x{}", width, height)?;
        }

        writeln!(f, "  Samples per pixel: {}", self.get_samples_per_pixel())?;
        writeln!(f, "  Tags:")?;
        for entry in &self.entries {
            writeln!(f, "    {} ({}): {} [{}]",
                     entry.tag,
                     tag_utils::get_tag_name(entry.tag),
                     tag_utils::describe_value(entry.tag, entry.value_offset),
                     tag_utils::get_field_type_name(entry.field_type))?;
        }

        Ok(())
    }
}
