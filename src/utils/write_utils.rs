//! TIFF writing utilities
//!
//! Alignment, tag ordering and value packing helpers used by the builders.

use std::collections::BTreeMap;
use std::io::Write;

use crate::tiff::errors::TiffResult;
use crate::tiff::ifd::{IFD, IFDEntry};

/// Rounds an offset up to the next 4-byte boundary
pub fn align_to_4_bytes(offset: u64) -> u64 {
    offset + calculate_padding(offset as usize) as u64
}

/// Padding needed after `data_len` bytes to reach a 4-byte boundary
pub fn calculate_padding(data_len: usize) -> usize {
    (4 - (data_len % 4)) % 4
}

/// Writes the zero bytes that follow a block of `data_len` bytes
pub fn write_padding(writer: &mut impl Write, data_len: usize) -> TiffResult<()> {
    let padding = calculate_padding(data_len);
    if padding > 0 {
        writer.write_all(&[0u8; 4][..padding])?;
    }
    Ok(())
}

/// IFD entries sorted by tag with duplicates removed (last one wins)
pub fn get_unique_sorted_entries(entries: &[IFDEntry]) -> Vec<IFDEntry> {
    let unique: BTreeMap<u16, &IFDEntry> = entries.iter()
        .map(|entry| (entry.tag, entry))
        .collect();

    unique.into_values().cloned().collect()
}

/// Little-endian bytes of a SHORT array
pub fn shorts_to_le_bytes(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Little-endian bytes of a DOUBLE array
pub fn doubles_to_le_bytes(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Adds a tag whose values live outside the IFD
///
/// The entry's offset is a placeholder; the writer fills in the real
/// position of `data` once the file layout is known.
pub fn create_external_tag(
    ifd: &mut IFD,
    external_data: &mut BTreeMap<(usize, u16), Vec<u8>>,
    ifd_index: usize,
    tag: u16,
    field_type: u16,
    count: u64,
    data: Vec<u8>
) {
    ifd.add_entry(IFDEntry::new(tag, field_type, count, 0));
    external_data.insert((ifd_index, tag), data);
}
