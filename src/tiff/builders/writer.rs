//! TIFF layout writer
//!
//! Computes where every IFD, external tag array and strip lands, then
//! writes the file front to back. Output is always little-endian. Layout:
//! header, IFDs, external tag data, image data, each block word aligned.

use crate::tiff::ifd::IFD;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::constants::{header, tags};
use crate::utils::{ifd_utils, write_utils};
use log::debug;
use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom, Write};

/// Byte positions of everything the IFD entries point to
struct Layout {
    ifd_offsets: Vec<u64>,
    tag_data_offsets: BTreeMap<(usize, u16), u64>,
    end: u64,
}

/// Handles writing TIFF structures to a seekable sink
pub struct WriterBuilder;

impl WriterBuilder {
    /// Write a complete TIFF into `writer`
    pub fn write<W: Write + Seek>(
        writer: &mut W,
        is_big_tiff: bool,
        ifds: &[IFD],
        image_data: &BTreeMap<usize, Vec<u8>>,
        external_data: &BTreeMap<(usize, u16), Vec<u8>>
    ) -> TiffResult<()> {
        let sorted_ifds = Self::prepare_sorted_ifds(ifds);

        let header_size = if is_big_tiff { header::BIG_TIFF_HEADER_SIZE } else { header::TIFF_HEADER_SIZE };
        let layout = Self::calculate_offsets(&sorted_ifds, external_data, image_data, header_size, is_big_tiff);

        if !is_big_tiff && layout.end > u32::MAX as u64 {
            return Err(TiffError::GenericError(format!(
                "{} bytes do not fit a classic TIFF, BigTIFF is required", layout.end)));
        }
        debug!("TIFF layout: {} IFDs, {} bytes", sorted_ifds.len(), layout.end);

        let first_ifd_offset = layout.ifd_offsets.first().copied().unwrap_or(0);
        Self::write_header(writer, first_ifd_offset, is_big_tiff)?;
        Self::write_ifds(writer, &sorted_ifds, &layout, is_big_tiff)?;
        Self::write_external_data(writer, external_data, &layout.tag_data_offsets)?;
        Self::write_image_data(writer, image_data, &layout.tag_data_offsets)?;

        writer.flush()?;
        Ok(())
    }

    /// IFDs with entries sorted by tag, as TIFF readers require
    fn prepare_sorted_ifds(ifds: &[IFD]) -> Vec<IFD> {
        ifds.iter().map(|ifd| {
            let mut sorted_ifd = ifd.clone();
            sorted_ifd.entries = write_utils::get_unique_sorted_entries(&ifd.entries);
            sorted_ifd
        }).collect()
    }

    fn calculate_offsets(
        sorted_ifds: &[IFD],
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        image_data: &BTreeMap<usize, Vec<u8>>,
        header_size: u64,
        is_big_tiff: bool
    ) -> Layout {
        let mut current_offset = header_size;
        let mut ifd_offsets = Vec::with_capacity(sorted_ifds.len());
        let mut tag_data_offsets = BTreeMap::new();

        for ifd in sorted_ifds {
            ifd_offsets.push(current_offset);
            current_offset += ifd_utils::calculate_ifd_size(ifd.entries.len(), is_big_tiff);
            current_offset = write_utils::align_to_4_bytes(current_offset);
        }

        for (key, data) in external_data {
            tag_data_offsets.insert(*key, current_offset);
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        for (ifd_index, data) in image_data {
            if let Some(ifd) = sorted_ifds.get(*ifd_index) {
                if ifd.has_tag(tags::STRIP_OFFSETS) {
                    tag_data_offsets.insert((*ifd_index, tags::STRIP_OFFSETS), current_offset);
                }
            }
            current_offset = write_utils::align_to_4_bytes(current_offset + data.len() as u64);
        }

        Layout { ifd_offsets, tag_data_offsets, end: current_offset }
    }

    /// Byte order marker, version and the first IFD offset
    fn write_header(writer: &mut (impl Write + Seek), first_ifd_offset: u64, is_big_tiff: bool) -> TiffResult<()> {
        writer.seek(SeekFrom::Start(0))?;
        writer.write_all(&header::LITTLE_ENDIAN_MARKER)?;

        if is_big_tiff {
            writer.write_all(&header::BIG_TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&header::BIGTIFF_OFFSET_SIZE.to_le_bytes())?;
            writer.write_all(&[0u8, 0])?;
            writer.write_all(&first_ifd_offset.to_le_bytes())?;
        } else {
            writer.write_all(&header::TIFF_VERSION.to_le_bytes())?;
            writer.write_all(&(first_ifd_offset as u32).to_le_bytes())?;
        }

        Ok(())
    }

    fn write_ifds(
        writer: &mut (impl Write + Seek),
        sorted_ifds: &[IFD],
        layout: &Layout,
        is_big_tiff: bool
    ) -> TiffResult<()> {
        for (i, ifd) in sorted_ifds.iter().enumerate() {
            let next_ifd_offset = layout.ifd_offsets.get(i + 1).copied().unwrap_or(0);
            writer.seek(SeekFrom::Start(layout.ifd_offsets[i]))?;
            Self::write_ifd(writer, ifd, next_ifd_offset, &layout.tag_data_offsets, i, is_big_tiff)?;
        }

        Ok(())
    }

    fn write_external_data(
        writer: &mut (impl Write + Seek),
        external_data: &BTreeMap<(usize, u16), Vec<u8>>,
        tag_data_offsets: &BTreeMap<(usize, u16), u64>
    ) -> TiffResult<()> {
        for (key, data) in external_data {
            if let Some(offset) = tag_data_offsets.get(key) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    fn write_image_data(
        writer: &mut (impl Write + Seek),
        image_data: &BTreeMap<usize, Vec<u8>>,
        tag_data_offsets: &BTreeMap<(usize, u16), u64>
    ) -> TiffResult<()> {
        for (ifd_index, data) in image_data {
            if let Some(offset) = tag_data_offsets.get(&(*ifd_index, tags::STRIP_OFFSETS)) {
                writer.seek(SeekFrom::Start(*offset))?;
                writer.write_all(data)?;
                write_utils::write_padding(writer, data.len())?;
            }
        }

        Ok(())
    }

    /// Write one IFD: entry count, entries, next IFD offset
    ///
    /// Inline values are written left-justified, which for little-endian
    /// output is the value's own little-endian encoding.
    fn write_ifd(
        writer: &mut (impl Write + Seek),
        ifd: &IFD,
        next_offset: u64,
        tag_offsets: &BTreeMap<(usize, u16), u64>,
        ifd_index: usize,
        is_big_tiff: bool
    ) -> TiffResult<()> {
        match is_big_tiff {
            true => writer.write_all(&(ifd.entries.len() as u64).to_le_bytes())?,
            false => writer.write_all(&(ifd.entries.len() as u16).to_le_bytes())?,
        }

        for entry in &ifd.entries {
            let value_offset = tag_offsets.get(&(ifd_index, entry.tag))
                .copied()
                .unwrap_or(entry.value_offset);

            writer.write_all(&entry.tag.to_le_bytes())?;
            writer.write_all(&entry.field_type.to_le_bytes())?;

            match is_big_tiff {
                true => {
                    writer.write_all(&entry.count.to_le_bytes())?;
                    writer.write_all(&value_offset.to_le_bytes())?;
                },
                false => {
                    writer.write_all(&(entry.count as u32).to_le_bytes())?;
                    writer.write_all(&(value_offset as u32).to_le_bytes())?;
                }
            }
        }

        match is_big_tiff {
            true => writer.write_all(&next_offset.to_le_bytes())?,
            false => writer.write_all(&(next_offset as u32).to_le_bytes())?,
        }

        Ok(())
    }
}
