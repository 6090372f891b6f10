//! Baseline TIFF tag strategies
//!
//! Dimensions, sample layout and strip tags for single-band 8-bit masks.

use std::collections::BTreeMap;

use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::constants::{tags, field_types, photometric, planar_config, sample_format};
use log::{debug, info};

/// Adds baseline TIFF tags to an IFD
pub struct BasicTagsBuilder;

impl BasicTagsBuilder {
    /// Add the tags describing an 8-bit single-band mask
    ///
    /// # Arguments
    /// * `width` - Number of columns
    /// * `height` - Number of rows
    /// * `compression_code` - TIFF Compression tag value of the strip
    /// * `max_value` - Largest pixel value present, recorded as MaxSampleValue
    pub fn add_mask_tags(
        ifd: &mut IFD,
        width: u32,
        height: u32,
        compression_code: u16,
        max_value: u8
    ) {
        info!("Adding mask tags for {}x{} raster, compression {}", width, height, compression_code);

        ifd.add_entry(IFDEntry::new(tags::IMAGE_WIDTH, field_types::LONG, 1, width as u64));
        ifd.add_entry(IFDEntry::new(tags::IMAGE_LENGTH, field_types::LONG, 1, height as u64));
        ifd.add_entry(IFDEntry::new(tags::BITS_PER_SAMPLE, field_types::SHORT, 1, 8));
        ifd.add_entry(IFDEntry::new(tags::COMPRESSION, field_types::SHORT, 1, compression_code as u64));

        // 0 renders black, set pixels render as the darkest non-black grey
        ifd.add_entry(IFDEntry::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            field_types::SHORT,
            1,
            photometric::BLACK_IS_ZERO as u64)
        );

        ifd.add_entry(IFDEntry::new(tags::SAMPLES_PER_PIXEL, field_types::SHORT, 1, 1));
        ifd.add_entry(IFDEntry::new(tags::PLANAR_CONFIGURATION, field_types::SHORT, 1, planar_config::CHUNKY as u64));
        ifd.add_entry(IFDEntry::new(tags::SAMPLE_FORMAT, field_types::SHORT, 1, sample_format::UNSIGNED as u64));
        ifd.add_entry(IFDEntry::new(tags::MIN_SAMPLE_VALUE, field_types::SHORT, 1, 0));
        ifd.add_entry(IFDEntry::new(tags::MAX_SAMPLE_VALUE, field_types::SHORT, 1, max_value as u64));
    }

    /// Set up a single strip holding the whole (possibly compressed) raster
    ///
    /// StripOffsets is a placeholder until the writer lays out the file.
    pub fn setup_single_strip(
        ifd: &mut IFD,
        image_data: &mut BTreeMap<usize, Vec<u8>>,
        ifd_index: usize,
        strip_data: Vec<u8>,
        is_big_tiff: bool
    ) {
        debug!("Setting up single strip: {} bytes", strip_data.len());

        let offset_type = if is_big_tiff { field_types::LONG8 } else { field_types::LONG };

        ifd.add_entry(IFDEntry::new(tags::STRIP_OFFSETS, offset_type, 1, 0));
        ifd.add_entry(IFDEntry::new(
            tags::STRIP_BYTE_COUNTS,
            offset_type,
            1,
            strip_data.len() as u64)
        );

        if let Some((_, height)) = ifd.get_dimensions() {
            ifd.add_entry(IFDEntry::new(tags::ROWS_PER_STRIP, field_types::LONG, 1, height));
        }

        image_data.insert(ifd_index, strip_data);
    }
}
