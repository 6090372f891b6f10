//! Strip-based pixel extraction
//!
//! Reads every strip of a single-band 8-bit raster, decompresses it and
//! undoes horizontal differencing, yielding the row-major pixel plane.

use log::{debug, info};
use std::io::SeekFrom;

use crate::compression::{CompressionFactory, CompressionHandler};
use crate::io::seekable::SeekableReader;
use crate::tiff::constants::{predictor, tags};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;
use crate::tiff::TiffReader;
use crate::tiff::validation;

/// Reads pixel data from stripped TIFF files
pub struct StripReader<'a, R: SeekableReader> {
    /// Reader for accessing the TIFF file
    reader: &'a mut R,
    /// IFD containing the image metadata
    ifd: &'a IFD,
    /// TIFF reader for accessing tag values
    tiff_reader: &'a TiffReader,
}

impl<'a, R: SeekableReader> StripReader<'a, R> {
    /// Create a new strip reader
    ///
    /// # Arguments
    /// * `reader` - Seekable reader for the TIFF file
    /// * `ifd` - IFD containing the image metadata
    /// * `tiff_reader` - TIFF reader that parsed `ifd`, used for tag arrays
    pub fn new(reader: &'a mut R, ifd: &'a IFD, tiff_reader: &'a TiffReader) -> Self {
        StripReader {
            reader,
            ifd,
            tiff_reader
        }
    }

    /// Checks that the raster is one 8-bit sample per pixel
    fn check_sample_layout(&self) -> TiffResult<()> {
        let samples_per_pixel = self.ifd.get_samples_per_pixel();
        // With several samples, BitsPerSample is an array offset, not a value
        let bits_per_sample = if samples_per_pixel == 1 { self.ifd.get_bits_per_sample() } else { 0 };

        if samples_per_pixel != 1 || bits_per_sample != 8 {
            return Err(TiffError::UnsupportedSampleLayout { bits_per_sample, samples_per_pixel });
        }

        if self.ifd.has_tag(tags::TILE_OFFSETS) {
            return Err(TiffError::GenericError("Tiled TIFFs are not supported".to_string()));
        }

        Ok(())
    }

    /// Read, decompress and de-predict one strip
    fn read_strip(
        &mut self,
        offset: u64,
        byte_count: u64,
        compression_handler: &dyn CompressionHandler,
        file_size: u64
    ) -> TiffResult<Vec<u8>> {
        validation::validate_data_block(offset, byte_count, file_size)?;

        self.reader.seek(SeekFrom::Start(offset))?;
        let mut compressed_data = vec![0u8; byte_count as usize];
        self.reader.read_exact(&mut compressed_data)?;

        compression_handler.decompress(&compressed_data)
    }

    /// Extract the whole raster as `height` rows of `width` bytes
    pub fn extract(&mut self) -> TiffResult<Vec<u8>> {
        self.check_sample_layout()?;

        let (width, height) = self.ifd.get_dimensions()
            .ok_or(TiffError::MissingDimensions)?;
        let (width, height) = (width as usize, height as usize);

        let rows_per_strip = self.ifd.get_tag_value(tags::ROWS_PER_STRIP)
            .map(|rows| rows as usize)
            .unwrap_or(height)
            .clamp(1, height.max(1));

        let compression_handler = CompressionFactory::create_handler(self.ifd.get_compression())?;
        let predictor = self.ifd.get_tag_value(tags::PREDICTOR).unwrap_or(predictor::NONE as u64);
        info!("Reading {}x{} strips, {} rows each, compression: {}",
              width, height, rows_per_strip, compression_handler.name());

        let strip_offsets = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::STRIP_OFFSETS)?;
        let strip_byte_counts = self.tiff_reader.read_tag_values(&mut *self.reader, self.ifd, tags::STRIP_BYTE_COUNTS)?;

        let expected_strips = height.div_ceil(rows_per_strip);
        if strip_offsets.len() < expected_strips || strip_byte_counts.len() < expected_strips {
            return Err(TiffError::GenericError(format!(
                "Expected {} strips, found {} offsets and {} byte counts",
                expected_strips, strip_offsets.len(), strip_byte_counts.len())));
        }

        let total = width.checked_mul(height)
            .ok_or_else(|| TiffError::GenericError(format!(
                "Raster of {}x{} pixels cannot be addressed", width, height)))?;

        let file_size = validation::get_file_size(&mut *self.reader)?;
        // Declared dimensions are untrusted until the strips are read
        let capacity = usize::try_from(file_size).map_or(total, |size| total.min(size));
        let mut pixels = Vec::with_capacity(capacity);

        for strip_idx in 0..expected_strips {
            let rows = rows_per_strip.min(height - strip_idx * rows_per_strip);
            let expected = rows * width;

            debug!("Reading strip {} at offset {} with {} bytes",
                   strip_idx, strip_offsets[strip_idx], strip_byte_counts[strip_idx]);

            let mut strip_data = self.read_strip(
                strip_offsets[strip_idx],
                strip_byte_counts[strip_idx],
                &*compression_handler,
                file_size
            )?;

            // The last strip may be stored padded to a full strip
            if strip_data.len() < expected {
                return Err(TiffError::StripSizeMismatch { expected, actual: strip_data.len() });
            }
            strip_data.truncate(expected);

            if predictor == predictor::HORIZONTAL_DIFFERENCING as u64 {
                apply_horizontal_predictor(&mut strip_data, width);
            }

            pixels.extend_from_slice(&strip_data);
        }

        Ok(pixels)
    }
}

/// Undo horizontal differencing on 8-bit single-sample rows
pub fn apply_horizontal_predictor(data: &mut [u8], width: usize) {
    if width == 0 {
        return;
    }

    for row in data.chunks_mut(width) {
        for x in 1..row.len() {
            row[x] = row[x].wrapping_add(row[x - 1]);
        }
    }
}
