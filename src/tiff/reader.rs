//! TIFF file reader
//!
//! Reads the header and the IFD chain of TIFF and BigTIFF files in either
//! byte order. Pixel data is left on disk; the mask extractor pulls strips
//! through [`TiffReader::read_tag_values`].

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufReader, SeekFrom};
use std::path::Path;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::{ByteOrder, ByteOrderHandler};
use crate::tiff::constants::field_types;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::{IFD, IFDEntry};
use crate::tiff::types::TIFF;
use crate::tiff::validation;
use crate::utils::format_utils;
use crate::utils::ifd_utils;
use crate::utils::tag_utils;

/// Upper bound on IFDs followed in a chain, guards against offset loops
const MAX_IFDS: usize = 100;

/// Reader for TIFF and BigTIFF files
pub struct TiffReader {
    /// Byte order of the current file
    byte_order: Option<ByteOrder>,
    /// Handler matching `byte_order`
    byte_order_handler: Option<Box<dyn ByteOrderHandler>>,
    /// Whether currently reading BigTIFF format
    is_big_tiff: bool,
}

impl Default for TiffReader {
    fn default() -> Self {
        Self::new()
    }
}

impl TiffReader {
    /// Creates a new TIFF reader
    pub fn new() -> Self {
        TiffReader {
            byte_order: None,
            byte_order_handler: None,
            is_big_tiff: false,
        }
    }

    fn handler(&self) -> TiffResult<&dyn ByteOrderHandler> {
        self.byte_order_handler.as_deref()
            .ok_or_else(|| TiffError::GenericError("Byte order not yet determined".to_string()))
    }

    /// Opens a TIFF file and reads its structure
    pub fn load<P: AsRef<Path>>(&mut self, filepath: P) -> TiffResult<TIFF> {
        let path = filepath.as_ref();
        info!("Loading TIFF file: {}", path.display());

        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(1024 * 1024, file);

        self.read(&mut reader)
    }

    /// Reads the header and every IFD from the given reader
    pub fn read(&mut self, reader: &mut dyn SeekableReader) -> TiffResult<TIFF> {
        reader.seek(SeekFrom::Start(0))?;

        let (byte_order, handler) = format_utils::detect_byte_order(reader)?;
        self.is_big_tiff = format_utils::detect_tiff_format(reader, handler.as_ref())?;
        self.byte_order = Some(byte_order);
        self.byte_order_handler = Some(handler);

        let first_ifd_offset = ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?)?;
        debug!("First IFD offset: {}", first_ifd_offset);

        let file_size = validation::get_file_size(reader)?;
        validation::validate_ifd_offset(first_ifd_offset, file_size)?;

        let mut tiff = TIFF::new(self.is_big_tiff, byte_order);
        tiff.ifds = self.read_ifd_chain(reader, first_ifd_offset, file_size)?;

        info!("Read {} IFDs from TIFF file", tiff.ifds.len());
        Ok(tiff)
    }

    /// Follows the IFD chain starting at `first_ifd_offset`
    ///
    /// A broken link after the first IFD ends the chain with a warning; a
    /// broken first IFD is an error.
    fn read_ifd_chain(&self, reader: &mut dyn SeekableReader, first_ifd_offset: u64, file_size: u64) -> TiffResult<Vec<IFD>> {
        let mut ifds: Vec<IFD> = Vec::new();
        let mut ifd_offset = first_ifd_offset;

        while ifd_offset != 0 && ifds.len() < MAX_IFDS {
            let ifd = match self.read_ifd(reader, ifd_offset, ifds.len()) {
                Ok(ifd) => ifd,
                Err(e) if ifds.is_empty() => return Err(e),
                Err(e) => {
                    warn!("Error reading IFD {}: {}", ifds.len(), e);
                    break;
                }
            };

            // read_ifd leaves the reader right after the last entry
            let next_ifd_offset = match ifd_utils::read_ifd_offset(reader, self.is_big_tiff, self.handler()?) {
                Ok(offset) => offset,
                Err(e) => {
                    warn!("Error reading next IFD offset: {}", e);
                    ifds.push(ifd);
                    break;
                }
            };

            ifds.push(ifd);

            if next_ifd_offset != 0 && validation::validate_ifd_offset(next_ifd_offset, file_size).is_err() {
                warn!("Invalid next IFD offset: {}, stopping IFD chain", next_ifd_offset);
                break;
            }
            ifd_offset = next_ifd_offset;
        }

        Ok(ifds)
    }

    /// Reads one IFD located at `offset`
    pub fn read_ifd(&self, reader: &mut dyn SeekableReader, offset: u64, number: usize) -> TiffResult<IFD> {
        reader.seek(SeekFrom::Start(offset))?;
        let handler = self.handler()?;

        let entry_count = if self.is_big_tiff {
            handler.read_u64(reader)?
        } else {
            handler.read_u16(reader)? as u64
        };
        debug!("IFD #{} at {} has {} entries", number, offset, entry_count);

        let mut ifd = IFD::new(number, offset);
        for _ in 0..entry_count {
            let entry = self.read_ifd_entry(reader, handler)?;
            ifd.add_entry(entry);
        }

        Ok(ifd)
    }

    /// Reads a single IFD entry
    ///
    /// Single inline values are normalized so `value_offset` holds the value
    /// itself regardless of byte order or field width.
    fn read_ifd_entry(&self, reader: &mut dyn SeekableReader, handler: &dyn ByteOrderHandler) -> TiffResult<IFDEntry> {
        let tag = handler.read_u16(reader)?;
        let field_type = handler.read_u16(reader)?;
        let (count, raw_value) = if self.is_big_tiff {
            (handler.read_u64(reader)?, handler.read_u64(reader)?)
        } else {
            (handler.read_u32(reader)? as u64, handler.read_u32(reader)? as u64)
        };

        let mut entry = IFDEntry::new(tag, field_type, count, raw_value);
        if count == 1 && entry.is_value_inline(self.is_big_tiff) && field_type != field_types::DOUBLE {
            let little_endian = self.byte_order == Some(ByteOrder::LittleEndian);
            if let Some(value) = tag_utils::unpack_inline_values(&entry, little_endian, self.is_big_tiff).first() {
                entry.value_offset = *value;
            }
        }

        Ok(entry)
    }

    /// Reads a tag's integer values, inline or external
    pub fn read_tag_values(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<u64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.is_value_inline(self.is_big_tiff) {
            if entry.count == 1 {
                return Ok(vec![entry.value_offset]);
            }
            let little_endian = self.byte_order == Some(ByteOrder::LittleEndian);
            return Ok(tag_utils::unpack_inline_values(entry, little_endian, self.is_big_tiff));
        }

        let mut values = Vec::with_capacity(Self::checked_array_len(reader, entry)?);
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        tag_utils::read_tag_value_array(reader, entry, self.handler()?, &mut values)?;

        Ok(values)
    }

    /// Reads a DOUBLE tag's values (GeoTIFF model tags)
    pub fn read_tag_doubles(&self, reader: &mut dyn SeekableReader, ifd: &IFD, tag: u16) -> TiffResult<Vec<f64>> {
        let entry = ifd.get_entry(tag)
            .ok_or(TiffError::TagNotFound(tag))?;

        if entry.field_type != field_types::DOUBLE {
            return Err(TiffError::UnsupportedFieldType(entry.field_type));
        }

        if entry.is_value_inline(self.is_big_tiff) {
            // Only a single BigTIFF double fits inline; the handler already decoded it as u64
            return Ok(vec![f64::from_bits(entry.value_offset)]);
        }

        let mut values = Vec::with_capacity(Self::checked_array_len(reader, entry)?);
        reader.seek(SeekFrom::Start(entry.value_offset))?;
        let handler = self.handler()?;
        for _ in 0..entry.count {
            values.push(handler.read_f64(reader)?);
        }

        Ok(values)
    }

    /// Number of values of an out-of-line array, once the array is known to fit the file
    fn checked_array_len(reader: &mut dyn SeekableReader, entry: &IFDEntry) -> TiffResult<usize> {
        let byte_len = entry.count.checked_mul(entry.get_field_type_size() as u64)
            .ok_or_else(|| TiffError::GenericError(format!(
                "Tag {} declares {} values, too many to address", entry.tag, entry.count)))?;

        let file_size = validation::get_file_size(reader)?;
        validation::validate_data_block(entry.value_offset, byte_len, file_size)?;

        usize::try_from(entry.count)
            .map_err(|_| TiffError::GenericError(format!("Tag {} has too many values", entry.tag)))
    }

    /// Returns whether the current file is a BigTIFF
    pub fn is_big_tiff(&self) -> bool {
        self.is_big_tiff
    }

    /// Byte order of the last file read, if any
    pub fn byte_order(&self) -> Option<ByteOrder> {
        self.byte_order
    }
}
