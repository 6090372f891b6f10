//! TIFF tag utilities
//!
//! Reading tag value arrays and turning tag codes into readable names.

use byteorder::ReadBytesExt;

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFDEntry;
use crate::tiff::constants::{field_types, tags, compression, photometric};

/// Reads an array of integer tag values based on the field type
///
/// The reader must already be positioned at the start of the value array.
pub fn read_tag_value_array(
    reader: &mut dyn SeekableReader,
    entry: &IFDEntry,
    handler: &dyn ByteOrderHandler,
    values: &mut Vec<u64>
) -> TiffResult<()> {
    for _ in 0..entry.count {
        let value = match entry.field_type {
            field_types::BYTE | field_types::SBYTE | field_types::UNDEFINED => reader.read_u8()? as u64,
            field_types::SHORT | field_types::SSHORT => handler.read_u16(reader)? as u64,
            field_types::LONG | field_types::SLONG => handler.read_u32(reader)? as u64,
            field_types::LONG8 | field_types::SLONG8 | field_types::IFD8 => handler.read_u64(reader)?,
            _ => return Err(TiffError::UnsupportedFieldType(entry.field_type)),
        };

        values.push(value);
    }

    Ok(())
}

/// Decodes integer values packed inline in an entry's value field
///
/// Inline values are stored left-justified in the value field, so for
/// little-endian files the first value sits in the low bytes.
pub fn unpack_inline_values(entry: &IFDEntry, little_endian: bool, is_big_tiff: bool) -> Vec<u64> {
    let size = entry.get_field_type_size();
    let field_width = if is_big_tiff { 8 } else { 4 };
    let raw = entry.value_offset;

    // Reading the value field back as raw bytes in file order
    let bytes: Vec<u8> = if little_endian {
        raw.to_le_bytes()[..field_width].to_vec()
    } else {
        raw.to_be_bytes()[8 - field_width..].to_vec()
    };

    bytes.chunks(size)
        .take(entry.count as usize)
        .map(|chunk| {
            let mut value = 0u64;
            if little_endian {
                for (i, b) in chunk.iter().enumerate() {
                    value |= (*b as u64) << (8 * i);
                }
            } else {
                for b in chunk {
                    value = (value << 8) | *b as u64;
                }
            }
            value
        })
        .collect()
}

/// Get the name of a TIFF tag
pub fn get_tag_name(tag: u16) -> &'static str {
    match tag {
        tags::IMAGE_WIDTH => "ImageWidth",
        tags::IMAGE_LENGTH => "ImageLength",
        tags::BITS_PER_SAMPLE => "BitsPerSample",
        tags::COMPRESSION => "Compression",
        tags::PHOTOMETRIC_INTERPRETATION => "PhotometricInterpretation",
        tags::STRIP_OFFSETS => "StripOffsets",
        tags::SAMPLES_PER_PIXEL => "SamplesPerPixel",
        tags::ROWS_PER_STRIP => "RowsPerStrip",
        tags::STRIP_BYTE_COUNTS => "StripByteCounts",
        tags::MIN_SAMPLE_VALUE => "MinSampleValue",
        tags::MAX_SAMPLE_VALUE => "MaxSampleValue",
        tags::PLANAR_CONFIGURATION => "PlanarConfiguration",
        tags::SOFTWARE => "Software",
        tags::PREDICTOR => "Predictor",
        tags::TILE_OFFSETS => "TileOffsets",
        tags::SAMPLE_FORMAT => "SampleFormat",
        tags::MODEL_PIXEL_SCALE_TAG => "ModelPixelScale",
        tags::MODEL_TIEPOINT_TAG => "ModelTiepoint",
        tags::MODEL_TRANSFORMATION_TAG => "ModelTransformation",
        tags::GEO_KEY_DIRECTORY_TAG => "GeoKeyDirectory",
        _ => "Unknown",
    }
}

/// Get the name of a TIFF field type
pub fn get_field_type_name(field_type: u16) -> &'static str {
    match field_type {
        field_types::BYTE => "BYTE",
        field_types::ASCII => "ASCII",
        field_types::SHORT => "SHORT",
        field_types::LONG => "LONG",
        field_types::RATIONAL => "RATIONAL",
        field_types::SBYTE => "SBYTE",
        field_types::UNDEFINED => "UNDEFINED",
        field_types::SSHORT => "SSHORT",
        field_types::SLONG => "SLONG",
        field_types::SRATIONAL => "SRATIONAL",
        field_types::FLOAT => "FLOAT",
        field_types::DOUBLE => "DOUBLE",
        field_types::LONG8 => "LONG8",
        field_types::SLONG8 => "SLONG8",
        field_types::IFD8 => "IFD8",
        _ => "Unknown",
    }
}

/// Get the name of a compression method
pub fn get_compression_name(compression_code: u64) -> &'static str {
    match compression_code as u16 {
        compression::NONE => "None",
        compression::LZW => "LZW",
        compression::JPEG => "JPEG",
        compression::DEFLATE => "Adobe Deflate",
        compression::ZSTD => "Zstandard",
        compression::PACKBITS => "PackBits",
        _ => "Unknown",
    }
}

/// Get the name of a photometric interpretation
pub fn get_photometric_name(photometric_code: u64) -> &'static str {
    match photometric_code as u16 {
        photometric::WHITE_IS_ZERO => "WhiteIsZero",
        photometric::BLACK_IS_ZERO => "BlackIsZero",
        photometric::RGB => "RGB",
        photometric::PALETTE => "Palette",
        _ => "Unknown",
    }
}

/// Formats a tag's value field, naming coded values where known
pub fn describe_value(tag: u16, value: u64) -> String {
    match tag {
        tags::COMPRESSION => format!("{} ({})", value, get_compression_name(value)),
        tags::PHOTOMETRIC_INTERPRETATION => format!("{} ({})", value, get_photometric_name(value)),
        _ => value.to_string(),
    }
}
