//! Tests for the TIFF reader

use std::io::Cursor;

use super::test_utils::{create_big_endian_tiff_buffer, create_test_bigtiff_buffer, create_test_tiff_buffer};
use crate::io::byte_order::ByteOrder;
use crate::tiff::constants::tags;
use crate::tiff::errors::TiffError;
use crate::tiff::reader::TiffReader;

#[test]
fn test_read_classic_tiff() {
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut create_test_tiff_buffer()).unwrap();

    assert!(!tiff.is_big_tiff);
    assert_eq!(tiff.byte_order, ByteOrder::LittleEndian);
    assert_eq!(tiff.ifd_count(), 1);
    assert_eq!(tiff.main_ifd().and_then(|ifd| ifd.get_dimensions()), Some((800, 600)));
}

#[test]
fn test_read_bigtiff() {
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut create_test_bigtiff_buffer()).unwrap();

    assert!(tiff.is_big_tiff);
    assert!(reader.is_big_tiff());
    assert_eq!(tiff.main_ifd().and_then(|ifd| ifd.get_dimensions()), Some((1024, 768)));
}

#[test]
fn test_big_endian_inline_shorts_are_normalized() {
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut create_big_endian_tiff_buffer()).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert_eq!(reader.byte_order(), Some(ByteOrder::BigEndian));
    assert_eq!(ifd.get_dimensions(), Some((3, 2)));
    assert_eq!(ifd.get_bits_per_sample(), 8);
    assert_eq!(ifd.get_compression(), 1);
    assert_eq!(ifd.get_tag_value(tags::STRIP_BYTE_COUNTS), Some(6));
}

#[test]
fn test_read_tag_values_missing_tag() {
    let mut buffer = create_test_tiff_buffer();
    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut buffer).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert_eq!(reader.read_tag_values(&mut buffer, ifd, tags::IMAGE_WIDTH).unwrap(), vec![800]);
    assert!(matches!(
        reader.read_tag_values(&mut buffer, ifd, tags::STRIP_OFFSETS),
        Err(TiffError::TagNotFound(tags::STRIP_OFFSETS))
    ));
}

#[test]
fn test_value_array_beyond_file_is_rejected() {
    // ImageWidth claiming a billion LONG values stored at offset 8
    let mut buffer = Vec::new();
    buffer.extend_from_slice(&[0x49, 0x49, 42, 0, 8, 0, 0, 0]);
    buffer.extend_from_slice(&[1, 0]);
    buffer.extend_from_slice(&[0, 1, 4, 0, 0, 0xCA, 0x9A, 0x3B, 8, 0, 0, 0]);
    buffer.extend_from_slice(&[0, 0, 0, 0]);
    let mut cursor = Cursor::new(buffer);

    let mut reader = TiffReader::new();
    let tiff = reader.read(&mut cursor).unwrap();
    let ifd = tiff.main_ifd().unwrap();

    assert!(matches!(
        reader.read_tag_values(&mut cursor, ifd, tags::IMAGE_WIDTH),
        Err(TiffError::GenericError(_))
    ));
}

#[test]
fn test_rejects_unknown_version() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 41, 0, 8, 0, 0, 0]);
    assert!(matches!(
        TiffReader::new().read(&mut cursor),
        Err(TiffError::UnsupportedVersion(41))
    ));
}

#[test]
fn test_rejects_ifd_offset_outside_file() {
    let mut cursor = Cursor::new(vec![0x49, 0x49, 42, 0, 0xFF, 0, 0, 0]);
    assert!(TiffReader::new().read(&mut cursor).is_err());
}
