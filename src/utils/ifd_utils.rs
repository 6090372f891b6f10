//! IFD layout helpers shared by the reader and the writer

use crate::io::seekable::SeekableReader;
use crate::io::byte_order::ByteOrderHandler;
use crate::tiff::errors::{TiffError, TiffResult};

/// Reads an IFD offset (first-IFD pointer or next-IFD link)
pub fn read_ifd_offset(
    reader: &mut dyn SeekableReader,
    is_big_tiff: bool,
    byte_order_handler: &dyn ByteOrderHandler
) -> TiffResult<u64> {
    if is_big_tiff {
        byte_order_handler.read_u64(reader).map_err(TiffError::IoError)
    } else {
        byte_order_handler.read_u32(reader)
            .map(|v| v as u64)
            .map_err(TiffError::IoError)
    }
}

/// Size in bytes of an IFD with `entry_count` entries
///
/// Classic: 2 (count) + 12 per entry + 4 (next offset).
/// BigTIFF: 8 (count) + 20 per entry + 8 (next offset).
pub fn calculate_ifd_size(entry_count: usize, is_big_tiff: bool) -> u64 {
    let entries = entry_count as u64;
    if is_big_tiff {
        8 + 20 * entries + 8
    } else {
        2 + 12 * entries + 4
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ifd_sizes() {
        assert_eq!(calculate_ifd_size(0, false), 6);
        assert_eq!(calculate_ifd_size(10, false), 126);
        assert_eq!(calculate_ifd_size(10, true), 216);
    }
}
