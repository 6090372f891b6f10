//! TIFF and GeoTIFF constants
//!
//! Named values for the tags, field types and codes the mask reader and
//! writer deal with.

/// TIFF header constants
pub mod header {
    /// Standard TIFF version number (42)
    pub const TIFF_VERSION: u16 = 42;

    /// BigTIFF version number (43)
    pub const BIG_TIFF_VERSION: u16 = 43;

    /// "II" byte order marker for little-endian
    pub const LITTLE_ENDIAN_MARKER: [u8; 2] = [0x49, 0x49];

    /// BigTIFF offset size (8 bytes)
    pub const BIGTIFF_OFFSET_SIZE: u16 = 8;

    /// Size of a classic TIFF header in bytes
    pub const TIFF_HEADER_SIZE: u64 = 8;

    /// Size of a BigTIFF header in bytes
    pub const BIG_TIFF_HEADER_SIZE: u64 = 16;
}

/// Field types defined by TIFF 6.0 and BigTIFF
pub mod field_types {
    pub const BYTE: u16 = 1;       // 8-bit unsigned integer
    pub const ASCII: u16 = 2;      // 8-bit byte containing ASCII character
    pub const SHORT: u16 = 3;      // 16-bit unsigned integer
    pub const LONG: u16 = 4;       // 32-bit unsigned integer
    pub const RATIONAL: u16 = 5;   // Two LONGs: numerator and denominator
    pub const SBYTE: u16 = 6;      // 8-bit signed integer
    pub const UNDEFINED: u16 = 7;  // 8-bit byte with unspecified format
    pub const SSHORT: u16 = 8;     // 16-bit signed integer
    pub const SLONG: u16 = 9;      // 32-bit signed integer
    pub const SRATIONAL: u16 = 10; // Two SLONGs: numerator and denominator
    pub const FLOAT: u16 = 11;     // Single precision IEEE floating point
    pub const DOUBLE: u16 = 12;    // Double precision IEEE floating point
    pub const LONG8: u16 = 16;     // BigTIFF 64-bit unsigned integer
    pub const SLONG8: u16 = 17;    // BigTIFF 64-bit signed integer
    pub const IFD8: u16 = 18;      // BigTIFF 64-bit IFD offset
}

/// TIFF tags used by mask rasters
pub mod tags {
    pub const IMAGE_WIDTH: u16 = 256;
    pub const IMAGE_LENGTH: u16 = 257;
    pub const BITS_PER_SAMPLE: u16 = 258;
    pub const COMPRESSION: u16 = 259;
    pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
    pub const STRIP_OFFSETS: u16 = 273;
    pub const SAMPLES_PER_PIXEL: u16 = 277;
    pub const ROWS_PER_STRIP: u16 = 278;
    pub const STRIP_BYTE_COUNTS: u16 = 279;
    pub const MIN_SAMPLE_VALUE: u16 = 280;
    pub const MAX_SAMPLE_VALUE: u16 = 281;
    pub const PLANAR_CONFIGURATION: u16 = 284;
    pub const SOFTWARE: u16 = 305;
    pub const PREDICTOR: u16 = 317;
    pub const TILE_OFFSETS: u16 = 324;
    pub const SAMPLE_FORMAT: u16 = 339;

    // GeoTIFF tags
    pub const MODEL_PIXEL_SCALE_TAG: u16 = 33550;    // Pixel size in map units
    pub const MODEL_TIEPOINT_TAG: u16 = 33922;       // Links raster to world coordinates
    pub const MODEL_TRANSFORMATION_TAG: u16 = 34264; // Full affine matrix
    pub const GEO_KEY_DIRECTORY_TAG: u16 = 34735;    // GeoTIFF keys structure
}

/// Compression types
pub mod compression {
    pub const NONE: u16 = 1;         // No compression
    pub const LZW: u16 = 5;          // LZW compression
    pub const JPEG: u16 = 7;         // JPEG compression
    pub const DEFLATE: u16 = 8;      // Adobe Deflate (zlib)
    pub const ZSTD: u16 = 14;        // Zstandard compression
    pub const PACKBITS: u16 = 32773; // PackBits compression
}

/// Photometric interpretation values
pub mod photometric {
    pub const WHITE_IS_ZERO: u16 = 0; // Minimum value is white
    pub const BLACK_IS_ZERO: u16 = 1; // Minimum value is black
    pub const RGB: u16 = 2;           // RGB color model
    pub const PALETTE: u16 = 3;       // Palette color (color map indexed)
}

/// Sample format values
pub mod sample_format {
    pub const UNSIGNED: u16 = 1; // Unsigned integer data
}

/// Predictor values
pub mod predictor {
    pub const NONE: u16 = 1;                    // No prediction
    pub const HORIZONTAL_DIFFERENCING: u16 = 2; // Each sample stored as difference from the previous
}

/// Planar configuration values
pub mod planar_config {
    pub const CHUNKY: u16 = 1; // Components stored interleaved
}

/// GeoTIFF key IDs
pub mod geo_keys {
    pub const GT_MODEL_TYPE: u16 = 1024;     // GTModelTypeGeoKey
    pub const GT_RASTER_TYPE: u16 = 1025;    // GTRasterTypeGeoKey
    pub const GEOGRAPHIC_TYPE: u16 = 2048;   // GeographicTypeGeoKey
    pub const PROJECTED_CS_TYPE: u16 = 3072; // ProjectedCSTypeGeoKey

    /// GeoKeyDirectory header: version 1, revision 1.0
    pub const DIRECTORY_VERSION: [u16; 3] = [1, 1, 0];
}

/// GTModelTypeGeoKey values
pub mod model_type {
    pub const PROJECTED: u16 = 1;
    pub const GEOGRAPHIC: u16 = 2;
}

/// GTRasterTypeGeoKey values
pub mod raster_type {
    pub const PIXEL_IS_AREA: u16 = 1;
}
