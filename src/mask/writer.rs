//! Mask GeoTIFF writer

use std::io::{Seek, Write};
use std::path::Path;

use log::{debug, info};
use ndarray::{ArrayBase, Data, Ix2};

use crate::compression::MaskCompression;
use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::errors::{MaskError, MaskResult};
use crate::tiff::{TiffBuilder, IFD};

/// Pixel types that can be stored in an 8-bit mask
pub trait MaskPixel: Copy {
    fn to_mask_byte(self) -> u8;
}

impl MaskPixel for bool {
    fn to_mask_byte(self) -> u8 {
        self as u8
    }
}

impl MaskPixel for u8 {
    fn to_mask_byte(self) -> u8 {
        self
    }
}

/// Values above 255 saturate
impl MaskPixel for u16 {
    fn to_mask_byte(self) -> u8 {
        u8::try_from(self).unwrap_or(u8::MAX)
    }
}

/// Writes 2D masks as single-band 8-bit GeoTIFFs
///
/// The default writer produces an uncompressed classic TIFF with no
/// georeferencing.
#[derive(Debug, Clone, Default)]
pub struct MaskWriter {
    compression: MaskCompression,
    geotransform: Option<GeoTransform>,
    epsg: Option<u32>,
    big_tiff: bool,
}

impl MaskWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip compression
    pub fn compression(mut self, compression: MaskCompression) -> Self {
        self.compression = compression;
        self
    }

    /// Affine transform written as GeoTIFF model tags
    pub fn geotransform(mut self, transform: GeoTransform) -> Self {
        self.geotransform = Some(transform);
        self
    }

    /// EPSG code written to the GeoKey directory
    pub fn epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    /// Write BigTIFF instead of classic TIFF
    pub fn big_tiff(mut self, big_tiff: bool) -> Self {
        self.big_tiff = big_tiff;
        self
    }

    /// Writes `mask` to `path`, creating or truncating the file
    ///
    /// The mask's axes are `(rows, cols)`; the raster is `cols` wide and
    /// `rows` high.
    pub fn write<S, T, P>(&self, mask: &ArrayBase<S, Ix2>, path: P) -> MaskResult<()>
    where
        S: Data<Elem = T>,
        T: MaskPixel,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        info!("Saving {}x{} mask to {}", mask.nrows(), mask.ncols(), path.display());

        self.build(mask)?.write(path)?;
        Ok(())
    }

    /// Writes `mask` into any seekable sink
    pub fn write_to<S, T, W>(&self, mask: &ArrayBase<S, Ix2>, writer: &mut W) -> MaskResult<()>
    where
        S: Data<Elem = T>,
        T: MaskPixel,
        W: Write + Seek,
    {
        self.build(mask)?.write_to(writer)?;
        Ok(())
    }

    fn build<S, T>(&self, mask: &ArrayBase<S, Ix2>) -> MaskResult<TiffBuilder>
    where
        S: Data<Elem = T>,
        T: MaskPixel,
    {
        let (rows, cols) = mask.dim();
        if rows == 0 || cols == 0 {
            return Err(MaskError::Geometry(format!("Cannot write an empty {}x{} mask", rows, cols)));
        }
        let width = u32::try_from(cols)
            .map_err(|_| MaskError::Geometry(format!("Mask width {} exceeds TIFF limits", cols)))?;
        let height = u32::try_from(rows)
            .map_err(|_| MaskError::Geometry(format!("Mask height {} exceeds TIFF limits", rows)))?;

        // Iteration is in logical row-major order whatever the memory layout
        let pixels: Vec<u8> = mask.iter().map(|p| p.to_mask_byte()).collect();
        let max_value = pixels.iter().copied().max().unwrap_or(0);

        let handler = self.compression.handler();
        let strip = handler.compress(&pixels)?;
        debug!("Strip: {} bytes raw, {} bytes {}", pixels.len(), strip.len(), handler.name());

        let mut builder = TiffBuilder::new(self.big_tiff);
        let index = builder.add_ifd(IFD::new(0, 0));
        builder.add_mask_tags(index, width, height, handler.code(), max_value)?;
        builder.setup_single_strip(index, strip)?;

        if let Some(transform) = &self.geotransform {
            builder.add_geotransform(index, transform)?;
        }
        if let Some(code) = self.epsg {
            if code > u16::MAX as u32 {
                return Err(MaskError::Config(format!(
                    "EPSG code {} does not fit a GeoKey value", code)));
            }
            builder.add_coordinate_system(index, &CoordinateSystem::from_epsg(code))?;
        }

        Ok(builder)
    }
}

/// Saves a 2D mask as an uncompressed, unreferenced single-band GeoTIFF
///
/// `true` pixels are written as 1, `false` as 0. The file is closed on
/// every path out of this function.
pub fn save_mask_to_file<S, T, P>(mask: &ArrayBase<S, Ix2>, path: P) -> MaskResult<()>
where
    S: Data<Elem = T>,
    T: MaskPixel,
    P: AsRef<Path>,
{
    MaskWriter::default().write(mask, path)
}
