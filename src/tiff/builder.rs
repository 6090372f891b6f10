//! TIFF file construction
//!
//! [`TiffBuilder`] collects IFDs, external tag arrays and strip data, then
//! hands them to the layout writer. Tag categories are delegated to the
//! strategy builders in `builders`.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use log::info;

use crate::coordinate::{CoordinateSystem, GeoTransform};
use crate::tiff::errors::{TiffError, TiffResult};
use crate::tiff::ifd::IFD;

use crate::tiff::builders::basic_tags::BasicTagsBuilder;
use crate::tiff::builders::geo_tags::GeoTagsBuilder;
use crate::tiff::builders::writer::WriterBuilder;

/// Builder for creating TIFF files
pub struct TiffBuilder {
    is_big_tiff: bool,
    pub ifds: Vec<IFD>,
    image_data: BTreeMap<usize, Vec<u8>>,
    external_data: BTreeMap<(usize, u16), Vec<u8>>,
}

impl TiffBuilder {
    /// Create a new TIFF builder
    pub fn new(is_big_tiff: bool) -> Self {
        TiffBuilder {
            is_big_tiff,
            ifds: Vec::new(),
            image_data: BTreeMap::new(),
            external_data: BTreeMap::new(),
        }
    }

    /// Add an IFD, returning its index
    pub fn add_ifd(&mut self, ifd: IFD) -> usize {
        let ifd_index = self.ifds.len();
        self.ifds.push(ifd);
        ifd_index
    }


    /// Add the baseline tags of an 8-bit single-band mask
    pub fn add_mask_tags(&mut self, ifd_index: usize, width: u32, height: u32, compression_code: u16, max_value: u8) -> TiffResult<()> {
        let ifd = ifd_at(&mut self.ifds, ifd_index)?;
        BasicTagsBuilder::add_mask_tags(ifd, width, height, compression_code, max_value);
        Ok(())
    }

    /// Store the raster as one strip
    pub fn setup_single_strip(&mut self, ifd_index: usize, strip_data: Vec<u8>) -> TiffResult<()> {
        let is_big_tiff = self.is_big_tiff;
        let ifd = ifd_at(&mut self.ifds, ifd_index)?;

        BasicTagsBuilder::setup_single_strip(ifd, &mut self.image_data, ifd_index, strip_data, is_big_tiff);
        Ok(())
    }

    /// Georeference an IFD with an affine transform
    pub fn add_geotransform(&mut self, ifd_index: usize, transform: &GeoTransform) -> TiffResult<()> {
        let ifd = ifd_at(&mut self.ifds, ifd_index)?;

        GeoTagsBuilder::add_geotransform(ifd, &mut self.external_data, ifd_index, transform);
        Ok(())
    }

    /// Attach a coordinate system through the GeoKey directory
    pub fn add_coordinate_system(&mut self, ifd_index: usize, crs: &CoordinateSystem) -> TiffResult<()> {
        let ifd = ifd_at(&mut self.ifds, ifd_index)?;

        GeoTagsBuilder::add_geo_key_directory(ifd, &mut self.external_data, ifd_index, crs);
        Ok(())
    }

    /// Write the TIFF into any seekable sink
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> TiffResult<()> {
        WriterBuilder::write(
            writer,
            self.is_big_tiff,
            &self.ifds,
            &self.image_data,
            &self.external_data
        )
    }

    /// Write the TIFF file to disk, creating or truncating it
    pub fn write<P: AsRef<Path>>(&self, output_path: P) -> TiffResult<()> {
        let path = output_path.as_ref();
        info!("Writing TIFF to {}", path.display());

        let file = File::create(path)?;
        let mut writer = BufWriter::with_capacity(1024 * 1024, file);
        self.write_to(&mut writer)
    }
}

/// Borrows one IFD without tying up the builder's other fields
fn ifd_at(ifds: &mut [IFD], ifd_index: usize) -> TiffResult<&mut IFD> {
    let count = ifds.len();
    ifds.get_mut(ifd_index).ok_or_else(|| TiffError::GenericError(format!(
        "Invalid IFD index {}, only have {} IFDs", ifd_index, count)))
}
