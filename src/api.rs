//! Library facade
//!
//! [`MaskKit`] exposes every mask operation behind one object that also
//! records a one-line summary of each call in its log file.

use std::path::Path;

use log::info;
use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::commands::analyze_command::analysis_report;
use crate::coordinate::GeoTransform;
use crate::errors::MaskResult;
use crate::features::NdxiKind;
use crate::generator::WindowGenerator;
use crate::mask::{self, GeoMask, MaskPixel, MaskStats, MaskWriter};
use crate::utils::logger::Logger;

/// Main interface to the maskkit library
pub struct MaskKit {
    logger: Logger,
}

impl MaskKit {
    /// Create a new MaskKit instance
    ///
    /// # Arguments
    /// * `log_file` - Optional path to the log file, defaults to "maskkit.log"
    pub fn new(log_file: Option<&str>) -> MaskResult<Self> {
        let logger = Logger::new(log_file.unwrap_or("maskkit.log"))?;
        Ok(MaskKit { logger })
    }

    /// Text report of a mask GeoTIFF
    pub fn analyze<P: AsRef<Path>>(&self, input_path: P, verbose: bool) -> MaskResult<String> {
        let report = analysis_report(input_path, verbose)?;
        self.logger.log(&report)?;
        Ok(report)
    }

    /// Save a mask as an uncompressed, unreferenced GeoTIFF
    pub fn save_mask<S, T, P>(&self, mask: &ArrayBase<S, Ix2>, output_path: P) -> MaskResult<()>
    where
        S: Data<Elem = T>,
        T: MaskPixel,
        P: AsRef<Path>,
    {
        self.save_mask_with(&MaskWriter::default(), mask, output_path)
    }

    /// Save a mask with a configured writer
    pub fn save_mask_with<S, T, P>(&self, writer: &MaskWriter, mask: &ArrayBase<S, Ix2>, output_path: P) -> MaskResult<()>
    where
        S: Data<Elem = T>,
        T: MaskPixel,
        P: AsRef<Path>,
    {
        let output_path = output_path.as_ref();
        writer.write(mask, output_path)?;
        self.record(&format!("Saved {} to {}", MaskStats::from_mask(mask), output_path.display()))
    }

    /// Load any image file as a mask at its stored depth
    pub fn load_mask<P: AsRef<Path>>(&self, input_path: P) -> MaskResult<Array2<u16>> {
        let input_path = input_path.as_ref();
        let loaded = mask::load_mask_from_file(input_path)?;
        self.record(&format!("Loaded {} from {}", MaskStats::from_mask(&loaded), input_path.display()))?;
        Ok(loaded)
    }

    /// Read a mask GeoTIFF together with its georeferencing
    pub fn read_geotiff<P: AsRef<Path>>(&self, input_path: P) -> MaskResult<GeoMask> {
        mask::read_mask_geotiff(input_path)
    }

    /// Rasterize a shapefile onto a `(rows, cols)` grid
    pub fn shapefile_mask<P: AsRef<Path>>(
        &self,
        shapefile_path: P,
        shape: (usize, usize),
        transform: &GeoTransform,
    ) -> MaskResult<Array2<bool>> {
        let shapefile_path = shapefile_path.as_ref();
        let rasterized = mask::load_mask_from_shapefile(shapefile_path, shape, transform)?;
        self.record(&format!("Rasterized {} into {}", shapefile_path.display(), MaskStats::from_mask(&rasterized)))?;
        Ok(rasterized)
    }

    /// Threshold an NDXI feature below its Otsu cut
    pub fn ndxi_mask<G: WindowGenerator>(&self, generator: &G, kind: NdxiKind) -> MaskResult<Array2<bool>> {
        let computed = mask::get_ndxi_mask(generator, kind)?;
        self.record(&format!("{} mask: {}", kind, MaskStats::from_mask(&computed)))?;
        Ok(computed)
    }

    fn record(&self, summary: &str) -> MaskResult<()> {
        info!("{}", summary);
        self.logger.log(summary)?;
        Ok(())
    }
}
