//! Window generators
//!
//! A generator lays a grid of cells over an image and hands out windows
//! centred on each cell. Feature extraction only sees the
//! [`WindowGenerator`] trait, so any source of windows can be used.

mod full;

pub use full::FullGenerator;

use std::ops::Range;

use ndarray::{s, ArrayView2};

use crate::errors::MaskResult;
use crate::image::{Band, Image};

/// Window size as `(rows, cols)`
pub type WindowShape = (usize, usize);

/// Source of windows laid out on an `x_size` by `y_size` grid of cells
pub trait WindowGenerator: Sync {
    /// Number of cells along the row axis
    fn x_size(&self) -> usize;

    /// Number of cells along the column axis
    fn y_size(&self) -> usize;

    /// Window of the given shape for cell `(x, y)`
    fn window(&self, x: usize, y: usize, shape: WindowShape) -> MaskResult<Window<'_>>;
}

/// Rectangular slice of every band of an image
#[derive(Debug, Clone)]
pub struct Window<'a> {
    image: &'a Image,
    rows: Range<usize>,
    cols: Range<usize>,
}

impl<'a> Window<'a> {
    /// Window over `rows x cols` of `image`; ranges must lie inside the image
    pub fn new(image: &'a Image, rows: Range<usize>, cols: Range<usize>) -> Self {
        Window { image, rows, cols }
    }

    /// Pixels of one band inside the window
    pub fn band(&self, band: Band) -> MaskResult<ArrayView2<'a, f64>> {
        let view = self.image.band(band)?;
        Ok(view.slice_move(s![self.rows.clone(), self.cols.clone()]))
    }

    /// Window size as `(rows, cols)` after clipping
    pub fn shape(&self) -> WindowShape {
        (self.rows.len(), self.cols.len())
    }

    /// Whether clipping left no pixels
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }
}
