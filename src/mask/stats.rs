//! Mask pixel counts

use std::fmt;

use ndarray::{ArrayBase, Data, Ix2};

use super::MaskPixel;

/// Set and unset pixel counts of a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskStats {
    pub rows: usize,
    pub cols: usize,
    /// Pixels with a non-zero value
    pub set: usize,
}

impl MaskStats {
    pub fn from_mask<S, T>(mask: &ArrayBase<S, Ix2>) -> Self
    where
        S: Data<Elem = T>,
        T: MaskPixel,
    {
        let (rows, cols) = mask.dim();
        let set = mask.iter().filter(|p| p.to_mask_byte() != 0).count();
        MaskStats { rows, cols, set }
    }

    pub fn total(&self) -> usize {
        self.rows * self.cols
    }

    pub fn unset(&self) -> usize {
        self.total() - self.set
    }

    /// Share of set pixels, 0 for an empty mask
    pub fn coverage(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.set as f64 / self.total() as f64
        }
    }
}

impl fmt::Display for MaskStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} mask: {} set, {} unset ({:.2}% coverage)",
               self.rows, self.cols, self.set, self.unset(), self.coverage() * 100.0)
    }
}
