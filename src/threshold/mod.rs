//! Global thresholding

mod otsu;

pub use otsu::{threshold_otsu, HISTOGRAM_BINS};
