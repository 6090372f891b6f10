//! Otsu's method
//!
//! Histogram-based global threshold: the value splitting the samples into
//! two classes with the largest between-class variance.

use log::debug;

use crate::errors::{MaskError, MaskResult};

/// Number of histogram bins spanning `[min, max]`
pub const HISTOGRAM_BINS: usize = 256;

/// Computes Otsu's threshold over the finite values of `values`
///
/// Non-finite values are ignored. The threshold is the centre of the bin
/// maximising the between-class variance, first maximum on ties. A constant
/// input returns that constant.
///
/// # Returns
/// The threshold, or `MaskError::Threshold` when no value is finite
pub fn threshold_otsu<'a, I>(values: I) -> MaskResult<f64>
where
    I: IntoIterator<Item = &'a f64>,
{
    let finite: Vec<f64> = values.into_iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(MaskError::Threshold("No finite values to threshold".to_string()));
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        debug!("Constant input, threshold is {}", min);
        return Ok(min);
    }

    let bin_width = (max - min) / HISTOGRAM_BINS as f64;
    let mut counts = [0f64; HISTOGRAM_BINS];
    for v in &finite {
        let bin = (((v - min) / bin_width) as usize).min(HISTOGRAM_BINS - 1);
        counts[bin] += 1.0;
    }
    let centres: Vec<f64> = (0..HISTOGRAM_BINS)
        .map(|i| min + (i as f64 + 0.5) * bin_width)
        .collect();

    // Class weights and means below (inclusive) and above each bin
    let mut weight_low = [0f64; HISTOGRAM_BINS];
    let mut mean_low = [0f64; HISTOGRAM_BINS];
    let (mut weight, mut sum) = (0.0, 0.0);
    for i in 0..HISTOGRAM_BINS {
        weight += counts[i];
        sum += counts[i] * centres[i];
        weight_low[i] = weight;
        mean_low[i] = if weight > 0.0 { sum / weight } else { 0.0 };
    }

    let mut weight_high = [0f64; HISTOGRAM_BINS];
    let mut mean_high = [0f64; HISTOGRAM_BINS];
    let (mut weight, mut sum) = (0.0, 0.0);
    for i in (0..HISTOGRAM_BINS).rev() {
        weight += counts[i];
        sum += counts[i] * centres[i];
        weight_high[i] = weight;
        mean_high[i] = if weight > 0.0 { sum / weight } else { 0.0 };
    }

    let mut best = 0;
    let mut best_variance = f64::NEG_INFINITY;
    for i in 0..HISTOGRAM_BINS - 1 {
        let spread = mean_low[i] - mean_high[i + 1];
        let variance = weight_low[i] * weight_high[i + 1] * spread * spread;
        if variance > best_variance {
            best_variance = variance;
            best = i;
        }
    }

    let threshold = centres[best];
    debug!("Otsu threshold {} over {} values in [{}, {}]", threshold, finite.len(), min, max);
    Ok(threshold)
}
