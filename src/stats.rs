//! Robust statistics shared by the estimation stages.
//!
//! Every aggregate in this crate is a median: insensitive to a single
//! anomalous pointing (one cloudy night) in a way a mean is not.

use thiserror::Error;

/// Errors from the sample statistics in this module.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// No usable samples remained after dropping NaN values.
    #[error("cannot compute median: {total} samples, none valid (empty or all NaN)")]
    NoValidSamples {
        /// Number of samples supplied, including NaN.
        total: usize,
    },
}

/// Median of a slice of `f64` samples.
///
/// NaN samples are dropped before ranking; infinite samples participate and
/// sort to the ends. For an even number of valid samples the two middle
/// values are averaged.
///
/// This is a full-materialization operation: the valid samples are copied
/// and sorted, so all inputs of a group must be gathered before calling.
///
/// # Arguments
/// * `samples` - Values to rank; order does not matter
///
/// # Returns
/// * `Ok(median)` - Median of the valid samples
/// * `Err(StatsError::NoValidSamples)` - Empty input or nothing but NaN
pub fn median(samples: &[f64]) -> Result<f64, StatsError> {
    let mut valid: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();

    if valid.is_empty() {
        return Err(StatsError::NoValidSamples {
            total: samples.len(),
        });
    }

    valid.sort_by(|a, b| a.partial_cmp(b).expect("NaN filtered above"));

    let mid = valid.len() / 2;
    if valid.len() % 2 == 0 {
        Ok((valid[mid - 1] + valid[mid]) / 2.0)
    } else {
        Ok(valid[mid])
    }
}
