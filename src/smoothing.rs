//! Band-global smoothing estimation and cross-survey rescaling.
//!
//! One smoothing parameter is used per band so that hyperbolic magnitudes
//! stay mutually comparable across the survey footprint. The band value is
//! the median of the per-pointing parameters: a pointing with an anomalous
//! error distribution moves the aggregate by no more than any other single
//! sample.

use crate::catalog::{FieldStatistics, GlobalSmoothing};
use crate::error::BandError;
use crate::stats;
use crate::transform::POGSON;

/// Aggregate a band's per-pointing smoothing parameters into the global
/// value.
///
/// # Arguments
/// * `band` - Band the statistics belong to
/// * `statistics` - Valid per-pointing rows of the band
///
/// # Returns
/// * `Err(BandError::NoValidFieldStatistics)` - `statistics` is empty
pub fn global_smoothing(
    band: &str,
    statistics: &[FieldStatistics],
) -> Result<GlobalSmoothing, BandError> {
    let values: Vec<f64> = statistics.iter().map(|s| s.smoothing).collect();
    let value = stats::median(&values).map_err(|_| BandError::NoValidFieldStatistics {
        band: band.to_string(),
    })?;
    GlobalSmoothing::new(band, value)
}

/// Collapse per-band smoothing parameters into one survey-wide value: the
/// median of the per-band medians. `None` when no band values are supplied.
pub fn survey_smoothing(per_band: &[GlobalSmoothing]) -> Option<f64> {
    let values: Vec<f64> = per_band.iter().map(|g| g.value()).collect();
    stats::median(&values).ok()
}

/// Re-express a smoothing parameter computed under one zeropoint in terms
/// of another.
///
/// The relative smoothing parameter scales as `exp(-m0 / POGSON)`, so a
/// value computed under `zeropoint_from` converts exactly to
///
/// `b_to = b_from * exp((zeropoint_from - zeropoint_to) / POGSON)`.
///
/// This is an algebraic identity, not an estimate: rescaling reproduces the
/// value that direct computation under `zeropoint_to` would give from the
/// same flux-error median, and it leaves the absolute smoothing
/// `ref_flux * b` unchanged. Round-trips are exact. Used when importing a
/// statistics table from a survey calibrated to a different zeropoint.
pub fn rescale_smoothing(smoothing: f64, zeropoint_from: f64, zeropoint_to: f64) -> f64 {
    smoothing * ((zeropoint_from - zeropoint_to) / POGSON).exp()
}
