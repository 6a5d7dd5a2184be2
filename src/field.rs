//! Per-pointing field statistics: zeropoint, flux-error median, and the
//! pointing's smoothing parameter.
//!
//! Each telescope pointing carries its own photometric calibration, so the
//! zeropoint and the typical flux error are estimated per (pointing, band)
//! group. Both estimates are medians: a handful of corrupted measurements
//! in a group must not drag the calibration of the whole pointing.

use crate::catalog::{FieldStatistics, FluxRecord};
use crate::config::ZeropointSource;
use crate::error::FieldStatisticsError;
use crate::stats;
use crate::transform::{ref_flux_from_zeropoint, POGSON};

/// Estimate a pointing's zeropoint from observed classical magnitudes.
///
/// For every record with positive flux and a magnitude, the implied
/// zeropoint is `m_i + POGSON * ln(f_i)`; the pointing zeropoint is the
/// median of these samples.
///
/// # Returns
/// * `Err(InsufficientPositiveFlux)` - no record has positive flux
/// * `Err(MissingZeropointSource)` - no record in the group carries a
///   magnitude at all
/// * `Err(InsufficientMagnitudePairing)` - magnitudes exist, but none is
///   paired with a positive flux (or all pairs are NaN)
pub fn estimate_zeropoint(records: &[&FluxRecord]) -> Result<f64, FieldStatisticsError> {
    if !records.iter().any(|r| r.flux > 0.0) {
        return Err(FieldStatisticsError::InsufficientPositiveFlux);
    }

    let samples: Vec<f64> = records
        .iter()
        .filter(|r| r.flux > 0.0)
        .filter_map(|r| r.magnitude.map(|m| m + POGSON * r.flux.ln()))
        .collect();

    if samples.is_empty() {
        if records.iter().all(|r| r.magnitude.is_none()) {
            return Err(FieldStatisticsError::MissingZeropointSource);
        }
        return Err(FieldStatisticsError::InsufficientMagnitudePairing);
    }

    stats::median(&samples).map_err(|_| FieldStatisticsError::InsufficientMagnitudePairing)
}

/// Compute the field statistics of one (pointing, band) group.
///
/// The zeropoint comes from the configured source; the flux-error statistic
/// is the median of the group's raw flux errors (all records, regardless of
/// flux sign; NaN errors are ignored by the median); the pointing smoothing
/// parameter is
///
/// `b = sqrt(POGSON) * exp(-m0 / POGSON) * median(flux_error)`.
///
/// # Arguments
/// * `pointing` - Pointing identifier of the group
/// * `band` - Band identifier of the group
/// * `records` - All flux records of the group
/// * `zeropoint_source` - Estimate from magnitudes or use a fixed value
///
/// # Returns
/// One statistics row, or the per-pointing error that invalidates the
/// group. All failures here are local to the pointing: callers skip the
/// group and continue with the rest of the band.
pub fn field_statistics(
    pointing: &str,
    band: &str,
    records: &[&FluxRecord],
    zeropoint_source: ZeropointSource,
) -> Result<FieldStatistics, FieldStatisticsError> {
    if !records.iter().any(|r| r.flux > 0.0) {
        return Err(FieldStatisticsError::InsufficientPositiveFlux);
    }

    let zeropoint = match zeropoint_source {
        ZeropointSource::FixedValue(value) => value,
        ZeropointSource::ObservedMagnitude => estimate_zeropoint(records)?,
    };

    let errors: Vec<f64> = records.iter().map(|r| r.flux_error).collect();
    let flux_error_median = match stats::median(&errors) {
        Ok(value) => value,
        Err(_) => {
            // Nothing but NaN errors is as degenerate as a non-positive
            // median.
            return Err(FieldStatisticsError::NonPositiveSmoothingParameter { value: f64::NAN });
        }
    };

    let smoothing = POGSON.sqrt() * (-zeropoint / POGSON).exp() * flux_error_median;
    if !(smoothing > 0.0) || !smoothing.is_finite() {
        return Err(FieldStatisticsError::NonPositiveSmoothingParameter { value: smoothing });
    }

    let ref_flux = ref_flux_from_zeropoint(zeropoint);
    Ok(FieldStatistics {
        pointing: pointing.to_string(),
        band: band.to_string(),
        zeropoint,
        ref_flux,
        flux_error_median,
        smoothing,
        smoothing_absolute: ref_flux * smoothing,
    })
}
