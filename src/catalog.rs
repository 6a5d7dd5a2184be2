//! Boundary data types: input flux records, per-pointing statistics rows,
//! the band-global smoothing parameter, and magnitude results.
//!
//! These are the shapes the surrounding I/O layer reads and writes; they
//! derive serde traits so statistics tables can be persisted in one run and
//! reloaded in another (or imported from a different survey). The core never
//! mutates them after construction.

use crate::error::{BandError, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One flux measurement of one source in one pointing and band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxRecord {
    /// Identifier of the pointing (field) the measurement belongs to.
    pub pointing: String,
    /// Identifier of the photometric band (filter).
    pub band: String,
    /// Measured flux in linear units; may be zero or negative.
    pub flux: f64,
    /// Flux uncertainty; expected positive.
    pub flux_error: f64,
    /// Classical magnitude of the same measurement, when the catalog
    /// carries one. Used to estimate the pointing zeropoint.
    pub magnitude: Option<f64>,
}

/// Photometric statistics of one (pointing, band) group.
///
/// Produced once per group and read-only thereafter. `smoothing` is the
/// pointing's smoothing parameter relative to the reference flux;
/// `smoothing_absolute = ref_flux * smoothing` is zeropoint-independent and
/// therefore comparable across surveys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// Pointing identifier.
    pub pointing: String,
    /// Band identifier.
    pub band: String,
    /// Photometric zeropoint `m0` of the pointing.
    pub zeropoint: f64,
    /// Reference flux `f0 = exp(m0 / POGSON)`.
    pub ref_flux: f64,
    /// Median flux error of the group.
    pub flux_error_median: f64,
    /// Smoothing parameter `b` relative to the reference flux.
    pub smoothing: f64,
    /// Absolute smoothing parameter `f0 * b`.
    pub smoothing_absolute: f64,
}

/// Band-global smoothing parameter.
///
/// Construction enforces positivity, so holders of a `GlobalSmoothing` can
/// apply the magnitude transform without re-validating.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSmoothing {
    band: String,
    value: f64,
}

impl GlobalSmoothing {
    /// Wrap a validated smoothing value for a band.
    ///
    /// # Returns
    /// * `Err(BandError::NonPositiveSmoothingParameter)` - `value` is not a
    ///   positive finite number
    pub fn new(band: impl Into<String>, value: f64) -> Result<Self, BandError> {
        let band = band.into();
        if !(value > 0.0) || !value.is_finite() {
            return Err(BandError::NonPositiveSmoothingParameter { band, value });
        }
        Ok(Self { band, value })
    }

    /// Band this smoothing parameter applies to.
    pub fn band(&self) -> &str {
        &self.band
    }

    /// The smoothing value, guaranteed positive and finite.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Hyperbolic magnitude and uncertainty of one flux record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperbolicMagnitude {
    /// The magnitude `mu`.
    pub magnitude: f64,
    /// Its uncertainty `d_mu`.
    pub magnitude_error: f64,
}

/// Immutable lookup of field statistics keyed by (band, pointing).
///
/// Built once from a list of rows — either computed earlier in the same
/// process or deserialized from a previous run or another survey — and then
/// only read. Rows are validated on construction, so external tables cannot
/// smuggle non-finite zeropoints or non-positive smoothing parameters into
/// the transform stage.
#[derive(Debug, Clone, Default)]
pub struct FieldStatisticsTable {
    rows: HashMap<(String, String), FieldStatistics>,
}

impl FieldStatisticsTable {
    /// Build a table from statistics rows, validating each one.
    ///
    /// # Returns
    /// * `Err(ConfigError::InvalidStatisticsRow)` - a row carries a
    ///   non-finite zeropoint or reference flux, or a non-positive
    ///   median error or smoothing parameter
    /// * `Err(ConfigError::DuplicateStatisticsRow)` - two rows share the
    ///   same (band, pointing) key
    pub fn from_rows(rows: Vec<FieldStatistics>) -> Result<Self, ConfigError> {
        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            validate_row(&row)?;
            let key = (row.band.clone(), row.pointing.clone());
            if table.contains_key(&key) {
                return Err(ConfigError::DuplicateStatisticsRow {
                    band: key.0,
                    pointing: key.1,
                });
            }
            table.insert(key, row);
        }
        Ok(Self { rows: table })
    }

    /// Look up the statistics of one (band, pointing) group.
    pub fn get(&self, band: &str, pointing: &str) -> Option<&FieldStatistics> {
        self.rows.get(&(band.to_string(), pointing.to_string()))
    }

    /// All rows belonging to a band, in unspecified order.
    pub fn band_rows(&self, band: &str) -> Vec<&FieldStatistics> {
        self.rows
            .values()
            .filter(|row| row.band == band)
            .collect()
    }

    /// Number of rows in the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn validate_row(row: &FieldStatistics) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidStatisticsRow {
        band: row.band.clone(),
        pointing: row.pointing.clone(),
        reason: reason.to_string(),
    };

    if !row.zeropoint.is_finite() {
        return Err(invalid("zeropoint is not finite"));
    }
    if !(row.ref_flux > 0.0) || !row.ref_flux.is_finite() {
        return Err(invalid("reference flux is not positive and finite"));
    }
    if !(row.flux_error_median > 0.0) || !row.flux_error_median.is_finite() {
        return Err(invalid("median flux error is not positive and finite"));
    }
    if !(row.smoothing > 0.0) || !row.smoothing.is_finite() {
        return Err(invalid("smoothing parameter is not positive and finite"));
    }
    Ok(())
}
