//! Pipeline configuration.
//!
//! All knobs that change core behavior live in one explicit structure,
//! validated once at the pipeline boundary. The surrounding CLI/config-file
//! layer owns parsing; it hands the core a ready `PipelineConfig`.

use crate::catalog::FieldStatisticsTable;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Where each pointing's photometric zeropoint comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZeropointSource {
    /// Estimate the zeropoint per pointing from records that carry both a
    /// positive flux and a classical magnitude.
    ObservedMagnitude,
    /// Use one fixed zeropoint for every pointing.
    FixedValue(f64),
}

/// Configuration threaded through the estimation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Zeropoint source for field statistics.
    pub zeropoint_source: ZeropointSource,

    /// Bands to process. Each band is processed independently; a failing
    /// band never aborts the others.
    pub bands: Vec<String>,

    /// Previously computed statistics to reuse instead of recomputing.
    /// Supplied in memory by the caller; not part of the serialized
    /// configuration.
    #[serde(skip)]
    pub external_statistics: Option<FieldStatisticsTable>,

    /// Collapse the per-band global smoothing parameters into a single
    /// survey-wide value (the median of the per-band medians) shared by
    /// all bands.
    #[serde(default)]
    pub shared_smoothing: bool,

    /// When a pointing has no valid statistics row, substitute the band's
    /// mean statistics (with a warning) instead of dropping the pointing's
    /// records from the output.
    #[serde(default)]
    pub fill_missing_statistics: bool,
}

impl PipelineConfig {
    /// Validate the configuration before any computation.
    ///
    /// External statistics tables are validated separately on construction
    /// ([`FieldStatisticsTable::from_rows`]), so a config holding one is
    /// already known to be internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bands.is_empty() {
            return Err(ConfigError::EmptyBandList);
        }

        let mut seen = HashSet::new();
        for band in &self.bands {
            if !seen.insert(band.as_str()) {
                return Err(ConfigError::DuplicateBand { band: band.clone() });
            }
        }

        if let ZeropointSource::FixedValue(zeropoint) = self.zeropoint_source {
            if !zeropoint.is_finite() {
                return Err(ConfigError::NonFiniteFixedZeropoint { value: zeropoint });
            }
        }

        Ok(())
    }
}
