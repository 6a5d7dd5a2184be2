//! Per-band orchestration: group records by pointing, derive or look up
//! field statistics, aggregate the global smoothing parameter, and apply
//! the magnitude transform to every record.
//!
//! Fan-out/fan-in only — all numeric content lives in [`crate::field`],
//! [`crate::smoothing`] and [`crate::transform`]. Pointing groups and the
//! per-record transform run on rayon parallel iterators; the only
//! synchronization is gathering per-pointing rows before the band median.
//!
//! Failure handling follows the error taxonomy: bad pointings are skipped
//! and reported in the [`BandOutcome`], a band without usable statistics
//! fails as a whole, and one band's failure never affects another band.

use crate::catalog::{FieldStatistics, FluxRecord, GlobalSmoothing, HyperbolicMagnitude};
use crate::config::PipelineConfig;
use crate::error::{BandError, ConfigError, FieldStatisticsError};
use crate::field;
use crate::smoothing;
use crate::transform::{self, TransformError};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};

/// A pointing excluded from a band's statistics, with the typed reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPointing {
    /// Pointing identifier.
    pub pointing: String,
    /// Why its statistics were unusable.
    pub reason: FieldStatisticsError,
}

/// Everything one band produces.
#[derive(Debug, Clone)]
pub struct BandOutcome {
    /// Band identifier.
    pub band: String,
    /// Valid per-pointing statistics rows (exportable for reuse).
    pub statistics: Vec<FieldStatistics>,
    /// Pointings excluded from the aggregate, with reasons.
    pub skipped: Vec<SkippedPointing>,
    /// The smoothing parameter actually used for the transform (the band
    /// median, or the survey-wide value under shared smoothing).
    pub smoothing: GlobalSmoothing,
    /// One entry per input record, in input order. `None` for records of
    /// other bands, records with negative or non-finite flux errors, and
    /// records of skipped pointings; the I/O layer picks its own sentinel
    /// for those rows.
    pub magnitudes: Vec<Option<HyperbolicMagnitude>>,
}

/// Valid and skipped statistics of one band, before aggregation.
struct BandStatistics {
    statistics: Vec<FieldStatistics>,
    skipped: Vec<SkippedPointing>,
}

/// Process one band end to end.
///
/// Configuration validation happens in [`process_catalog`]; callers using
/// this entry point directly are expected to pass a validated config.
///
/// # Returns
/// * `Err(BandError::NoMatchingRecords)` - no input record has this band
/// * `Err(BandError::NoValidFieldStatistics)` - every pointing failed
/// * other `BandError` values per the taxonomy
pub fn process_band(
    records: &[FluxRecord],
    band: &str,
    config: &PipelineConfig,
) -> Result<BandOutcome, BandError> {
    let phase = band_statistics(records, band, config)?;
    let global = smoothing::global_smoothing(band, &phase.statistics)?;
    finish_band(records, band, config, phase, global)
}

/// Process every configured band over one record set.
///
/// The configuration is validated once, up front. Bands are independent:
/// the result carries one `(band, Result)` pair per configured band, in
/// configuration order, so a failing band is reported without disturbing
/// the others.
///
/// With `shared_smoothing` enabled, all bands' statistics are computed
/// first, the per-band smoothing medians are collapsed into one survey-wide
/// value, and every band's transform then uses that shared value.
pub fn process_catalog(
    records: &[FluxRecord],
    config: &PipelineConfig,
) -> Result<Vec<(String, Result<BandOutcome, BandError>)>, ConfigError> {
    config.validate()?;

    if !config.shared_smoothing {
        let outcomes = config
            .bands
            .iter()
            .map(|band| {
                log::info!("processing band {band}");
                (band.clone(), process_band(records, band, config))
            })
            .collect();
        return Ok(outcomes);
    }

    // Shared smoothing needs every band's median before any transform runs.
    let mut phases: Vec<(String, Result<(BandStatistics, GlobalSmoothing), BandError>)> =
        Vec::with_capacity(config.bands.len());
    for band in &config.bands {
        log::info!("processing band {band}");
        let phase = band_statistics(records, band, config).and_then(|stats| {
            let global = smoothing::global_smoothing(band, &stats.statistics)?;
            Ok((stats, global))
        });
        phases.push((band.clone(), phase));
    }

    let per_band: Vec<GlobalSmoothing> = phases
        .iter()
        .filter_map(|(_, phase)| phase.as_ref().ok().map(|(_, global)| global.clone()))
        .collect();
    let survey = smoothing::survey_smoothing(&per_band);

    let outcomes = phases
        .into_iter()
        .map(|(band, phase)| {
            let outcome = phase.and_then(|(stats, band_global)| {
                // `survey` is present whenever at least one band succeeded,
                // which includes this one.
                let value = match survey {
                    Some(value) => value,
                    None => band_global.value(),
                };
                let shared = GlobalSmoothing::new(band.as_str(), value)?;
                finish_band(records, &band, config, stats, shared)
            });
            (band, outcome)
        })
        .collect();
    Ok(outcomes)
}

/// Group a band's records by pointing and derive (or look up) statistics.
fn band_statistics(
    records: &[FluxRecord],
    band: &str,
    config: &PipelineConfig,
) -> Result<BandStatistics, BandError> {
    let mut groups: BTreeMap<&str, Vec<&FluxRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.band == band) {
        groups.entry(record.pointing.as_str()).or_default().push(record);
    }
    if groups.is_empty() {
        return Err(BandError::NoMatchingRecords {
            band: band.to_string(),
        });
    }

    let mut statistics = Vec::with_capacity(groups.len());
    let mut skipped = Vec::new();

    if let Some(table) = &config.external_statistics {
        for pointing in groups.keys() {
            match table.get(band, pointing) {
                Some(row) => statistics.push(row.clone()),
                None => skipped.push(SkippedPointing {
                    pointing: (*pointing).to_string(),
                    reason: FieldStatisticsError::MissingStatistics,
                }),
            }
        }
    } else {
        let groups: Vec<(&str, Vec<&FluxRecord>)> = groups.into_iter().collect();
        let results: Vec<(&str, Result<FieldStatistics, FieldStatisticsError>)> = groups
            .par_iter()
            .map(|(pointing, group)| {
                (
                    *pointing,
                    field::field_statistics(pointing, band, group, config.zeropoint_source),
                )
            })
            .collect();

        for (pointing, result) in results {
            match result {
                Ok(row) => statistics.push(row),
                Err(reason) => skipped.push(SkippedPointing {
                    pointing: pointing.to_string(),
                    reason,
                }),
            }
        }
    }

    for skip in &skipped {
        log::warn!(
            "skipping pointing {} of band {band}: {}",
            skip.pointing,
            skip.reason
        );
    }

    Ok(BandStatistics { statistics, skipped })
}

/// Apply the magnitude transform to every record of the band.
fn finish_band(
    records: &[FluxRecord],
    band: &str,
    config: &PipelineConfig,
    phase: BandStatistics,
    global: GlobalSmoothing,
) -> Result<BandOutcome, BandError> {
    let BandStatistics { statistics, skipped } = phase;

    // Skipped pointings normally produce empty output rows; with fill-in
    // enabled their records are transformed against the band's mean
    // statistics instead.
    let fill_rows: Vec<FieldStatistics> = if config.fill_missing_statistics {
        match band_mean(band, &statistics) {
            Some(mean) => skipped
                .iter()
                .map(|skip| {
                    log::warn!(
                        "replacing statistics of pointing {} in band {band} with the band mean",
                        skip.pointing
                    );
                    FieldStatistics {
                        pointing: skip.pointing.clone(),
                        ..mean.clone()
                    }
                })
                .collect(),
            None => Vec::new(),
        }
    } else {
        Vec::new()
    };

    let lookup: HashMap<&str, &FieldStatistics> = statistics
        .iter()
        .chain(fill_rows.iter())
        .map(|row| (row.pointing.as_str(), row))
        .collect();

    let magnitudes = records
        .par_iter()
        .map(|record| {
            if record.band != band {
                return Ok(None);
            }
            let row = match lookup.get(record.pointing.as_str()) {
                Some(row) => *row,
                None => return Ok(None),
            };
            if !(record.flux_error >= 0.0) {
                // Negative or NaN uncertainty: mask the record.
                return Ok(None);
            }
            match transform::hyperbolic_magnitude(
                record.flux,
                record.flux_error,
                row.zeropoint,
                global.value(),
            ) {
                Ok(result) => Ok(Some(result)),
                Err(TransformError::NonPositiveSmoothingParameter { value }) => {
                    Err(BandError::NonPositiveSmoothingParameter {
                        band: band.to_string(),
                        value,
                    })
                }
                Err(TransformError::NonFiniteZeropoint { value }) => {
                    Err(BandError::NonFiniteZeropoint {
                        band: band.to_string(),
                        pointing: record.pointing.clone(),
                        value,
                    })
                }
            }
        })
        .collect::<Result<Vec<_>, BandError>>()?;

    Ok(BandOutcome {
        band: band.to_string(),
        statistics,
        skipped,
        smoothing: global,
        magnitudes,
    })
}

/// Column-wise mean of a band's statistics rows, used to stand in for
/// pointings without usable statistics. The caller sets the pointing id.
fn band_mean(band: &str, statistics: &[FieldStatistics]) -> Option<FieldStatistics> {
    if statistics.is_empty() {
        return None;
    }
    let n = statistics.len() as f64;
    let mean = |extract: fn(&FieldStatistics) -> f64| -> f64 {
        statistics.iter().map(extract).sum::<f64>() / n
    };
    Some(FieldStatistics {
        pointing: String::new(),
        band: band.to_string(),
        zeropoint: mean(|s| s.zeropoint),
        ref_flux: mean(|s| s.ref_flux),
        flux_error_median: mean(|s| s.flux_error_median),
        smoothing: mean(|s| s.smoothing),
        smoothing_absolute: mean(|s| s.smoothing_absolute),
    })
}
