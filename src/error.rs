//! Error taxonomy of the estimation pipeline.
//!
//! Three scopes, matching how failures are recovered:
//!
//! - [`FieldStatisticsError`]: one pointing's statistics are unusable. The
//!   pipeline reports and skips the pointing; the rest of the band proceeds.
//! - [`BandError`]: the whole band cannot produce magnitudes. Surfaced to
//!   the caller; other bands are unaffected.
//! - [`ConfigError`]: rejected at the pipeline boundary before any
//!   computation starts.

use thiserror::Error;

/// Per-pointing statistical failures. Recovered locally: the pointing is
/// excluded from the band aggregate and reported, never silently dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldStatisticsError {
    /// The group holds no record with positive flux.
    #[error("no record with positive flux")]
    InsufficientPositiveFlux,

    /// A zeropoint was requested from observed magnitudes, but no
    /// positive-flux record carries one.
    #[error("no positive-flux record carries a classical magnitude")]
    InsufficientMagnitudePairing,

    /// The group's records carry no magnitudes at all and no fixed
    /// zeropoint is configured.
    #[error("records carry no magnitudes and no fixed zeropoint is configured")]
    MissingZeropointSource,

    /// The derived smoothing parameter is not positive, signaling a
    /// degenerate flux-error distribution.
    #[error("derived smoothing parameter {value} is not positive")]
    NonPositiveSmoothingParameter {
        /// The offending value.
        value: f64,
    },

    /// No statistics row is available for the pointing in the supplied
    /// table.
    #[error("no statistics row available for the pointing")]
    MissingStatistics,
}

/// Per-band failures. Fatal for the band — without a global smoothing
/// parameter no magnitude can be computed — but never abort other bands.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BandError {
    /// No input record matches the requested band.
    #[error("no records matched band {band}")]
    NoMatchingRecords {
        /// Requested band.
        band: String,
    },

    /// Every pointing of the band failed its statistics computation.
    #[error("no pointing of band {band} produced valid field statistics")]
    NoValidFieldStatistics {
        /// Affected band.
        band: String,
    },

    /// The band-global smoothing parameter is not a positive finite number.
    #[error("global smoothing parameter {value} for band {band} is not positive")]
    NonPositiveSmoothingParameter {
        /// Affected band.
        band: String,
        /// The offending value.
        value: f64,
    },

    /// A pointing's zeropoint is not finite at transform time. Only
    /// reachable through an externally supplied statistics path; computed
    /// zeropoints are finite by construction.
    #[error("zeropoint {value} of pointing {pointing} in band {band} is not finite")]
    NonFiniteZeropoint {
        /// Affected band.
        band: String,
        /// Affected pointing.
        pointing: String,
        /// The offending value.
        value: f64,
    },
}

/// Configuration and consistency failures, reported before any computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The band list is empty.
    #[error("band list is empty")]
    EmptyBandList,

    /// The same band appears more than once in the band list.
    #[error("band {band} appears more than once in the band list")]
    DuplicateBand {
        /// Repeated band identifier.
        band: String,
    },

    /// A fixed zeropoint must be a finite number.
    #[error("fixed zeropoint {value} is not finite")]
    NonFiniteFixedZeropoint {
        /// The offending value.
        value: f64,
    },

    /// An externally supplied statistics row failed validation.
    #[error("statistics row for pointing {pointing} of band {band} is invalid: {reason}")]
    InvalidStatisticsRow {
        /// Band of the offending row.
        band: String,
        /// Pointing of the offending row.
        pointing: String,
        /// What was wrong with it.
        reason: String,
    },

    /// Two statistics rows share the same (band, pointing) key.
    #[error("duplicate statistics row for pointing {pointing} of band {band}")]
    DuplicateStatisticsRow {
        /// Band of the offending rows.
        band: String,
        /// Pointing of the offending rows.
        pointing: String,
    },
}
