//! # luptitude
//!
//! Hyperbolic (asinh) magnitudes for survey photometry.
//!
//! Classical magnitudes blow up as flux approaches zero and are undefined
//! for negative flux, which makes them useless for the faint end of a deep
//! catalog. The hyperbolic magnitude replaces the logarithm with an inverse
//! hyperbolic sine: logarithmic at high signal-to-noise, linear through
//! zero, finite everywhere. The transition point is set by a smoothing
//! parameter derived from the survey's own flux-error statistics.
//!
//! The crate is the statistical core of that conversion:
//!
//! 1. **Field statistics** ([`field`]) — per (pointing, band) group,
//!    estimate the photometric zeropoint from observed magnitudes (or adopt
//!    a fixed one), take the median flux error, and derive the pointing's
//!    smoothing parameter.
//! 2. **Global smoothing** ([`smoothing`]) — the median of the per-pointing
//!    parameters gives one robust smoothing value per band; parameters can
//!    be rescaled exactly between different zeropoint conventions when
//!    importing statistics from another survey.
//! 3. **Transform** ([`transform`]) — the pure flux → (magnitude,
//!    uncertainty) mapping, well-defined for zero and negative flux.
//!
//! The [`pipeline`] module wires the stages together per band, skipping and
//! reporting pointings with unusable data. File formats, CLI parsing and
//! plotting are deliberately out of scope: inputs and outputs are plain
//! serde-friendly records.
//!
//! ## Example
//!
//! ```
//! use luptitude::{process_catalog, FluxRecord, PipelineConfig, ZeropointSource};
//!
//! let records = vec![
//!     FluxRecord {
//!         pointing: "p1".into(),
//!         band: "r".into(),
//!         flux: 100.0,
//!         flux_error: 5.0,
//!         magnitude: Some(20.0),
//!     },
//!     // A marginal detection: negative flux still gets a finite magnitude.
//!     FluxRecord {
//!         pointing: "p1".into(),
//!         band: "r".into(),
//!         flux: -3.2,
//!         flux_error: 5.1,
//!         magnitude: None,
//!     },
//! ];
//!
//! let config = PipelineConfig {
//!     zeropoint_source: ZeropointSource::ObservedMagnitude,
//!     bands: vec!["r".into()],
//!     external_statistics: None,
//!     shared_smoothing: false,
//!     fill_missing_statistics: false,
//! };
//!
//! let outcomes = process_catalog(&records, &config).unwrap();
//! let (band, outcome) = &outcomes[0];
//! let outcome = outcome.as_ref().unwrap();
//! assert_eq!(band, "r");
//! assert!(outcome.magnitudes[1].unwrap().magnitude.is_finite());
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod field;
pub mod pipeline;
pub mod smoothing;
pub mod stats;
pub mod transform;

pub use catalog::{
    FieldStatistics, FieldStatisticsTable, FluxRecord, GlobalSmoothing, HyperbolicMagnitude,
};
pub use config::{PipelineConfig, ZeropointSource};
pub use error::{BandError, ConfigError, FieldStatisticsError};
pub use pipeline::{process_band, process_catalog, BandOutcome, SkippedPointing};
pub use transform::{
    hyperbolic_magnitude, ref_flux_from_zeropoint, zeropoint_from_ref_flux, TransformError, POGSON,
};
