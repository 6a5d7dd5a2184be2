//! The hyperbolic magnitude transform and zeropoint helpers.
//!
//! Classical (Pogson) magnitudes diverge as flux approaches zero and are
//! undefined for negative flux. The hyperbolic magnitude replaces the
//! logarithm with an inverse hyperbolic sine, which is logarithmic at high
//! signal-to-noise and smoothly linear through zero, so every measured flux
//! maps to a finite, well-defined magnitude.
//!
//! All functions here are pure and stateless; per-record application is
//! embarrassingly parallel.

use crate::catalog::HyperbolicMagnitude;
use thiserror::Error;

/// Pogson's ratio, `2.5 * log10(e)`.
///
/// The single scale constant of the magnitude system. Used consistently by
/// zeropoint estimation, smoothing-parameter derivation, the transform, and
/// cross-survey rescaling; mixing two values of it silently corrupts every
/// downstream magnitude.
pub const POGSON: f64 = 2.5 * std::f64::consts::LOG10_E;

/// Errors from the pure magnitude transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The smoothing parameter must be strictly positive.
    #[error("smoothing parameter {value} is not positive")]
    NonPositiveSmoothingParameter {
        /// Offending smoothing value.
        value: f64,
    },

    /// The photometric zeropoint must be finite.
    #[error("zeropoint {value} is not finite")]
    NonFiniteZeropoint {
        /// Offending zeropoint value.
        value: f64,
    },
}

/// Reference flux of a photometric system: the flux of a zeroth-magnitude
/// source, `f0 = exp(m0 / POGSON)`.
pub fn ref_flux_from_zeropoint(zeropoint: f64) -> f64 {
    (zeropoint / POGSON).exp()
}

/// Zeropoint corresponding to a reference flux, `m0 = POGSON * ln(f0)`.
/// Inverse of [`ref_flux_from_zeropoint`].
pub fn zeropoint_from_ref_flux(ref_flux: f64) -> f64 {
    POGSON * ref_flux.ln()
}

/// Compute the hyperbolic magnitude and its uncertainty for one flux
/// measurement.
///
/// The flux is normalised by the pointing's reference flux,
/// `x = f / f0`, and mapped through
///
/// `mu = POGSON * (asinh(x / (2 b)) + ln b) + m0`
///
/// with uncertainty
///
/// `d_mu = POGSON * dx / sqrt(x^2 + 4 b^2)`.
///
/// The result is finite for every finite flux, including zero and negative
/// values, and strictly increasing in flux. At extreme flux ratios the
/// magnitude saturates to the correctly signed infinity instead of erroring:
/// the transform is defined in the limit, so saturation is the faithful
/// answer for values beyond `f64` range.
///
/// # Arguments
/// * `flux` - Measured flux, any real value
/// * `flux_error` - Flux uncertainty, expected `>= 0` (a zero error yields a
///   zero magnitude error)
/// * `zeropoint` - The pointing's photometric zeropoint, must be finite
/// * `smoothing` - Band-global smoothing parameter, must be `> 0`
///
/// # Returns
/// * `Ok(HyperbolicMagnitude)` - Magnitude and uncertainty
/// * `Err(TransformError)` - Non-positive smoothing or non-finite zeropoint
pub fn hyperbolic_magnitude(
    flux: f64,
    flux_error: f64,
    zeropoint: f64,
    smoothing: f64,
) -> Result<HyperbolicMagnitude, TransformError> {
    if !(smoothing > 0.0) {
        return Err(TransformError::NonPositiveSmoothingParameter { value: smoothing });
    }
    if !zeropoint.is_finite() {
        return Err(TransformError::NonFiniteZeropoint { value: zeropoint });
    }

    let ref_flux = ref_flux_from_zeropoint(zeropoint);
    let x = flux / ref_flux;
    let x_error = flux_error / ref_flux;

    let magnitude = POGSON * ((x / (2.0 * smoothing)).asinh() + smoothing.ln()) + zeropoint;
    let magnitude_error = POGSON * x_error / (x * x + 4.0 * smoothing * smoothing).sqrt();

    Ok(HyperbolicMagnitude {
        magnitude,
        magnitude_error,
    })
}
