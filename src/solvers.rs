//! Kepler's equation and conversions between the mean, eccentric and true anomalies.
//!
//! Everything here assumes a closed orbit (`0 <= e < 1`). Angles are in
//! radians.

use core::f64::consts::TAU;

use crate::{clamp_eccentricity, keplers_equation, keplers_equation_derivative};

/// The maximum number of Newton-Raphson iterations for the Kepler solver.
///
/// The solver does not report non-convergence; it returns whatever estimate
/// it holds once this cap is reached.
pub const KEPLER_MAX_ITERS: u32 = 15;

/// Step size below which the Newton-Raphson iteration is considered converged.
pub const KEPLER_STEP_TOLERANCE: f64 = 1e-10;

/// Solves Kepler's equation `M = E - e sin E` for the eccentric anomaly `E`.
///
/// The eccentricity is clamped into `[0, 0.99]` before solving.
/// The mean anomaly is used as-is as the initial guess, so callers that
/// propagate over many revolutions should reduce it into `[0, tau)` first
/// (the orbit getters in this crate already do).
///
/// # Convergence
/// Newton-Raphson with `E_0 = M`, at most [`KEPLER_MAX_ITERS`] iterations,
/// stopping early once a step falls under [`KEPLER_STEP_TOLERANCE`].
/// There is no failure signal. For eccentricities approaching 1 the cap may be
/// hit before full convergence and the best estimate so far is returned.
///
/// # Example
/// ```
/// use neo_sim::solvers::solve_eccentric_anomaly;
///
/// let e = 0.3;
/// let mean_anomaly = 1.2;
/// let ecc_anomaly = solve_eccentric_anomaly(mean_anomaly, e);
///
/// let residual = ecc_anomaly - e * ecc_anomaly.sin() - mean_anomaly;
/// assert!(residual.abs() < 1e-10);
/// ```
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    let eccentricity = clamp_eccentricity(eccentricity);
    let mut eccentric_anomaly = mean_anomaly;

    for _ in 0..KEPLER_MAX_ITERS {
        let step = keplers_equation(mean_anomaly, eccentric_anomaly, eccentricity)
            / keplers_equation_derivative(eccentric_anomaly, eccentricity);
        eccentric_anomaly -= step;

        if step.abs() < KEPLER_STEP_TOLERANCE {
            break;
        }
    }

    eccentric_anomaly
}

/// Gets the true anomaly for an eccentric anomaly on an ellipse.
///
/// `nu = atan2(sqrt(1 - e^2) sin E, cos E - e)`, in `(-pi, pi]`.
pub fn true_anomaly_at_eccentric_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    let root = (1.0 - eccentricity * eccentricity).sqrt();

    (root * sin_e).atan2(cos_e - eccentricity)
}

/// Gets the eccentric anomaly for a true anomaly on an ellipse.
///
/// Inverse of [`true_anomaly_at_eccentric_anomaly`], in `(-pi, pi]`.
pub fn eccentric_anomaly_at_true_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    let root = (1.0 - eccentricity * eccentricity).sqrt();

    (root * sin_nu).atan2(eccentricity + cos_nu)
}

/// Gets the mean anomaly for an eccentric anomaly (Kepler's equation, forward).
#[inline]
pub fn mean_anomaly_at_eccentric_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - eccentricity * eccentric_anomaly.sin()
}

/// Gets the mean anomaly for a true anomaly, reduced into `[0, tau)`.
pub fn mean_anomaly_at_true_anomaly(true_anomaly: f64, eccentricity: f64) -> f64 {
    let eccentric_anomaly = eccentric_anomaly_at_true_anomaly(true_anomaly, eccentricity);
    wrap_radians(mean_anomaly_at_eccentric_anomaly(
        eccentric_anomaly,
        eccentricity,
    ))
}

/// Reduces an angle in radians into `[0, tau)`.
pub fn wrap_radians(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly tau for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}
