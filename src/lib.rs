//! # Near-Earth Object Orbit and Deflection Core
//! This library crate contains the orbital-mechanics and impact-physics logic
//! behind a near-Earth-object (NEO) visualizer: where an asteroid is, how close
//! it passes the Earth, what a kinetic impactor does to its orbit, and how much
//! energy it would deliver if it hit.
//!
//! Everything here is a two-body, on-rails model. Positions come straight from
//! orbital elements via Kepler's equation; nothing is integrated step by step,
//! and nothing is perturbed by other bodies. Several of the models (the
//! speed-to-eccentricity proxy, crater size, blast effects) are deliberately
//! illustrative and are exposed as traits so they can be swapped out.
//!
//! ## Getting started
//! The crate is organized leaf-first:
//! - [`solvers`]: the Newton-Raphson Kepler solver and anomaly conversions.
//! - [`Orbit`] and [`Orbit2D`]: orbits that turn a mean anomaly into a position,
//!   through the shared [`OrbitTrait`].
//! - [`OrbitalElementSet`]: the immutable element snapshot that upstream data
//!   arrives in, and the bridge into [`Orbit`].
//! - [`sampler`]: orbit-shape polylines and time-indexed trajectories.
//! - [`encounter`]: Julian dates, the circular Earth model, and miss distances.
//! - [`deflection`]: the impulsive kinetic-impactor scenario.
//! - [`impact`]: mass, kinetic energy, TNT equivalent and crater estimates.
//! - [`Population`]: batch propagation of many bodies.
//! - [`SimConfig`]: tunables such as the mission success threshold.
//!
//! ## Units
//! Inside the orbital core, lengths are in AU, angles in radians and time in
//! days. Element snapshots keep the units of the upstream data (degrees,
//! degrees per day, Julian Dates).
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec3;
//!
//! use neo_sim::{Orbit, OrbitTrait};
//!
//! # fn main() {
//! // A circular orbit with a radius of 1 AU
//! let orbit = Orbit::default();
//! assert_eq!(orbit.get_position_at_mean_anomaly(0.0), DVec3::new(1.0, 0.0, 0.0));
//! # }
//! ```

#![warn(missing_docs)]

mod body;
mod cached_orbit;
pub mod config;
pub mod deflection;
mod dim2;
mod elements;
pub mod encounter;
pub mod impact;
mod population;
pub mod sampler;
pub mod solvers;

use core::f64::consts::TAU;
use glam::{DVec2, DVec3};

pub use body::{ApproachEvent, CelestialBody};
pub use cached_orbit::Orbit;
pub use config::SimConfig;
pub use dim2::Orbit2D;
pub use elements::{OrbitalElementSet, RawElements};
pub use population::{BodyPosition, BodyShape, Population, PopulationError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Kilometers in one astronomical unit.
pub const AU_KM: f64 = 149_597_870.7;

/// The Julian Date of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// The Julian Date of the J2000 epoch.
pub const J2000_JD: f64 = 2_451_545.0;

/// Milliseconds in one day.
pub const MS_PER_DAY: f64 = 86_400_000.0;

/// Days in one Julian year; the period of the simplified Earth orbit.
pub const EARTH_YEAR_DAYS: f64 = 365.25;

/// Mean motion of the simplified Earth orbit, in radians per day.
pub const EARTH_MEAN_MOTION: f64 = TAU / EARTH_YEAR_DAYS;

/// The Gaussian gravitational constant expressed in degrees per day.
///
/// This is the mean motion of a massless body on a 1 AU orbit around the Sun.
pub const GAUSSIAN_MEAN_MOTION_DEG: f64 = 0.985_607_668_6;

/// The largest eccentricity accepted by the Kepler solver.
///
/// Eccentricities above this are clamped before any solve.
pub const MAX_ECCENTRICITY: f64 = 0.99;

/// A struct representing a 3x2 matrix.
///
/// This struct is used to store the transformation matrix
/// for transforming a 2D perifocal vector into a 3D vector.
///
/// Namely, it is used in the [`transform_pqw_vector`][OrbitTrait::transform_pqw_vector]
/// method to tilt a 2D position into 3D, using the orbital parameters.
///
/// Each element is named `eXY`, where `X` is the row and `Y` is the column.
///
/// # Example
/// ```
/// use glam::{DVec2, DVec3};
///
/// use neo_sim::Matrix3x2;
///
/// let matrix = Matrix3x2 {
///    e11: 1.0, e12: 0.0,
///    e21: 0.0, e22: 1.0,
///    e31: 0.0, e32: 0.0,
/// };
///
/// let vec = DVec2::new(1.0, 2.0);
///
/// let result = matrix.dot_vec(vec);
///
/// assert_eq!(result, DVec3::new(1.0, 2.0, 0.0));
/// ```
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Matrix3x2 {
    // Element XY
    pub e11: f64,
    pub e12: f64,
    pub e21: f64,
    pub e22: f64,
    pub e31: f64,
    pub e32: f64,
}

impl Matrix3x2 {
    /// The matrix that maps the perifocal plane onto the XY plane unchanged.
    pub const IDENTITY: Self = Self {
        e11: 1.0,
        e12: 0.0,
        e21: 0.0,
        e22: 1.0,
        e31: 0.0,
        e32: 0.0,
    };

    /// Builds the perifocal-to-inertial rotation for the given orientation.
    ///
    /// All angles are in radians:
    /// - `inclination`: `i`
    /// - `arg_pe`: the argument of perihelion, `ω`
    /// - `long_asc_node`: the longitude of the ascending node, `Ω`
    pub fn from_orientation(inclination: f64, arg_pe: f64, long_asc_node: f64) -> Self {
        let (sin_inc, cos_inc) = inclination.sin_cos();
        let (sin_arg_pe, cos_arg_pe) = arg_pe.sin_cos();
        let (sin_lan, cos_lan) = long_asc_node.sin_cos();

        Self {
            e11: cos_lan * cos_arg_pe - sin_lan * sin_arg_pe * cos_inc,
            e12: -cos_lan * sin_arg_pe - sin_lan * cos_arg_pe * cos_inc,
            e21: sin_lan * cos_arg_pe + cos_lan * sin_arg_pe * cos_inc,
            e22: -sin_lan * sin_arg_pe + cos_lan * cos_arg_pe * cos_inc,
            e31: sin_arg_pe * sin_inc,
            e32: cos_arg_pe * sin_inc,
        }
    }

    /// Computes a dot product between this matrix and a 2D vector.
    ///
    /// # Example
    /// ```
    /// use glam::{DVec2, DVec3};
    ///
    /// use neo_sim::Matrix3x2;
    ///
    /// let matrix = Matrix3x2 {
    ///     e11: 1.0, e12: 0.0,
    ///     e21: 0.0, e22: 1.0,
    ///     e31: 1.0, e32: 1.0,
    /// };
    ///
    /// let vec = DVec2::new(1.0, 2.0);
    ///
    /// let result = matrix.dot_vec(vec);
    ///
    /// assert_eq!(result, DVec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn dot_vec(&self, vec: DVec2) -> DVec3 {
        DVec3::new(
            vec.x * self.e11 + vec.y * self.e12,
            vec.x * self.e21 + vec.y * self.e22,
            vec.x * self.e31 + vec.y * self.e32,
        )
    }
}

/// The state of a body at one instant on its orbit.
///
/// Unlike a full state vector this carries no velocity; the anomalies
/// are what the deflection phase-matching needs.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitState {
    /// The inertial position, in AU.
    pub position: DVec3,
    /// The eccentric anomaly, in radians.
    pub eccentric_anomaly: f64,
    /// The true anomaly, in radians, in `(-pi, pi]`.
    pub true_anomaly: f64,
    /// The heliocentric distance, in AU.
    pub radius: f64,
}

/// A trait that defines the methods that a closed Keplerian orbit must implement.
///
/// This trait is implemented by both [`Orbit`] and [`Orbit2D`].
///
/// # Example
/// ```
/// use neo_sim::{Orbit, Orbit2D, OrbitTrait};
///
/// fn accepts_orbit(orbit: &impl OrbitTrait) {
///     println!("That's an orbit!");
/// }
///
/// fn main() {
///     let orbit = Orbit::default();
///     accepts_orbit(&orbit);
///
///     let planar = Orbit2D::default();
///     accepts_orbit(&planar);
/// }
/// ```
///
/// This example will fail to compile:
///
/// ```compile_fail
/// # use neo_sim::{Orbit, Orbit2D, OrbitTrait};
/// #
/// # fn accepts_orbit(orbit: &impl OrbitTrait) {
/// #     println!("That's an orbit!");
/// # }
/// #
/// # fn main() {
/// #     let orbit = Orbit::default();
/// #     accepts_orbit(&orbit);
/// #
/// #     let planar = Orbit2D::default();
/// #     accepts_orbit(&planar);
/// let not_orbit = (0.0, 1.0);
/// accepts_orbit(&not_orbit);
/// # }
/// ```
pub trait OrbitTrait {
    /// Gets the semi-major axis of the orbit, in AU.
    fn get_semi_major_axis(&self) -> f64;

    /// Gets the eccentricity of the orbit.
    ///
    /// Implementors keep this within `[0, 0.99]`.
    fn get_eccentricity(&self) -> f64;

    /// Gets the mean anomaly at the orbit's epoch, in radians.
    fn get_mean_anomaly_at_epoch(&self) -> f64;

    /// Gets the mean motion, in radians per day.
    fn get_mean_motion(&self) -> f64;

    /// Gets the matrix that rotates perifocal vectors into the inertial frame.
    fn get_transformation_matrix(&self) -> Matrix3x2;

    /// Gets the semi-latus rectum of the orbit, in AU.
    ///
    /// `p = a(1 - e^2)`
    fn get_semi_latus_rectum(&self) -> f64 {
        let e = self.get_eccentricity();
        self.get_semi_major_axis() * (1.0 - e * e)
    }

    /// Gets the perihelion distance, in AU.
    fn get_perihelion(&self) -> f64 {
        self.get_semi_major_axis() * (1.0 - self.get_eccentricity())
    }

    /// Gets the aphelion distance, in AU.
    fn get_aphelion(&self) -> f64 {
        self.get_semi_major_axis() * (1.0 + self.get_eccentricity())
    }

    /// Gets the orbital period, in days.
    ///
    /// Returns infinity when the mean motion is zero.
    fn get_orbital_period(&self) -> f64 {
        TAU / self.get_mean_motion()
    }

    /// Gets the mean anomaly after some days past the epoch, in radians.
    ///
    /// The result is not wrapped.
    fn get_mean_anomaly_at_time(&self, elapsed_days: f64) -> f64 {
        self.get_mean_anomaly_at_epoch() + self.get_mean_motion() * elapsed_days
    }

    /// Gets the eccentric anomaly at a given mean anomaly.
    ///
    /// The mean anomaly is reduced into `[0, tau)` and then handed to
    /// [`solve_eccentric_anomaly`][solvers::solve_eccentric_anomaly].
    fn get_eccentric_anomaly_at_mean_anomaly(&self, mean_anomaly: f64) -> f64 {
        solvers::solve_eccentric_anomaly(
            solvers::wrap_radians(mean_anomaly),
            self.get_eccentricity(),
        )
    }

    /// Gets the true anomaly at a given eccentric anomaly, in `(-pi, pi]`.
    fn get_true_anomaly_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> f64 {
        solvers::true_anomaly_at_eccentric_anomaly(eccentric_anomaly, self.get_eccentricity())
    }

    /// Gets the eccentric anomaly at a given true anomaly, in `(-pi, pi]`.
    fn get_eccentric_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        solvers::eccentric_anomaly_at_true_anomaly(true_anomaly, self.get_eccentricity())
    }

    /// Gets the mean anomaly at a given true anomaly, in `[0, tau)`.
    fn get_mean_anomaly_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        solvers::mean_anomaly_at_true_anomaly(true_anomaly, self.get_eccentricity())
    }

    /// Gets the heliocentric distance at a given true anomaly, in AU.
    ///
    /// This is the polar conic equation `r = p / (1 + e cos(nu))`.
    fn get_altitude_at_true_anomaly(&self, true_anomaly: f64) -> f64 {
        self.get_semi_latus_rectum() / (1.0 + self.get_eccentricity() * true_anomaly.cos())
    }

    /// Gets the heliocentric distance at a given eccentric anomaly, in AU.
    ///
    /// `r = a(1 - e cos(E))`
    fn get_altitude_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> f64 {
        self.get_semi_major_axis() * (1.0 - self.get_eccentricity() * eccentric_anomaly.cos())
    }

    /// Gets the perifocal position at a given eccentric anomaly, in AU.
    ///
    /// `x = a(cos E - e)`, `y = a sqrt(1 - e^2) sin E`
    fn get_pqw_position_at_eccentric_anomaly(&self, eccentric_anomaly: f64) -> DVec2 {
        let a = self.get_semi_major_axis();
        let e = self.get_eccentricity();
        let (sin_e, cos_e) = eccentric_anomaly.sin_cos();

        DVec2::new(a * (cos_e - e), a * (1.0 - e * e).sqrt() * sin_e)
    }

    /// Gets the perifocal position at a given true anomaly, in AU.
    fn get_pqw_position_at_true_anomaly(&self, true_anomaly: f64) -> DVec2 {
        let altitude = self.get_altitude_at_true_anomaly(true_anomaly);
        let (sin, cos) = true_anomaly.sin_cos();
        DVec2::new(altitude * cos, altitude * sin)
    }

    /// Rotates a perifocal vector into the inertial frame.
    fn transform_pqw_vector(&self, position: DVec2) -> DVec3 {
        self.get_transformation_matrix().dot_vec(position)
    }

    /// Gets the inertial position at a given true anomaly, in AU.
    fn get_position_at_true_anomaly(&self, true_anomaly: f64) -> DVec3 {
        self.transform_pqw_vector(self.get_pqw_position_at_true_anomaly(true_anomaly))
    }

    /// Gets the full [`OrbitState`] at a given mean anomaly.
    ///
    /// # Example
    /// ```
    /// use neo_sim::{Orbit, OrbitTrait};
    ///
    /// let orbit = Orbit::new(1.5, 0.3, 0.0, 0.0, 0.0, 0.0, 0.01);
    /// let state = orbit.get_state_at_mean_anomaly(45_f64.to_radians());
    ///
    /// let conic = orbit.get_altitude_at_true_anomaly(state.true_anomaly);
    /// assert!((state.radius - conic).abs() / conic < 1e-6);
    /// ```
    fn get_state_at_mean_anomaly(&self, mean_anomaly: f64) -> OrbitState {
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly);
        let pqw = self.get_pqw_position_at_eccentric_anomaly(eccentric_anomaly);

        OrbitState {
            position: self.transform_pqw_vector(pqw),
            eccentric_anomaly,
            true_anomaly: self.get_true_anomaly_at_eccentric_anomaly(eccentric_anomaly),
            radius: self.get_altitude_at_eccentric_anomaly(eccentric_anomaly),
        }
    }

    /// Gets the inertial position at a given mean anomaly, in AU.
    fn get_position_at_mean_anomaly(&self, mean_anomaly: f64) -> DVec3 {
        self.get_state_at_mean_anomaly(mean_anomaly).position
    }

    /// Gets the [`OrbitState`] some days after the epoch.
    fn get_state_at_time(&self, elapsed_days: f64) -> OrbitState {
        self.get_state_at_mean_anomaly(self.get_mean_anomaly_at_time(elapsed_days))
    }

    /// Gets the inertial position some days after the epoch, in AU.
    fn get_position_at_time(&self, elapsed_days: f64) -> DVec3 {
        self.get_state_at_time(elapsed_days).position
    }
}

/// Reduces an angle in degrees into `[0, 360)`.
///
/// Negative remainders are shifted up by a full turn.
///
/// # Example
/// ```
/// use neo_sim::wrap_degrees;
///
/// assert_eq!(wrap_degrees(-10.0), 350.0);
/// assert_eq!(wrap_degrees(370.0), 10.0);
/// ```
pub fn wrap_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    let wrapped = if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    };

    // -1e-20 + 360.0 rounds to 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Clamps an eccentricity into the range the Kepler solver accepts, `[0, 0.99]`.
///
/// NaN is mapped to zero.
pub fn clamp_eccentricity(eccentricity: f64) -> f64 {
    if eccentricity.is_nan() {
        return 0.0;
    }
    eccentricity.clamp(0.0, MAX_ECCENTRICITY)
}

/// Gets the mean motion of a heliocentric orbit from its semi-major axis,
/// in degrees per day (Kepler's third law).
pub fn heliocentric_mean_motion_deg(semi_major_axis_au: f64) -> f64 {
    GAUSSIAN_MEAN_MOTION_DEG * semi_major_axis_au.powf(-1.5)
}

#[cfg(test)]
mod tests;

#[inline]
fn keplers_equation(mean_anomaly: f64, eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    eccentric_anomaly - (eccentricity * eccentric_anomaly.sin()) - mean_anomaly
}
#[inline]
fn keplers_equation_derivative(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    1.0 - (eccentricity * eccentric_anomaly.cos())
}
