use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{clamp_eccentricity, Matrix3x2, OrbitTrait, EARTH_MEAN_MOTION};

/// A struct representing an orbit confined to the reference plane with its
/// perihelion on the +X axis.
///
/// This is the 2D display mode: inclination, longitude of ascending node and
/// argument of perihelion are all zero, so the perifocal frame *is* the
/// inertial frame and no rotation is applied.
///
/// # Example
/// ```
/// use glam::DVec2;
/// use neo_sim::{Orbit2D, OrbitTrait};
///
/// let orbit = Orbit2D::new(2.0, 0.5, 0.0, 0.01);
///
/// // Perihelion lies on +X, at a(1 - e)
/// assert_eq!(orbit.get_planar_position_at_mean_anomaly(0.0), DVec2::new(1.0, 0.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orbit2D {
    /// The semi-major axis of the orbit, in AU.
    semi_major_axis: f64,

    /// The eccentricity of the orbit, kept within `[0, 0.99]`.
    eccentricity: f64,

    /// The mean anomaly at orbit epoch, in radians.
    mean_anomaly: f64,

    /// The mean motion, in radians per day.
    mean_motion: f64,
}

impl Orbit2D {
    /// Creates a new planar orbit.
    ///
    /// ### Parameters
    /// - `semi_major_axis`: The semi-major axis of the orbit, in AU.
    /// - `eccentricity`: The eccentricity, clamped into `[0, 0.99]`.
    /// - `mean_anomaly`: The mean anomaly at epoch, in radians.
    /// - `mean_motion`: The mean motion, in radians per day.
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        mean_anomaly: f64,
        mean_motion: f64,
    ) -> Self {
        Self {
            semi_major_axis,
            eccentricity: clamp_eccentricity(eccentricity),
            mean_anomaly,
            mean_motion,
        }
    }

    /// Gets the in-plane position at a given mean anomaly, in AU.
    pub fn get_planar_position_at_mean_anomaly(&self, mean_anomaly: f64) -> DVec2 {
        let eccentric_anomaly = self.get_eccentric_anomaly_at_mean_anomaly(mean_anomaly);
        self.get_pqw_position_at_eccentric_anomaly(eccentric_anomaly)
    }

    /// Gets the in-plane position some days after the epoch, in AU.
    pub fn get_planar_position_at_time(&self, elapsed_days: f64) -> DVec2 {
        self.get_planar_position_at_mean_anomaly(self.get_mean_anomaly_at_time(elapsed_days))
    }
}

impl OrbitTrait for Orbit2D {
    fn get_semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    fn get_eccentricity(&self) -> f64 {
        self.eccentricity
    }

    fn get_mean_anomaly_at_epoch(&self) -> f64 {
        self.mean_anomaly
    }

    fn get_mean_motion(&self) -> f64 {
        self.mean_motion
    }

    fn get_transformation_matrix(&self) -> Matrix3x2 {
        Matrix3x2::IDENTITY
    }
}

impl Default for Orbit2D {
    /// Creates a circular 1 AU orbit moving at the Earth's mean motion.
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, EARTH_MEAN_MOTION)
    }
}
