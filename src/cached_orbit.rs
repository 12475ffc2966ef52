#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{clamp_eccentricity, Matrix3x2, OrbitTrait, EARTH_MEAN_MOTION};

/// A struct representing a closed heliocentric orbit with a cached rotation.
///
/// The perifocal-to-inertial rotation only depends on the orientation angles,
/// so it is computed once on construction (and whenever an orientation angle
/// is changed) instead of on every position query.
///
/// # Example
/// ```
/// use neo_sim::{Orbit, OrbitTrait};
///
/// let orbit = Orbit::new(
///     // Semi-major axis, in AU
///     1.458,
///
///     // Eccentricity
///     0.223,
///
///     // Inclination
///     10.83_f64.to_radians(),
///
///     // Argument of perihelion
///     178.9_f64.to_radians(),
///
///     // Longitude of ascending node
///     304.3_f64.to_radians(),
///
///     // Mean anomaly at epoch
///     0.0,
///
///     // Mean motion, in radians per day
///     0.5598_f64.to_radians(),
/// );
///
/// assert!(orbit.get_perihelion() < orbit.get_aphelion());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Orbit {
    /// The semi-major axis of the orbit, in AU.
    semi_major_axis: f64,

    /// The eccentricity of the orbit, kept within `[0, 0.99]`.
    eccentricity: f64,

    /// The inclination of the orbit, in radians.
    inclination: f64,

    /// The argument of perihelion of the orbit, in radians.
    arg_pe: f64,

    /// The longitude of ascending node of the orbit, in radians.
    long_asc_node: f64,

    /// The mean anomaly at orbit epoch, in radians.
    mean_anomaly: f64,

    /// The mean motion, in radians per day.
    mean_motion: f64,

    cache: OrbitCachedCalculations,
}

// When updating this struct, please review the following methods:
// `Orbit::get_cached_calculations()`
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
struct OrbitCachedCalculations {
    /// The transformation matrix to tilt the 2D planar orbit into 3D space.
    transformation_matrix: Matrix3x2,
}

// Initialization and cache management
impl Orbit {
    /// Creates a new orbit instance with the given parameters.
    ///
    /// The eccentricity is clamped into `[0, 0.99]`.
    ///
    /// ### Parameters
    /// - `semi_major_axis`: The semi-major axis of the orbit, in AU.
    /// - `eccentricity`: The eccentricity of the orbit.
    /// - `inclination`: The inclination of the orbit, in radians.
    /// - `arg_pe`: The argument of perihelion of the orbit, in radians.
    /// - `long_asc_node`: The longitude of ascending node of the orbit, in radians.
    /// - `mean_anomaly`: The mean anomaly at epoch, in radians.
    /// - `mean_motion`: The mean motion, in radians per day.
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        arg_pe: f64,
        long_asc_node: f64,
        mean_anomaly: f64,
        mean_motion: f64,
    ) -> Orbit {
        let cache = Self::get_cached_calculations(inclination, arg_pe, long_asc_node);

        Orbit {
            semi_major_axis,
            eccentricity: clamp_eccentricity(eccentricity),
            inclination,
            arg_pe,
            long_asc_node,
            mean_anomaly,
            mean_motion,
            cache,
        }
    }

    /// Creates a new orbit in the reference plane, with its perihelion
    /// rotated by `arg_pe` radians from the +X axis.
    pub fn new_flat(
        semi_major_axis: f64,
        eccentricity: f64,
        arg_pe: f64,
        mean_anomaly: f64,
        mean_motion: f64,
    ) -> Orbit {
        Self::new(
            semi_major_axis,
            eccentricity,
            0.0,
            arg_pe,
            0.0,
            mean_anomaly,
            mean_motion,
        )
    }

    /// Gets the inclination of the orbit, in radians.
    pub fn get_inclination(&self) -> f64 {
        self.inclination
    }

    /// Gets the argument of perihelion of the orbit, in radians.
    pub fn get_arg_pe(&self) -> f64 {
        self.arg_pe
    }

    /// Gets the longitude of ascending node of the orbit, in radians.
    pub fn get_long_asc_node(&self) -> f64 {
        self.long_asc_node
    }

    /// Sets the eccentricity, clamped into `[0, 0.99]`.
    pub fn set_eccentricity(&mut self, eccentricity: f64) {
        self.eccentricity = clamp_eccentricity(eccentricity);
    }

    /// Sets the inclination, in radians.
    pub fn set_inclination(&mut self, inclination: f64) {
        self.inclination = inclination;
        self.update_cache();
    }

    /// Sets the argument of perihelion, in radians.
    pub fn set_arg_pe(&mut self, arg_pe: f64) {
        self.arg_pe = arg_pe;
        self.update_cache();
    }

    /// Sets the longitude of ascending node, in radians.
    pub fn set_long_asc_node(&mut self, long_asc_node: f64) {
        self.long_asc_node = long_asc_node;
        self.update_cache();
    }

    /// Updates the cached values in the orbit struct.
    ///
    /// Should only be called when the following things change:
    /// 1. Inclination
    /// 2. Argument of Perihelion
    /// 3. Longitude of Ascending Node
    fn update_cache(&mut self) {
        self.cache =
            Self::get_cached_calculations(self.inclination, self.arg_pe, self.long_asc_node);
    }

    fn get_cached_calculations(
        inclination: f64,
        arg_pe: f64,
        long_asc_node: f64,
    ) -> OrbitCachedCalculations {
        OrbitCachedCalculations {
            transformation_matrix: Matrix3x2::from_orientation(inclination, arg_pe, long_asc_node),
        }
    }
}

impl OrbitTrait for Orbit {
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
        self.cache.transformation_matrix
    }
}

impl Default for Orbit {
    /// Creates a circular, uninclined 1 AU orbit moving at the Earth's mean motion.
    fn default() -> Orbit {
        Orbit {
            semi_major_axis: 1.0,
            eccentricity: 0.0,
            inclination: 0.0,
            arg_pe: 0.0,
            long_asc_node: 0.0,
            mean_anomaly: 0.0,
            mean_motion: EARTH_MEAN_MOTION,
            cache: OrbitCachedCalculations {
                transformation_matrix: Matrix3x2::IDENTITY,
            },
        }
    }
}
