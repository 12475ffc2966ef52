#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    heliocentric_mean_motion_deg,
    sampler::{SamplerError, TrajectorySample, TrajectorySampler},
    wrap_degrees, Orbit, Orbit2D, OrbitState, OrbitTrait, J2000_JD,
};

/// Orbital elements as they arrive from upstream data, before validation.
///
/// Every field may be absent. Non-finite numbers are treated the same as
/// absent ones. See [`OrbitalElementSet::from_raw`] for how gaps are filled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RawElements {
    /// Semi-major axis, in AU.
    pub semi_major_axis_au: Option<f64>,
    /// Eccentricity.
    pub eccentricity: Option<f64>,
    /// Inclination, in degrees.
    pub inclination_deg: Option<f64>,
    /// Longitude of the ascending node, in degrees.
    pub ascending_node_longitude_deg: Option<f64>,
    /// Argument of perihelion, in degrees.
    pub perihelion_argument_deg: Option<f64>,
    /// Mean anomaly at the osculation epoch, in degrees.
    pub mean_anomaly_deg: Option<f64>,
    /// Mean motion, in degrees per day.
    pub mean_motion_deg_per_day: Option<f64>,
    /// Osculation epoch, as a Julian Date.
    pub epoch_osculation_jd: Option<f64>,
}

/// An immutable snapshot of osculating heliocentric orbital elements.
///
/// Units follow the upstream data: degrees, degrees per day and Julian Dates.
/// The eccentricity is stored as supplied and clamped into `[0, 0.99]` only
/// when an [`Orbit`] is built from the set.
///
/// # Example
/// ```
/// use neo_sim::{OrbitalElementSet, RawElements};
///
/// let raw = RawElements {
///     semi_major_axis_au: Some(0.922),
///     eccentricity: Some(0.191),
///     mean_anomaly_deg: Some(310.5543277),
///     mean_motion_deg_per_day: Some(0.5597752949),
///     epoch_osculation_jd: Some(2461000.5),
///     ..Default::default()
/// };
///
/// let elements = OrbitalElementSet::from_raw(&raw).expect("usable elements");
/// assert_eq!(elements.mean_anomaly_deg_at_julian_date(2461000.5), 310.5543277);
///
/// // Without a semi-major axis, the orbit is unknown
/// let unknown = RawElements { semi_major_axis_au: None, ..raw };
/// assert!(OrbitalElementSet::from_raw(&unknown).is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrbitalElementSet {
    /// Semi-major axis, in AU. Always positive.
    pub semi_major_axis_au: f64,
    /// Eccentricity.
    pub eccentricity: f64,
    /// Inclination, in degrees.
    pub inclination_deg: f64,
    /// Longitude of the ascending node, in degrees.
    pub ascending_node_longitude_deg: f64,
    /// Argument of perihelion, in degrees.
    pub perihelion_argument_deg: f64,
    /// Mean anomaly at the osculation epoch, in degrees.
    pub mean_anomaly_deg: f64,
    /// Mean motion, in degrees per day.
    pub mean_motion_deg_per_day: f64,
    /// Osculation epoch, as a Julian Date.
    pub epoch_osculation_jd: f64,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl OrbitalElementSet {
    /// Validates raw upstream elements.
    ///
    /// Returns `None` ("orbit unknown") when the semi-major axis or the
    /// eccentricity is absent or non-finite, or when the semi-major axis is
    /// not positive. Otherwise the remaining gaps are filled:
    /// - angles default to zero,
    /// - the epoch defaults to J2000,
    /// - the mean motion defaults to the heliocentric value for the
    ///   semi-major axis.
    pub fn from_raw(raw: &RawElements) -> Option<Self> {
        let semi_major_axis_au = finite(raw.semi_major_axis_au).filter(|a| *a > 0.0)?;
        let eccentricity = finite(raw.eccentricity)?;

        Some(Self {
            semi_major_axis_au,
            eccentricity,
            inclination_deg: finite(raw.inclination_deg).unwrap_or(0.0),
            ascending_node_longitude_deg: finite(raw.ascending_node_longitude_deg).unwrap_or(0.0),
            perihelion_argument_deg: finite(raw.perihelion_argument_deg).unwrap_or(0.0),
            mean_anomaly_deg: finite(raw.mean_anomaly_deg).unwrap_or(0.0),
            mean_motion_deg_per_day: finite(raw.mean_motion_deg_per_day)
                .unwrap_or_else(|| heliocentric_mean_motion_deg(semi_major_axis_au)),
            epoch_osculation_jd: finite(raw.epoch_osculation_jd).unwrap_or(J2000_JD),
        })
    }

    /// Builds the 3D [`Orbit`] described by these elements.
    ///
    /// The orbit's time origin is the osculation epoch.
    pub fn to_orbit(&self) -> Orbit {
        Orbit::new(
            self.semi_major_axis_au,
            self.eccentricity,
            self.inclination_deg.to_radians(),
            self.perihelion_argument_deg.to_radians(),
            self.ascending_node_longitude_deg.to_radians(),
            self.mean_anomaly_deg.to_radians(),
            self.mean_motion_deg_per_day.to_radians(),
        )
    }

    /// Builds the planar [`Orbit2D`] for these elements, dropping the orientation.
    pub fn to_orbit_2d(&self) -> Orbit2D {
        Orbit2D::new(
            self.semi_major_axis_au,
            self.eccentricity,
            self.mean_anomaly_deg.to_radians(),
            self.mean_motion_deg_per_day.to_radians(),
        )
    }

    /// Days elapsed between the osculation epoch and a Julian Date.
    pub fn elapsed_days(&self, julian_date: f64) -> f64 {
        julian_date - self.epoch_osculation_jd
    }

    /// The mean anomaly some days after the epoch, wrapped into `[0, 360)` degrees.
    pub fn mean_anomaly_deg_at_elapsed_days(&self, elapsed_days: f64) -> f64 {
        wrap_degrees(self.mean_anomaly_deg + self.mean_motion_deg_per_day * elapsed_days)
    }

    /// The mean anomaly at a Julian Date, wrapped into `[0, 360)` degrees.
    pub fn mean_anomaly_deg_at_julian_date(&self, julian_date: f64) -> f64 {
        self.mean_anomaly_deg_at_elapsed_days(self.elapsed_days(julian_date))
    }

    /// The body's [`OrbitState`] some days after the epoch.
    pub fn state_at_elapsed_days(&self, elapsed_days: f64) -> OrbitState {
        let mean_anomaly_deg = self.mean_anomaly_deg_at_elapsed_days(elapsed_days);
        self.to_orbit()
            .get_state_at_mean_anomaly(mean_anomaly_deg.to_radians())
    }

    /// The body's [`OrbitState`] at a Julian Date.
    pub fn state_at_julian_date(&self, julian_date: f64) -> OrbitState {
        self.state_at_elapsed_days(self.elapsed_days(julian_date))
    }

    /// Samples the trajectory between two Julian Dates.
    ///
    /// See [`TrajectorySampler`] for the sampling rules.
    pub fn trajectory_between(
        &self,
        start_jd: f64,
        end_jd: f64,
        count: usize,
    ) -> Result<Vec<TrajectorySample>, SamplerError> {
        let orbit = self.to_orbit();
        let sampler = TrajectorySampler::new(
            &orbit,
            self.elapsed_days(start_jd),
            self.elapsed_days(end_jd),
            count,
        )?;
        Ok(sampler.collect())
    }
}
