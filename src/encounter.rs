//! Encounter geometry: time conversion, the simplified Earth, and miss distances.
//!
//! The Earth here is a circle of radius 1 AU in the reference plane, swept at
//! a constant `2 pi / 365.25` radians per day. Its angle is measured from +X
//! and counted from the same instant as the body's elapsed days, so body and
//! Earth are always compared "at the same elapsed days".

use glam::DVec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    sampler::{SamplerError, TrajectorySampler},
    OrbitState, OrbitalElementSet, AU_KM, EARTH_MEAN_MOTION, MS_PER_DAY, UNIX_EPOCH_JD,
};

/// Converts a Unix timestamp in milliseconds into a Julian Date.
///
/// # Example
/// ```
/// use neo_sim::encounter::unix_ms_to_julian_date;
///
/// assert_eq!(unix_ms_to_julian_date(0), 2440587.5);
/// assert_eq!(unix_ms_to_julian_date(86_400_000), 2440588.5);
/// ```
pub fn unix_ms_to_julian_date(unix_ms: i64) -> f64 {
    UNIX_EPOCH_JD + unix_ms as f64 / MS_PER_DAY
}

/// Converts a Julian Date into a Unix timestamp in milliseconds, rounded to
/// the nearest millisecond.
pub fn julian_date_to_unix_ms(julian_date: f64) -> i64 {
    ((julian_date - UNIX_EPOCH_JD) * MS_PER_DAY).round() as i64
}

/// The simplified Earth: a circular, uninclined orbit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EarthModel {
    /// Orbital radius, in AU.
    pub radius_au: f64,
    /// Angular rate, in radians per day.
    pub angular_rate: f64,
}

impl EarthModel {
    /// Gets the Earth's angle from +X after some elapsed days, in radians.
    ///
    /// The angle is not wrapped.
    pub fn angle_at(&self, elapsed_days: f64) -> f64 {
        self.angular_rate * elapsed_days
    }

    /// Gets the Earth's position after some elapsed days, in AU.
    pub fn position_at(&self, elapsed_days: f64) -> DVec3 {
        let (sin, cos) = self.angle_at(elapsed_days).sin_cos();
        DVec3::new(self.radius_au * cos, self.radius_au * sin, 0.0)
    }
}

impl Default for EarthModel {
    fn default() -> Self {
        Self {
            radius_au: 1.0,
            angular_rate: EARTH_MEAN_MOTION,
        }
    }
}

/// Where a body is at a requested instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Encounter {
    /// The requested instant, as a Julian Date.
    pub julian_date: f64,
    /// Days since the elements' osculation epoch.
    pub elapsed_days: f64,
    /// The propagated mean anomaly, in `[0, 360)` degrees.
    pub mean_anomaly_deg: f64,
    /// The body's state at the instant.
    pub state: OrbitState,
}

/// The separation between a body and the Earth at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MissDistance {
    /// Separation, in kilometers.
    pub km: f64,
    /// Separation, in AU.
    pub au: f64,
    /// The body's position, in AU.
    pub body_position: DVec3,
    /// The Earth's position, in AU.
    pub earth_position: DVec3,
}

impl MissDistance {
    fn between(body_position: DVec3, earth_position: DVec3) -> Self {
        let au = body_position.distance(earth_position);
        Self {
            km: au * AU_KM,
            au,
            body_position,
            earth_position,
        }
    }
}

/// The closest sampled approach within a time window.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClosestApproach {
    /// The instant of the closest sample, as a Julian Date.
    pub julian_date: f64,
    /// Days since the elements' osculation epoch.
    pub elapsed_days: f64,
    /// The separation at that sample.
    pub miss: MissDistance,
}

/// Computes body positions and body-Earth separations at given instants.
///
/// # Example
/// ```
/// use neo_sim::{encounter::EncounterGeometry, OrbitalElementSet, RawElements};
///
/// let elements = OrbitalElementSet::from_raw(&RawElements {
///     semi_major_axis_au: Some(1.0),
///     eccentricity: Some(0.0),
///     mean_motion_deg_per_day: Some(360.0 / 365.25),
///     epoch_osculation_jd: Some(2461000.5),
///     ..Default::default()
/// })
/// .unwrap();
///
/// // A body riding on the Earth's circle, in phase with it
/// let miss = EncounterGeometry::default().miss_distance(&elements, 2461100.5);
/// assert!(miss.km < 1e-3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EncounterGeometry {
    /// The Earth model the body is compared against.
    pub earth: EarthModel,
}

impl EncounterGeometry {
    /// Creates a geometry against a custom Earth model.
    pub fn new(earth: EarthModel) -> Self {
        Self { earth }
    }

    /// Propagates the elements to a Julian Date.
    pub fn encounter_at_julian_date(
        &self,
        elements: &OrbitalElementSet,
        julian_date: f64,
    ) -> Encounter {
        let elapsed_days = elements.elapsed_days(julian_date);

        Encounter {
            julian_date,
            elapsed_days,
            mean_anomaly_deg: elements.mean_anomaly_deg_at_elapsed_days(elapsed_days),
            state: elements.state_at_elapsed_days(elapsed_days),
        }
    }

    /// Propagates the elements to a Unix timestamp, in milliseconds.
    pub fn encounter_at_unix_ms(&self, elements: &OrbitalElementSet, unix_ms: i64) -> Encounter {
        self.encounter_at_julian_date(elements, unix_ms_to_julian_date(unix_ms))
    }

    /// Gets the body-Earth separation some days after the elements' epoch.
    pub fn miss_distance_at_elapsed_days(
        &self,
        elements: &OrbitalElementSet,
        elapsed_days: f64,
    ) -> MissDistance {
        MissDistance::between(
            elements.state_at_elapsed_days(elapsed_days).position,
            self.earth.position_at(elapsed_days),
        )
    }

    /// Gets the body-Earth separation at a Julian Date.
    pub fn miss_distance(&self, elements: &OrbitalElementSet, julian_date: f64) -> MissDistance {
        self.miss_distance_at_elapsed_days(elements, elements.elapsed_days(julian_date))
    }

    /// Scans `samples` evenly spaced instants between two Julian Dates and
    /// returns the one with the smallest separation.
    ///
    /// Returns `Ok(None)` when `samples` is zero. The result is only as fine
    /// as the sampling; no refinement between samples is attempted.
    ///
    /// # Errors
    /// The same as [`TrajectorySampler::new`].
    pub fn closest_approach(
        &self,
        elements: &OrbitalElementSet,
        start_jd: f64,
        end_jd: f64,
        samples: usize,
    ) -> Result<Option<ClosestApproach>, SamplerError> {
        let orbit = elements.to_orbit();
        let sampler = TrajectorySampler::new(
            &orbit,
            elements.elapsed_days(start_jd),
            elements.elapsed_days(end_jd),
            samples,
        )?;

        let closest = sampler
            .map(|sample| ClosestApproach {
                julian_date: elements.epoch_osculation_jd + sample.elapsed_days,
                elapsed_days: sample.elapsed_days,
                miss: MissDistance::between(
                    sample.state.position,
                    self.earth.position_at(sample.elapsed_days),
                ),
            })
            .min_by(|a, b| a.miss.au.total_cmp(&b.miss.au));

        Ok(closest)
    }
}
