//! Discretization of orbits into point sequences.
//!
//! Two kinds of sequence are produced:
//! - [`ShapeSampler`]: the closed outline of an orbit, sampled uniformly in
//!   true anomaly. Time plays no role.
//! - [`TrajectorySampler`]: where a body actually is at evenly spaced instants.
//!
//! Both are plain iterators over their inputs. Cloning a sampler before it is
//! consumed and running the clone yields the same sequence again.

use core::f64::consts::TAU;
use core::iter::FusedIterator;

use glam::{DVec2, DVec3};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Matrix3x2, OrbitState, OrbitTrait};

/// An error returned when a trajectory window cannot be sampled.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SamplerError {
    /// One of the window bounds is NaN or infinite.
    #[error("sampling window bound is not finite (start {start}, end {end})")]
    NonFinite {
        /// Start of the window, in elapsed days.
        start: f64,
        /// End of the window, in elapsed days.
        end: f64,
    },
    /// The window ends before (or where) it starts, but more than one
    /// sample was requested.
    #[error("sampling window is empty or inverted (start {start}, end {end})")]
    InvertedWindow {
        /// Start of the window, in elapsed days.
        start: f64,
        /// End of the window, in elapsed days.
        end: f64,
    },
}

/// An iterator over points on the outline of an orbit.
///
/// Yields `count` positions at true anomalies `2 pi k / count`, for `k` in
/// `0..count`. Each radius comes from the polar conic equation, so the points
/// bunch up near perihelion on eccentric orbits.
///
/// # Example
/// ```
/// use neo_sim::{sampler::ShapeSampler, Orbit};
///
/// let orbit = Orbit::default();
/// let points: Vec<_> = ShapeSampler::new(&orbit, 4).collect();
///
/// assert_eq!(points.len(), 4);
/// assert!((points[1].y - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct ShapeSampler {
    matrix: Matrix3x2,
    semi_latus_rectum: f64,
    eccentricity: f64,
    count: usize,
    index: usize,
}

impl ShapeSampler {
    /// Creates a sampler that walks once around the orbit in `count` steps.
    pub fn new(orbit: &impl OrbitTrait, count: usize) -> Self {
        Self {
            matrix: orbit.get_transformation_matrix(),
            semi_latus_rectum: orbit.get_semi_latus_rectum(),
            eccentricity: orbit.get_eccentricity(),
            count,
            index: 0,
        }
    }

    fn point(&self, index: usize) -> DVec3 {
        let true_anomaly = TAU * index as f64 / self.count as f64;
        let radius = self.semi_latus_rectum / (1.0 + self.eccentricity * true_anomaly.cos());
        let (sin, cos) = true_anomaly.sin_cos();

        self.matrix.dot_vec(DVec2::new(radius * cos, radius * sin))
    }
}

impl Iterator for ShapeSampler {
    type Item = DVec3;

    fn next(&mut self) -> Option<DVec3> {
        if self.index >= self.count {
            return None;
        }
        let point = self.point(self.index);
        self.index += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ShapeSampler {}
impl FusedIterator for ShapeSampler {}

/// Collects the outline of an orbit into a polyline.
///
/// Shorthand for `ShapeSampler::new(orbit, count).collect()`.
pub fn shape_points(orbit: &impl OrbitTrait, count: usize) -> Vec<DVec3> {
    ShapeSampler::new(orbit, count).collect()
}

/// One sample of a body's trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectorySample {
    /// Days since the orbit's epoch.
    pub elapsed_days: f64,
    /// The unwrapped mean anomaly `M0 + n t`, in radians.
    pub mean_anomaly: f64,
    /// Where the body is at that instant.
    pub state: OrbitState,
}

/// An iterator over a body's states at evenly spaced instants.
///
/// The first sample is at `start_day` and, when more than one sample is
/// requested, the last one is at `end_day`. Times are strictly increasing.
///
/// # Example
/// ```
/// use neo_sim::{sampler::TrajectorySampler, Orbit};
///
/// let orbit = Orbit::default();
/// let days: Vec<f64> = TrajectorySampler::new(&orbit, 0.0, 10.0, 3)
///     .unwrap()
///     .map(|sample| sample.elapsed_days)
///     .collect();
///
/// assert_eq!(days, vec![0.0, 5.0, 10.0]);
///
/// // Inverted windows are rejected
/// assert!(TrajectorySampler::new(&orbit, 10.0, 0.0, 3).is_err());
/// ```
#[derive(Debug)]
pub struct TrajectorySampler<'a, O: OrbitTrait> {
    orbit: &'a O,
    start_day: f64,
    step: f64,
    count: usize,
    index: usize,
}

impl<O: OrbitTrait> Clone for TrajectorySampler<'_, O> {
    fn clone(&self) -> Self {
        Self {
            orbit: self.orbit,
            start_day: self.start_day,
            step: self.step,
            count: self.count,
            index: self.index,
        }
    }
}

impl<'a, O: OrbitTrait> TrajectorySampler<'a, O> {
    /// Creates a sampler over `[start_day, end_day]`, in days since the
    /// orbit's epoch.
    ///
    /// # Errors
    /// - [`SamplerError::NonFinite`] if either bound is NaN or infinite.
    /// - [`SamplerError::InvertedWindow`] if `end_day <= start_day` while
    ///   `count > 1`.
    pub fn new(
        orbit: &'a O,
        start_day: f64,
        end_day: f64,
        count: usize,
    ) -> Result<Self, SamplerError> {
        if !start_day.is_finite() || !end_day.is_finite() {
            return Err(SamplerError::NonFinite {
                start: start_day,
                end: end_day,
            });
        }

        let step = if count > 1 {
            if end_day <= start_day {
                return Err(SamplerError::InvertedWindow {
                    start: start_day,
                    end: end_day,
                });
            }
            (end_day - start_day) / (count - 1) as f64
        } else {
            0.0
        };

        Ok(Self {
            orbit,
            start_day,
            step,
            count,
            index: 0,
        })
    }

    fn sample(&self, index: usize) -> TrajectorySample {
        let elapsed_days = self.start_day + self.step * index as f64;
        let mean_anomaly = self.orbit.get_mean_anomaly_at_time(elapsed_days);

        TrajectorySample {
            elapsed_days,
            mean_anomaly,
            state: self.orbit.get_state_at_mean_anomaly(mean_anomaly),
        }
    }
}

impl<O: OrbitTrait> Iterator for TrajectorySampler<'_, O> {
    type Item = TrajectorySample;

    fn next(&mut self) -> Option<TrajectorySample> {
        if self.index >= self.count {
            return None;
        }
        let sample = self.sample(self.index);
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<O: OrbitTrait> ExactSizeIterator for TrajectorySampler<'_, O> {}
impl<O: OrbitTrait> FusedIterator for TrajectorySampler<'_, O> {}

/// A linear factor from AU to scene units.
///
/// Only renderers use this. Physics always stays in AU.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayScale(pub f64);

impl DisplayScale {
    /// Scales a position in AU into scene units.
    pub fn apply(&self, position: DVec3) -> DVec3 {
        position * self.0
    }

    /// Scales a planar position in AU into scene units.
    pub fn apply_2d(&self, position: DVec2) -> DVec2 {
        position * self.0
    }

    /// Scales a whole polyline in place.
    pub fn apply_all(&self, points: &mut [DVec3]) {
        for point in points {
            *point *= self.0;
        }
    }
}

impl Default for DisplayScale {
    fn default() -> Self {
        Self(50.0)
    }
}
