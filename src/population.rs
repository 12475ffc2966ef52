use core::fmt;
use std::collections::HashMap;

use glam::DVec3;
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    encounter::unix_ms_to_julian_date, sampler::shape_points, CelestialBody, OrbitalElementSet,
};

/// Errors returned when editing a [`Population`].
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PopulationError {
    /// A body with the same id is already present.
    #[error("a body with id `{0}` is already in the population")]
    DuplicateId(String),
    /// No body has the given id.
    #[error("there is no body with id `{0}` in the population")]
    UnknownId(String),
}

/// Where one body is at a requested instant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyPosition {
    /// The body's id.
    pub id: String,
    /// The body's heliocentric position, in AU.
    pub position: DVec3,
    /// The body's propagated mean anomaly, in `[0, 360)` degrees.
    pub mean_anomaly_deg: f64,
}

/// The outline of one body's orbit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BodyShape {
    /// The body's id.
    pub id: String,
    /// Points along the orbit, in AU.
    pub points: Vec<DVec3>,
}

/// A set of bodies propagated together.
///
/// Bodies keep their insertion order. Batch queries skip bodies whose
/// elements are unknown instead of failing.
///
/// # Example
/// ```
/// use neo_sim::{CelestialBody, OrbitalElementSet, Population, RawElements};
///
/// let mut population = Population::new();
///
/// let elements = OrbitalElementSet::from_raw(&RawElements {
///     semi_major_axis_au: Some(1.2),
///     eccentricity: Some(0.1),
///     ..Default::default()
/// });
/// population.add_body(CelestialBody::new("1", "Known", elements)).unwrap();
/// population.add_body(CelestialBody::new("2", "Unknown", None)).unwrap();
///
/// let positions = population.positions_at_julian_date(2451545.0);
/// assert_eq!(positions.len(), 1);
/// assert_eq!(positions[0].id, "1");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Population {
    bodies: Vec<CelestialBody>,

    /// Maps a body id onto its index in `bodies`.
    index: HashMap<String, usize>,
}

impl Population {
    /// Creates an empty population.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a body to the population.
    ///
    /// # Errors
    /// [`PopulationError::DuplicateId`] if a body with the same id exists.
    /// The rejected body is dropped.
    pub fn add_body(&mut self, body: CelestialBody) -> Result<(), PopulationError> {
        if self.index.contains_key(&body.id) {
            return Err(PopulationError::DuplicateId(body.id));
        }

        self.index.insert(body.id.clone(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Removes a body from the population and returns it.
    ///
    /// # Errors
    /// [`PopulationError::UnknownId`] if no body has this id.
    pub fn remove_body(&mut self, id: &str) -> Result<CelestialBody, PopulationError> {
        let position = self
            .index
            .remove(id)
            .ok_or_else(|| PopulationError::UnknownId(id.to_string()))?;

        let body = self.bodies.remove(position);
        for index in self.index.values_mut() {
            if *index > position {
                *index -= 1;
            }
        }

        Ok(body)
    }

    /// Gets a body by id.
    pub fn get_body(&self, id: &str) -> Option<&CelestialBody> {
        self.index.get(id).map(|&index| &self.bodies[index])
    }

    /// Gets a mutable reference to a body by id.
    pub fn get_body_mut(&mut self, id: &str) -> Option<&mut CelestialBody> {
        self.index.get(id).map(|&index| &mut self.bodies[index])
    }

    /// Gets the id of the first body with a given name.
    pub fn get_body_id_with_name(&self, name: &str) -> Option<&str> {
        self.bodies
            .iter()
            .find(|body| body.name == name)
            .map(|body| body.id.as_str())
    }

    /// Gets all bodies, in insertion order.
    pub fn get_bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    /// Gets the bodies flagged as potentially hazardous.
    pub fn hazardous(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies
            .iter()
            .filter(|body| body.is_potentially_hazardous)
    }

    /// The number of bodies.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether the population has no bodies.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Applies `f` to every body with known elements, in insertion order.
    fn map_known<T, F>(&self, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&CelestialBody, &OrbitalElementSet) -> T + Sync + Send,
    {
        let known = |body: &CelestialBody| match &body.elements {
            Some(elements) => Some(f(body, elements)),
            None => {
                log::debug!("skipping body {}: orbital elements unknown", body.id);
                None
            }
        };

        #[cfg(feature = "parallel")]
        let results: Vec<T> = self.bodies.par_iter().filter_map(known).collect();
        #[cfg(not(feature = "parallel"))]
        let results: Vec<T> = self.bodies.iter().filter_map(known).collect();

        log::trace!(
            "propagated {} of {} bodies",
            results.len(),
            self.bodies.len()
        );
        results
    }

    /// Gets the position of every body with known elements at a Julian Date.
    pub fn positions_at_julian_date(&self, julian_date: f64) -> Vec<BodyPosition> {
        self.map_known(|body, elements| {
            let elapsed_days = elements.elapsed_days(julian_date);
            BodyPosition {
                id: body.id.clone(),
                position: elements.state_at_elapsed_days(elapsed_days).position,
                mean_anomaly_deg: elements.mean_anomaly_deg_at_elapsed_days(elapsed_days),
            }
        })
    }

    /// Gets the position of every body with known elements at a Unix
    /// timestamp, in milliseconds.
    pub fn positions_at_unix_ms(&self, unix_ms: i64) -> Vec<BodyPosition> {
        self.positions_at_julian_date(unix_ms_to_julian_date(unix_ms))
    }

    /// Gets the outline of every body's orbit, `count` points each.
    pub fn shapes(&self, count: usize) -> Vec<BodyShape> {
        self.map_known(|body, elements| BodyShape {
            id: body.id.clone(),
            points: shape_points(&elements.to_orbit(), count),
        })
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Population with {} bodies ({} potentially hazardous)",
            self.bodies.len(),
            self.hazardous().count()
        )
    }
}
