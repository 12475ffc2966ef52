use crate::{
    impact::{sphere_mass_kg, CraterModel, EffectsModel, ImpactEnergyModel, ImpactEstimate},
    Orbit, OrbitalElementSet, RawElements,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A recorded close approach of a body to the Earth.
///
/// These values come from upstream data and are carried through untouched.
/// Nothing in this crate derives them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ApproachEvent {
    /// The instant of closest approach, as a Unix timestamp in milliseconds.
    pub epoch_unix_ms: i64,

    /// Human-readable date of the approach, as supplied upstream.
    pub date: String,

    /// Miss distance, in kilometers.
    pub miss_km: f64,

    /// Miss distance, in AU.
    pub miss_au: f64,

    /// Speed relative to the Earth, in km/s.
    pub velocity_kps: f64,
}

/// A struct representing a near-Earth object.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CelestialBody {
    /// The upstream identifier of the body.
    pub id: String,

    /// The name of the body.
    pub name: String,

    /// The orbital elements of the body, if they are known and usable.
    pub elements: Option<OrbitalElementSet>,

    /// The estimated diameter of the body, in kilometers.
    pub diameter_km: Option<f64>,

    /// The mass of the body, in kilograms, if it is known directly.
    pub mass_kg: Option<f64>,

    /// Whether upstream data flags this body as potentially hazardous.
    pub is_potentially_hazardous: bool,

    /// The next recorded close approach, if any.
    pub approach: Option<ApproachEvent>,
}

impl CelestialBody {
    /// Creates a new `CelestialBody` with no size, mass or approach data.
    ///
    /// # Arguments
    ///
    /// * `id` - The upstream identifier of the body.
    /// * `name` - The name of the body.
    /// * `elements` - The body's orbital elements, if known.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        elements: Option<OrbitalElementSet>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            elements,
            diameter_km: None,
            mass_kg: None,
            is_potentially_hazardous: false,
            approach: None,
        }
    }

    /// Creates a new `CelestialBody` from unvalidated upstream elements.
    ///
    /// If the elements are unusable (see [`OrbitalElementSet::from_raw`]),
    /// the body is still created, just without an orbit.
    pub fn from_raw(id: impl Into<String>, name: impl Into<String>, raw: &RawElements) -> Self {
        let body = Self::new(id, name, OrbitalElementSet::from_raw(raw));
        if body.elements.is_none() {
            log::debug!("body {} has unusable orbital elements", body.id);
        }
        body
    }

    /// Sets the estimated diameter, in kilometers.
    pub fn with_diameter_km(mut self, diameter_km: f64) -> Self {
        self.diameter_km = Some(diameter_km);
        self
    }

    /// Sets a directly known mass, in kilograms.
    pub fn with_mass_kg(mut self, mass_kg: f64) -> Self {
        self.mass_kg = Some(mass_kg);
        self
    }

    /// Sets the potentially-hazardous flag.
    pub fn with_hazard(mut self, is_potentially_hazardous: bool) -> Self {
        self.is_potentially_hazardous = is_potentially_hazardous;
        self
    }

    /// Attaches a close-approach record.
    pub fn with_approach(mut self, approach: ApproachEvent) -> Self {
        self.approach = Some(approach);
        self
    }

    /// Gets the mass of the body, in kilograms.
    ///
    /// A directly known mass wins. Otherwise the mass of a sphere of the
    /// body's diameter at `density_kg_m3` is used. Returns `None` when
    /// neither mass nor diameter is known.
    pub fn mass_kg(&self, density_kg_m3: f64) -> Option<f64> {
        self.mass_kg.or_else(|| {
            self.diameter_km
                .map(|diameter_km| sphere_mass_kg(diameter_km, density_kg_m3))
        })
    }

    /// Builds the orbit of the body, if its elements are known.
    pub fn orbit(&self) -> Option<Orbit> {
        self.elements.as_ref().map(OrbitalElementSet::to_orbit)
    }

    /// Estimates the impact of this body, at the speed of its recorded approach.
    ///
    /// Returns `None` when the diameter or the approach is unknown.
    pub fn impact_estimate<C: CraterModel, F: EffectsModel>(
        &self,
        model: &ImpactEnergyModel<C, F>,
    ) -> Option<ImpactEstimate> {
        let diameter_km = self.diameter_km?;
        let approach = self.approach.as_ref()?;

        Some(model.estimate(diameter_km, approach.velocity_kps, self.mass_kg))
    }
}
