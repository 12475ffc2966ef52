//! Impact energy estimates.
//!
//! Mass and kinetic energy are plain physics. The crater size and the effects
//! derived from it are illustrative placeholders only, so both sit behind
//! traits ([`CraterModel`] and [`EffectsModel`]) that callers can replace.

use core::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Joules in one megaton of TNT.
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// The smallest crater the toy model reports, in kilometers.
pub const MIN_CRATER_KM: f64 = 5.0;

/// Gets the mass of a uniform sphere, in kilograms.
///
/// ### Parameters
/// - `diameter_km`: The sphere's diameter, in kilometers.
/// - `density_kg_m3`: Its bulk density, in kilograms per cubic meter.
///
/// # Example
/// ```
/// use neo_sim::impact::sphere_mass_kg;
///
/// let mass = sphere_mass_kg(5.0, 3000.0);
/// assert!((mass / 1.96e14 - 1.0).abs() < 0.01);
/// ```
pub fn sphere_mass_kg(diameter_km: f64, density_kg_m3: f64) -> f64 {
    let radius_m = diameter_km * 500.0;
    density_kg_m3 * (4.0 / 3.0) * PI * radius_m.powi(3)
}

/// Gets the kinetic energy of a body, in joules.
pub fn kinetic_energy_j(mass_kg: f64, speed_kps: f64) -> f64 {
    let speed_m_s = speed_kps * 1000.0;
    0.5 * mass_kg * speed_m_s * speed_m_s
}

/// Converts joules into megatons of TNT.
pub fn tnt_megatons(energy_j: f64) -> f64 {
    energy_j / JOULES_PER_MEGATON
}

/// A law giving crater diameter from impactor size and speed.
pub trait CraterModel {
    /// Gets the crater diameter, in kilometers.
    fn crater_diameter_km(&self, diameter_km: f64, speed_kps: f64) -> f64;
}

/// The illustrative crater law `max(5, round(d (0.6 + v / 50)))`.
///
/// This is not a validated scaling law.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ToyCraterModel;

impl CraterModel for ToyCraterModel {
    fn crater_diameter_km(&self, diameter_km: f64, speed_kps: f64) -> f64 {
        (diameter_km * (0.6 + speed_kps / 50.0))
            .round()
            .max(MIN_CRATER_KM)
    }
}

impl<F: Fn(f64, f64) -> f64> CraterModel for F {
    fn crater_diameter_km(&self, diameter_km: f64, speed_kps: f64) -> f64 {
        self(diameter_km, speed_kps)
    }
}

/// Secondary effects of an impact.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactEffects {
    /// Radius of severe blast damage, in kilometers.
    pub blast_radius_km: f64,
    /// Rough head-count inside the affected zone.
    pub affected_population: u64,
}

/// A law giving [`ImpactEffects`] from the crater size.
pub trait EffectsModel {
    /// Estimates the effects of a crater of the given diameter.
    fn effects(&self, crater_km: f64) -> ImpactEffects;
}

/// Effects that scale linearly with crater diameter.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearEffectsModel {
    /// Kilometers of blast radius per kilometer of crater.
    pub blast_radius_per_crater_km: f64,
    /// People affected per kilometer of crater.
    pub population_per_crater_km: f64,
}

impl Default for LinearEffectsModel {
    fn default() -> Self {
        Self {
            blast_radius_per_crater_km: 4.0,
            population_per_crater_km: 50_000.0,
        }
    }
}

impl EffectsModel for LinearEffectsModel {
    fn effects(&self, crater_km: f64) -> ImpactEffects {
        ImpactEffects {
            blast_radius_km: crater_km * self.blast_radius_per_crater_km,
            affected_population: (crater_km * self.population_per_crater_km).max(0.0).round()
                as u64,
        }
    }
}

/// Everything the impact pipeline reports for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactEstimate {
    /// Mass, in kilograms.
    pub mass_kg: f64,
    /// Kinetic energy at impact, in joules.
    pub kinetic_energy_j: f64,
    /// Kinetic energy, in megatons of TNT.
    pub tnt_megatons: f64,
    /// Crater diameter, in kilometers.
    pub crater_km: f64,
    /// Secondary effects.
    pub effects: ImpactEffects,
}

/// Turns a body's size and speed into an [`ImpactEstimate`].
///
/// # Example
/// ```
/// use neo_sim::impact::ImpactEnergyModel;
///
/// let estimate = ImpactEnergyModel::default().estimate(5.0, 20.0, None);
///
/// assert!((estimate.kinetic_energy_j / 3.93e22 - 1.0).abs() < 0.01);
/// assert!((estimate.tnt_megatons / 9.39e6 - 1.0).abs() < 0.01);
/// assert_eq!(estimate.crater_km, 5.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImpactEnergyModel<C = ToyCraterModel, F = LinearEffectsModel> {
    /// The crater law.
    pub crater: C,
    /// The effects law.
    pub effects: F,
    /// Density used when no mass is known, in kilograms per cubic meter.
    pub default_density_kg_m3: f64,
}

impl Default for ImpactEnergyModel {
    fn default() -> Self {
        Self {
            crater: ToyCraterModel,
            effects: LinearEffectsModel::default(),
            default_density_kg_m3: 3000.0,
        }
    }
}

impl<C: CraterModel, F: EffectsModel> ImpactEnergyModel<C, F> {
    /// Creates a model from custom crater and effects laws.
    pub fn new(crater: C, effects: F, default_density_kg_m3: f64) -> Self {
        Self {
            crater,
            effects,
            default_density_kg_m3,
        }
    }

    /// Estimates the impact of a body.
    ///
    /// When `mass_kg` is `None` the mass is that of a sphere of the given
    /// diameter at the model's default density.
    pub fn estimate(
        &self,
        diameter_km: f64,
        speed_kps: f64,
        mass_kg: Option<f64>,
    ) -> ImpactEstimate {
        let mass_kg =
            mass_kg.unwrap_or_else(|| sphere_mass_kg(diameter_km, self.default_density_kg_m3));
        let kinetic_energy_j = kinetic_energy_j(mass_kg, speed_kps);
        let crater_km = self.crater.crater_diameter_km(diameter_km, speed_kps);

        ImpactEstimate {
            mass_kg,
            kinetic_energy_j,
            tnt_megatons: tnt_megatons(kinetic_energy_j),
            crater_km,
            effects: self.effects.effects(crater_km),
        }
    }
}
