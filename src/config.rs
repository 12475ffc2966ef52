//! Simulation tunables and how they are loaded.
//!
//! Every key is optional in a config file; missing keys fall back to the
//! defaults listed on [`SimConfig`]. A typical file looks like:
//!
//! ```toml
//! success_threshold_km = 15000.0
//! display_scale = 50.0
//! shape_samples = 512
//! trajectory_samples = 256
//! default_density_kg_m3 = 3000.0
//!
//! [effects]
//! blast_radius_per_crater_km = 4.0
//! population_per_crater_km = 50000.0
//! ```

#[cfg(feature = "serde")]
use std::path::Path;

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    deflection::{DeflectionModel, LinearSpeedEccentricity, MissionClassifier},
    encounter::EncounterGeometry,
    impact::{ImpactEnergyModel, LinearEffectsModel, ToyCraterModel},
    sampler::DisplayScale,
};

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML, or does not match the expected layout.
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// A field holds a value outside its allowed range.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        /// The offending key.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// Multipliers for the linear impact-effects law.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EffectsConfig {
    /// Kilometers of blast radius per kilometer of crater. Default 4.
    pub blast_radius_per_crater_km: f64,
    /// People affected per kilometer of crater. Default 50,000.
    pub population_per_crater_km: f64,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        let model = LinearEffectsModel::default();
        Self {
            blast_radius_per_crater_km: model.blast_radius_per_crater_km,
            population_per_crater_km: model.population_per_crater_km,
        }
    }
}

impl EffectsConfig {
    /// Builds the effects law these multipliers describe.
    pub fn model(&self) -> LinearEffectsModel {
        LinearEffectsModel {
            blast_radius_per_crater_km: self.blast_radius_per_crater_km,
            population_per_crater_km: self.population_per_crater_km,
        }
    }
}

/// Simulation-wide tunables.
///
/// # Example
/// ```
/// use neo_sim::SimConfig;
///
/// let config = SimConfig::from_toml_str("success_threshold_km = 20000.0").unwrap();
///
/// assert_eq!(config.success_threshold_km, 20000.0);
/// assert_eq!(config.shape_samples, 512);
/// assert!(!config.classifier().is_success(15000.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Miss distance at or above which a deflection counts as a success,
    /// in kilometers. Default 15,000.
    pub success_threshold_km: f64,
    /// Scene units per AU for renderers. Default 50.
    pub display_scale: f64,
    /// Points per orbit outline. Default 512.
    pub shape_samples: usize,
    /// Points per trajectory. Default 256.
    pub trajectory_samples: usize,
    /// Bulk density assumed when a body's mass is unknown, in kg/m^3.
    /// Default 3,000.
    pub default_density_kg_m3: f64,
    /// Impact-effects multipliers.
    pub effects: EffectsConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            success_threshold_km: 15_000.0,
            display_scale: 50.0,
            shape_samples: 512,
            trajectory_samples: 256,
            default_density_kg_m3: 3_000.0,
            effects: EffectsConfig::default(),
        }
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite, non-negative number, got {value}"),
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("expected a finite, positive number, got {value}"),
        });
    }
    Ok(())
}

fn check_samples(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value < 2 {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("need at least 2 samples, got {value}"),
        });
    }
    Ok(())
}

impl SimConfig {
    /// Parses and validates a config from TOML text.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML config file.
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        log::info!("loaded simulation config from {}", path.display());
        Ok(config)
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("success_threshold_km", self.success_threshold_km)?;
        check_positive("display_scale", self.display_scale)?;
        check_samples("shape_samples", self.shape_samples)?;
        check_samples("trajectory_samples", self.trajectory_samples)?;
        check_positive("default_density_kg_m3", self.default_density_kg_m3)?;
        check_non_negative(
            "effects.blast_radius_per_crater_km",
            self.effects.blast_radius_per_crater_km,
        )?;
        check_non_negative(
            "effects.population_per_crater_km",
            self.effects.population_per_crater_km,
        )?;
        Ok(())
    }

    /// The mission classifier for the configured threshold.
    pub fn classifier(&self) -> MissionClassifier {
        MissionClassifier::new(self.success_threshold_km)
    }

    /// The encounter geometry against the default Earth model.
    pub fn encounter_geometry(&self) -> EncounterGeometry {
        EncounterGeometry::default()
    }

    /// The deflection model with the default eccentricity proxy.
    pub fn deflection_model(&self) -> DeflectionModel<LinearSpeedEccentricity> {
        DeflectionModel::new(
            LinearSpeedEccentricity,
            self.encounter_geometry(),
            self.classifier(),
        )
    }

    /// The impact-energy model with the toy crater law and the configured
    /// effects multipliers.
    pub fn impact_model(&self) -> ImpactEnergyModel<ToyCraterModel, LinearEffectsModel> {
        ImpactEnergyModel::new(
            ToyCraterModel,
            self.effects.model(),
            self.default_density_kg_m3,
        )
    }

    /// The AU to scene-unit scale.
    pub fn display(&self) -> DisplayScale {
        DisplayScale(self.display_scale)
    }
}
