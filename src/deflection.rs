//! The impulsive kinetic-impactor deflection model.
//!
//! A scenario is solved from scratch every time; nothing is carried over
//! between calls to [`DeflectionModel::solve`].
//!
//! ## Model
//! 1. The asteroid's heliocentric speed is mapped to an eccentricity by an
//!    [`EccentricityModel`].
//! 2. A baseline orbit with its perihelion on +X is built so that, undisturbed,
//!    the asteroid meets the Earth exactly `time_to_encounter_days` after the
//!    scenario epoch.
//! 3. The impactor imparts `dv = beta m_imp v_rel / max(1, m_ast)`. Only the
//!    along-track part `dv cos(phi)` changes the orbit, through the linearized
//!    tangential-impulse relation `da/a = 2 dv_t / v`.
//! 4. At the burn instant the asteroid switches onto a post-burn orbit that
//!    passes through its current position. Where it ends up at the nominal
//!    encounter time decides the outcome.
//!
//! The real `da/a` is usually far too small to see, so a display-only gain
//! drives the orbit that is actually propagated. The ungained values are
//! always reported next to the gained ones.

#[cfg(feature = "serde")]
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::DVec3;

#[cfg(feature = "serde")]
use crate::config::ConfigError;
use crate::{
    clamp_eccentricity,
    encounter::{EncounterGeometry, MissDistance},
    impact::sphere_mass_kg,
    solvers::{
        eccentric_anomaly_at_true_anomaly, mean_anomaly_at_eccentric_anomaly,
        mean_anomaly_at_true_anomaly, wrap_radians,
    },
    wrap_degrees, OrbitalElementSet, J2000_JD,
};

/// The largest fractional change of semi-major axis the model applies.
pub const MAX_AXIS_RATIO: f64 = 0.5;

/// The smallest eccentricity of the post-burn orbit.
pub const MIN_POST_BURN_ECCENTRICITY: f64 = 0.01;

/// The largest eccentricity of the post-burn orbit.
pub const MAX_POST_BURN_ECCENTRICITY: f64 = 0.95;

/// Floor for the asteroid mass in the momentum transfer, in kilograms.
const MIN_ASTEROID_MASS_KG: f64 = 1.0;

/// Floor for the asteroid speed in the axis-change relation, in km/s.
const MIN_SPEED_KPS: f64 = 0.1;

/// The target asteroid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AsteroidParams {
    /// Diameter, in kilometers.
    pub diameter_km: f64,
    /// Bulk density, in kg/m^3.
    pub density_kg_m3: f64,
    /// Heliocentric speed proxy, in km/s.
    pub speed_kps: f64,
    /// Known mass, in kilograms. Derived from diameter and density when absent.
    pub mass_kg: Option<f64>,
}

impl AsteroidParams {
    /// The asteroid's mass, in kilograms.
    pub fn mass_kg(&self) -> f64 {
        self.mass_kg
            .unwrap_or_else(|| sphere_mass_kg(self.diameter_km, self.density_kg_m3))
    }
}

impl Default for AsteroidParams {
    fn default() -> Self {
        Self {
            diameter_km: 0.5,
            density_kg_m3: 3000.0,
            speed_kps: 20.0,
            mass_kg: None,
        }
    }
}

/// The kinetic impactor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImpactorParams {
    /// Mass, in kilograms.
    pub mass_kg: f64,
    /// Speed relative to the asteroid, in km/s.
    pub relative_speed_kps: f64,
    /// Momentum-enhancement factor.
    pub beta: f64,
    /// Angle between the impulse and the asteroid's direction of motion, in degrees.
    pub burn_angle_deg: f64,
    /// How long before the encounter the impact happens, in days.
    pub lead_time_days: f64,
}

impl Default for ImpactorParams {
    fn default() -> Self {
        Self {
            mass_kg: 500.0,
            relative_speed_kps: 6.0,
            beta: 3.6,
            burn_angle_deg: 0.0,
            lead_time_days: 365.0,
        }
    }
}

/// Every input of one deflection run.
///
/// # Example
/// ```
/// use neo_sim::deflection::DeflectionScenario;
///
/// let scenario = DeflectionScenario::from_toml_str(
///     r#"
///     time_to_encounter_days = 730.0
///
///     [impactor]
///     mass_kg = 1000.0
///     "#,
/// )
/// .unwrap();
///
/// assert_eq!(scenario.impactor.mass_kg, 1000.0);
/// assert_eq!(scenario.impactor.beta, 3.6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeflectionScenario {
    /// The target asteroid.
    pub asteroid: AsteroidParams,
    /// The kinetic impactor.
    pub impactor: ImpactorParams,
    /// Days from the scenario epoch to the nominal encounter.
    pub time_to_encounter_days: f64,
    /// Display-only multiplier on the axis change.
    pub visual_gain: f64,
    /// The scenario epoch, as a Julian Date.
    pub epoch_jd: f64,
}

impl Default for DeflectionScenario {
    fn default() -> Self {
        Self {
            asteroid: AsteroidParams::default(),
            impactor: ImpactorParams::default(),
            time_to_encounter_days: 730.0,
            visual_gain: 1000.0,
            epoch_jd: J2000_JD,
        }
    }
}

#[cfg(feature = "serde")]
impl DeflectionScenario {
    /// Parses a scenario from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads a scenario from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_toml_str(&contents)?;
        log::info!("loaded deflection scenario from {}", path.display());
        Ok(scenario)
    }
}

/// A law mapping the asteroid's speed proxy onto its orbital eccentricity.
///
/// Closures of the form `Fn(f64) -> f64` implement this too.
pub trait EccentricityModel {
    /// Gets the eccentricity for a heliocentric speed, in km/s.
    fn eccentricity(&self, speed_kps: f64) -> f64;
}

/// The illustrative linear speed-to-eccentricity proxy.
///
/// Maps 5 km/s to 0.1 and 65 km/s to 0.7, clamped into `[0.05, 0.75]`.
/// This is a placeholder, not a physical relation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinearSpeedEccentricity;

impl EccentricityModel for LinearSpeedEccentricity {
    fn eccentricity(&self, speed_kps: f64) -> f64 {
        (((speed_kps - 5.0) / (65.0 - 5.0)) * 0.6 + 0.1).clamp(0.05, 0.75)
    }
}

impl<F: Fn(f64) -> f64> EccentricityModel for F {
    fn eccentricity(&self, speed_kps: f64) -> f64 {
        self(speed_kps)
    }
}

/// Velocity change delivered by the impactor, in km/s.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeltaV {
    /// The full momentum-transfer velocity change.
    pub true_kps: f64,
    /// Its along-track component.
    pub tangent_kps: f64,
    /// The along-track component times the visual gain.
    pub visual_kps: f64,
}

/// Fractional change of the semi-major axis.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisChange {
    /// The physical `da/a`, within `[-0.5, 0.5]`.
    pub true_ratio: f64,
    /// The gained `da/a` that drives the post-burn orbit, within `[-0.5, 0.5]`.
    pub visual_ratio: f64,
}

/// The verdict on a deflection attempt.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImpactOutcome {
    /// Miss distance at the nominal encounter, in kilometers.
    pub miss_km: f64,
    /// Miss distance at the nominal encounter, in AU.
    pub miss_au: f64,
    /// Whether the miss distance reached the threshold.
    pub success: bool,
    /// The threshold the miss distance was held against, in kilometers.
    pub threshold_km: f64,
}

/// Classifies miss distances against a success threshold.
///
/// # Example
/// ```
/// use neo_sim::deflection::MissionClassifier;
///
/// let classifier = MissionClassifier::default();
/// assert!(classifier.is_success(15_000.0));
/// assert!(!classifier.is_success(14_999.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MissionClassifier {
    /// Miss distance at or above which the mission succeeds, in kilometers.
    pub threshold_km: f64,
}

impl Default for MissionClassifier {
    fn default() -> Self {
        Self {
            threshold_km: 15_000.0,
        }
    }
}

impl MissionClassifier {
    /// Creates a classifier with the given threshold, in kilometers.
    pub fn new(threshold_km: f64) -> Self {
        Self { threshold_km }
    }

    /// Whether a miss distance in kilometers counts as a success.
    pub fn is_success(&self, miss_km: f64) -> bool {
        miss_km >= self.threshold_km
    }

    /// Classifies a computed miss distance.
    pub fn classify(&self, miss: &MissDistance) -> ImpactOutcome {
        ImpactOutcome {
            miss_km: miss.km,
            miss_au: miss.au,
            success: self.is_success(miss.km),
            threshold_km: self.threshold_km,
        }
    }
}

/// Which orbit the asteroid follows at a given time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BurnPhase {
    /// Before the burn: the baseline orbit.
    PreBurn,
    /// At or after the burn: the deflected orbit.
    PostBurn,
}

/// One point of a deflected trajectory.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeflectionSample {
    /// Days since the scenario epoch.
    pub elapsed_days: f64,
    /// Which orbit the sample lies on.
    pub phase: BurnPhase,
    /// The asteroid's position, in AU.
    pub position: DVec3,
}

/// Everything [`DeflectionModel::solve`] produces.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeflectionSolution {
    /// The asteroid mass used in the momentum transfer, in kilograms.
    pub asteroid_mass_kg: f64,
    /// The velocity change.
    pub delta_v: DeltaV,
    /// The semi-major axis change.
    pub axis_change: AxisChange,
    /// Days from the epoch to the burn.
    pub burn_day: f64,
    /// Days from the epoch to the nominal encounter.
    pub encounter_day: f64,
    /// The baseline orbit.
    pub pre_burn: OrbitalElementSet,
    /// The deflected orbit.
    pub post_burn: OrbitalElementSet,
    /// The verdict at the nominal encounter.
    pub outcome: ImpactOutcome,
}

impl DeflectionSolution {
    /// Which orbit the asteroid follows some days after the epoch.
    pub fn phase_at(&self, elapsed_days: f64) -> BurnPhase {
        if elapsed_days < self.burn_day {
            BurnPhase::PreBurn
        } else {
            BurnPhase::PostBurn
        }
    }

    /// The elements in force some days after the epoch.
    pub fn elements_at(&self, elapsed_days: f64) -> &OrbitalElementSet {
        match self.phase_at(elapsed_days) {
            BurnPhase::PreBurn => &self.pre_burn,
            BurnPhase::PostBurn => &self.post_burn,
        }
    }

    /// The asteroid's position some days after the epoch, in AU.
    pub fn position_at(&self, elapsed_days: f64) -> DVec3 {
        self.elements_at(elapsed_days)
            .state_at_elapsed_days(elapsed_days)
            .position
    }

    /// Samples the piecewise trajectory from the epoch to the encounter.
    ///
    /// `count` samples are evenly spaced over `[0, encounter_day]`. A single
    /// sample sits at the epoch, and so does the only sample of a scenario
    /// whose encounter is at the epoch.
    pub fn trajectory(&self, count: usize) -> Vec<DeflectionSample> {
        let count = if self.encounter_day > 0.0 {
            count
        } else {
            count.min(1)
        };
        let step = if count > 1 {
            self.encounter_day / (count - 1) as f64
        } else {
            0.0
        };

        (0..count)
            .map(|i| {
                let elapsed_days = step * i as f64;
                DeflectionSample {
                    elapsed_days,
                    phase: self.phase_at(elapsed_days),
                    position: self.position_at(elapsed_days),
                }
            })
            .collect()
    }
}

fn finite_or(value: f64, fallback: f64, what: &str) -> f64 {
    if value.is_finite() {
        value
    } else {
        log::debug!("{what} is not finite ({value}), using {fallback}");
        fallback
    }
}

fn clamp_logged(value: f64, min: f64, max: f64, what: &str) -> f64 {
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::debug!("{what} clamped from {value} to {clamped}");
    }
    clamped
}

/// Solves deflection scenarios.
///
/// # Example
/// ```
/// use neo_sim::deflection::{DeflectionModel, DeflectionScenario};
///
/// let model = DeflectionModel::default();
///
/// // Without an impactor the asteroid stays on its collision course
/// let mut scenario = DeflectionScenario::default();
/// scenario.impactor.mass_kg = 0.0;
/// let solution = model.solve(&scenario);
///
/// assert!(solution.outcome.miss_km < 1.0);
/// assert!(!solution.outcome.success);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeflectionModel<E = LinearSpeedEccentricity> {
    /// The speed-to-eccentricity law.
    pub eccentricity: E,
    /// The Earth the asteroid is aimed at.
    pub geometry: EncounterGeometry,
    /// The success threshold.
    pub classifier: MissionClassifier,
}

impl Default for DeflectionModel {
    fn default() -> Self {
        Self::new(
            LinearSpeedEccentricity,
            EncounterGeometry::default(),
            MissionClassifier::default(),
        )
    }
}

impl<E: EccentricityModel> DeflectionModel<E> {
    /// Creates a model from its parts.
    pub fn new(
        eccentricity: E,
        geometry: EncounterGeometry,
        classifier: MissionClassifier,
    ) -> Self {
        Self {
            eccentricity,
            geometry,
            classifier,
        }
    }

    /// Mean motion of an orbit with the given semi-major axis, in radians per
    /// day, scaled against the Earth's.
    fn mean_motion_at(&self, semi_major_axis: f64) -> f64 {
        let earth = &self.geometry.earth;
        earth.angular_rate * (semi_major_axis / earth.radius_au).powf(-1.5)
    }

    /// Builds the baseline orbit that meets the Earth after `total_days`.
    fn baseline(&self, eccentricity: f64, total_days: f64, epoch_jd: f64) -> OrbitalElementSet {
        let earth = &self.geometry.earth;
        let true_anomaly = wrap_radians(earth.angle_at(total_days));

        // Semi-major axis for which r(nu) equals the Earth's radius
        let semi_major_axis = earth.radius_au * (1.0 + eccentricity * true_anomaly.cos())
            / (1.0 - eccentricity * eccentricity);
        let mean_motion = self.mean_motion_at(semi_major_axis);
        let mean_anomaly_at_encounter = mean_anomaly_at_true_anomaly(true_anomaly, eccentricity);
        let mean_anomaly = mean_anomaly_at_encounter - mean_motion * total_days;

        OrbitalElementSet {
            semi_major_axis_au: semi_major_axis,
            eccentricity,
            inclination_deg: 0.0,
            ascending_node_longitude_deg: 0.0,
            perihelion_argument_deg: 0.0,
            mean_anomaly_deg: wrap_degrees(mean_anomaly.to_degrees()),
            mean_motion_deg_per_day: mean_motion.to_degrees(),
            epoch_osculation_jd: epoch_jd,
        }
    }

    /// Builds the post-burn orbit through the pre-burn position at `burn_day`.
    ///
    /// The apsidal line is rotated so the new conic passes through the burn
    /// point. If the burn radius lies outside `[a(1 - e), a(1 + e)]`, the
    /// eccentricity is raised to the smallest value that reaches it.
    fn post_burn(
        &self,
        pre_burn: &OrbitalElementSet,
        semi_major_axis: f64,
        burn_day: f64,
    ) -> OrbitalElementSet {
        let state = pre_burn.state_at_elapsed_days(burn_day);
        let burn_radius = state.position.length();
        let burn_angle = state.position.y.atan2(state.position.x);

        let semi_major_axis = semi_major_axis
            .max(burn_radius / (1.0 + MAX_POST_BURN_ECCENTRICITY))
            .min(burn_radius / (1.0 - MAX_POST_BURN_ECCENTRICITY));

        let base_eccentricity = clamp_logged(
            pre_burn.eccentricity,
            MIN_POST_BURN_ECCENTRICITY,
            MAX_POST_BURN_ECCENTRICITY,
            "post-burn eccentricity",
        );
        let eccentricity = base_eccentricity
            .max((burn_radius / semi_major_axis - 1.0).abs())
            .min(MAX_POST_BURN_ECCENTRICITY);
        if eccentricity != base_eccentricity {
            log::debug!(
                "post-burn eccentricity raised from {base_eccentricity} to {eccentricity} to reach r = {burn_radius} AU"
            );
        }

        let semi_latus_rectum = semi_major_axis * (1.0 - eccentricity * eccentricity);
        let cos_true_anomaly = (semi_latus_rectum / burn_radius - 1.0) / eccentricity;
        let cos_true_anomaly = cos_true_anomaly.clamp(-1.0, 1.0);

        // Stay on the same (outbound or inbound) leg as before the burn
        let true_anomaly = if state.true_anomaly.sin() < 0.0 {
            -cos_true_anomaly.acos()
        } else {
            cos_true_anomaly.acos()
        };
        let arg_pe = burn_angle - true_anomaly;

        let eccentric_anomaly = eccentric_anomaly_at_true_anomaly(true_anomaly, eccentricity);
        let mean_anomaly_at_burn =
            mean_anomaly_at_eccentric_anomaly(eccentric_anomaly, eccentricity);
        let mean_motion = self.mean_motion_at(semi_major_axis);
        let mean_anomaly = mean_anomaly_at_burn - mean_motion * burn_day;

        OrbitalElementSet {
            semi_major_axis_au: semi_major_axis,
            eccentricity,
            inclination_deg: 0.0,
            ascending_node_longitude_deg: 0.0,
            perihelion_argument_deg: wrap_degrees(arg_pe.to_degrees()),
            mean_anomaly_deg: wrap_degrees(mean_anomaly.to_degrees()),
            mean_motion_deg_per_day: mean_motion.to_degrees(),
            epoch_osculation_jd: pre_burn.epoch_osculation_jd,
        }
    }

    /// Solves a scenario.
    ///
    /// Never fails: degenerate inputs are clamped or replaced, and each
    /// replacement is logged at `debug` level.
    pub fn solve(&self, scenario: &DeflectionScenario) -> DeflectionSolution {
        let total_days = finite_or(scenario.time_to_encounter_days, 0.0, "time to encounter");
        let total_days = total_days.max(0.0);
        let lead_days = finite_or(scenario.impactor.lead_time_days, 0.0, "lead time");
        let speed_kps = finite_or(scenario.asteroid.speed_kps, 0.0, "asteroid speed");
        let visual_gain = finite_or(scenario.visual_gain, 1.0, "visual gain");

        let eccentricity = clamp_eccentricity(self.eccentricity.eccentricity(speed_kps));
        let pre_burn = self.baseline(eccentricity, total_days, scenario.epoch_jd);

        let asteroid_mass_kg = finite_or(scenario.asteroid.mass_kg(), 0.0, "asteroid mass");
        let impactor = &scenario.impactor;
        let impactor_mass_kg = finite_or(impactor.mass_kg, 0.0, "impactor mass");
        let relative_speed_kps = finite_or(impactor.relative_speed_kps, 0.0, "impactor speed");
        let beta = finite_or(impactor.beta, 1.0, "beta");
        let burn_angle_deg = finite_or(impactor.burn_angle_deg, 0.0, "burn angle");

        let true_kps = beta * impactor_mass_kg * relative_speed_kps
            / asteroid_mass_kg.max(MIN_ASTEROID_MASS_KG);
        let tangent_kps = true_kps * burn_angle_deg.to_radians().cos();

        let true_ratio = clamp_logged(
            2.0 * tangent_kps / speed_kps.max(MIN_SPEED_KPS),
            -MAX_AXIS_RATIO,
            MAX_AXIS_RATIO,
            "da/a",
        );
        let visual_ratio = clamp_logged(
            true_ratio * visual_gain,
            -MAX_AXIS_RATIO,
            MAX_AXIS_RATIO,
            "visual da/a",
        );

        let burn_day = clamp_logged(total_days - lead_days, 0.0, total_days, "burn day");
        let post_burn = self.post_burn(
            &pre_burn,
            pre_burn.semi_major_axis_au * (1.0 + visual_ratio),
            burn_day,
        );

        let miss = self
            .geometry
            .miss_distance_at_elapsed_days(&post_burn, total_days);
        let outcome = self.classifier.classify(&miss);

        log::trace!(
            "deflection: dv = {true_kps:e} km/s, da/a = {true_ratio:e} (visual {visual_ratio:e}), burn at day {burn_day}, miss = {} km",
            outcome.miss_km
        );

        DeflectionSolution {
            asteroid_mass_kg,
            delta_v: DeltaV {
                true_kps,
                tangent_kps,
                visual_kps: tangent_kps * visual_gain,
            },
            axis_change: AxisChange {
                true_ratio,
                visual_ratio,
            },
            burn_day,
            encounter_day: total_days,
            pre_burn,
            post_burn,
            outcome,
        }
    }
}
