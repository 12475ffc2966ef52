use super::assertions::*;
use crate::{
    impact::{
        kinetic_energy_j, sphere_mass_kg, tnt_megatons, CraterModel, EffectsModel,
        ImpactEnergyModel, LinearEffectsModel, ToyCraterModel,
    },
    ApproachEvent, CelestialBody, RawElements,
};

#[test]
fn five_km_asteroid_at_twenty_kps() {
    let mass = sphere_mass_kg(5.0, 3000.0);
    let energy = kinetic_energy_j(mass, 20.0);
    let megatons = tnt_megatons(energy);

    assert_rel_eq(mass, 1.96e14, 0.01, "Mass");
    assert_rel_eq(energy, 3.93e22, 0.01, "Kinetic energy");
    assert_rel_eq(megatons, 9.39e6, 0.01, "TNT equivalent");
}

#[test]
fn energy_scales_with_square_of_speed() {
    let slow = kinetic_energy_j(1e12, 10.0);
    let fast = kinetic_energy_j(1e12, 20.0);

    assert_rel_eq(fast / slow, 4.0, 1e-12, "Energy ratio");
    assert_eq!(kinetic_energy_j(1e12, 0.0), 0.0);
    assert_eq!(tnt_megatons(4.184e15), 1.0);
}

#[test]
fn toy_crater_law() {
    let crater = ToyCraterModel;

    assert_eq!(crater.crater_diameter_km(5.0, 20.0), 5.0);
    assert_eq!(crater.crater_diameter_km(10.0, 25.0), 11.0);
    assert_eq!(crater.crater_diameter_km(20.0, 30.0), 24.0);
    // Small impactors bottom out
    assert_eq!(crater.crater_diameter_km(0.1, 20.0), 5.0);
    assert_eq!(crater.crater_diameter_km(0.0, 0.0), 5.0);
}

#[test]
fn linear_effects() {
    let effects = LinearEffectsModel::default().effects(5.0);

    assert_eq!(effects.blast_radius_km, 20.0);
    assert_eq!(effects.affected_population, 250_000);

    let custom = LinearEffectsModel {
        blast_radius_per_crater_km: 2.5,
        population_per_crater_km: 10.0,
    };
    let effects = custom.effects(12.0);
    assert_eq!(effects.blast_radius_km, 30.0);
    assert_eq!(effects.affected_population, 120);
}

#[test]
fn estimate_pipeline() {
    let model = ImpactEnergyModel::default();
    let estimate = model.estimate(5.0, 20.0, None);

    assert_eq!(estimate.mass_kg, sphere_mass_kg(5.0, 3000.0));
    assert_eq!(
        estimate.tnt_megatons,
        tnt_megatons(estimate.kinetic_energy_j)
    );
    assert_eq!(estimate.crater_km, 5.0);
    assert_eq!(estimate.effects.blast_radius_km, 20.0);

    let known_mass = model.estimate(5.0, 20.0, Some(1e10));
    assert_eq!(known_mass.mass_kg, 1e10);
    assert_eq!(known_mass.kinetic_energy_j, kinetic_energy_j(1e10, 20.0));
    assert_eq!(known_mass.crater_km, estimate.crater_km);
}

#[test]
fn pluggable_crater_law() {
    let model = ImpactEnergyModel::new(
        |diameter_km: f64, _speed_kps: f64| diameter_km * 20.0,
        LinearEffectsModel::default(),
        2000.0,
    );
    let estimate = model.estimate(2.0, 15.0, None);

    assert_eq!(estimate.crater_km, 40.0);
    assert_eq!(estimate.effects.blast_radius_km, 160.0);
    assert_eq!(estimate.mass_kg, sphere_mass_kg(2.0, 2000.0));
}

#[test]
fn body_mass_and_estimate() {
    let model = ImpactEnergyModel::default();
    let body = CelestialBody::new("2000433", "Eros", None);
    assert_eq!(body.mass_kg(3000.0), None);
    assert!(body.impact_estimate(&model).is_none());

    let body = body.with_diameter_km(5.0);
    assert_eq!(body.mass_kg(3000.0), Some(sphere_mass_kg(5.0, 3000.0)));
    assert!(body.impact_estimate(&model).is_none());

    let body = body.with_approach(ApproachEvent {
        epoch_unix_ms: 1_700_000_000_000,
        date: "2023-Nov-14 22:13".to_string(),
        miss_km: 4.2e7,
        miss_au: 0.28,
        velocity_kps: 20.0,
    });
    let estimate = body
        .impact_estimate(&model)
        .expect("diameter and approach are known");
    assert_rel_eq(estimate.tnt_megatons, 9.39e6, 0.01, "TNT equivalent");

    let body = body.with_mass_kg(6.7e15);
    assert_eq!(body.mass_kg(3000.0), Some(6.7e15));
    let estimate = body
        .impact_estimate(&model)
        .expect("diameter and approach are known");
    assert_eq!(estimate.mass_kg, 6.7e15);
}

#[test]
fn unusable_elements_still_make_a_body() {
    let body = CelestialBody::from_raw("3", "Lost", &RawElements::default());
    assert!(body.elements.is_none());
    assert!(body.orbit().is_none());

    let raw = RawElements {
        semi_major_axis_au: Some(1.5),
        eccentricity: Some(0.2),
        ..Default::default()
    };
    let body = CelestialBody::from_raw("4", "Found", &raw);
    assert!(body.orbit().is_some());
    assert!(!body.is_potentially_hazardous);
}
