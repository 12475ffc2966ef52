#![cfg(test)]

use glam::{DVec2, DVec3};

use crate::{
    sampler::{DisplayScale, SamplerError, ShapeSampler, TrajectorySampler},
    solvers::{
        eccentric_anomaly_at_true_anomaly, mean_anomaly_at_true_anomaly, solve_eccentric_anomaly,
        true_anomaly_at_eccentric_anomaly, wrap_radians,
    },
    wrap_degrees, Matrix3x2, Orbit, Orbit2D, OrbitTrait, OrbitalElementSet, RawElements,
    GAUSSIAN_MEAN_MOTION_DEG, J2000_JD,
};
use std::f64::consts::{PI, TAU};

const ORBIT_POLL_ANGLES: usize = 4096;

mod impact;

use assertions::*;
use polling::*;
use seeders::*;

fn unit_orbit() -> Orbit {
    Orbit::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0)
}

/// Smallest distance between two angles on the circle.
fn angle_distance(a: f64, b: f64) -> f64 {
    let d = wrap_radians(a - b);
    d.min(TAU - d)
}

#[test]
fn unit_orbit_angle_3d() {
    let orbit = unit_orbit();

    assert_orbit_positions_3d(
        &orbit,
        &[
            ("unit orbit 1", 0.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
            ("unit orbit 2", 0.5 * PI, DVec3::new(0.0, 1.0, 0.0)),
            ("unit orbit 3", 1.0 * PI, DVec3::new(-1.0, 0.0, 0.0)),
            ("unit orbit 4", 1.5 * PI, DVec3::new(0.0, -1.0, 0.0)),
            ("unit orbit 5", 2.0 * PI, DVec3::new(1.0, 0.0, 0.0)),
        ],
    );
}

#[test]
fn unit_orbit_transformation() {
    // Since every orientation angle is zero, it should not do anything.
    let orbit = unit_orbit();

    let tests = [(1.0, 1.0), (1.0, 0.0), (0.0, 1.0), (0.0, 0.0)];

    for point in tests {
        let transformed = orbit.transform_pqw_vector(DVec2::new(point.0, point.1));

        assert_eq!(transformed.x, point.0);
        assert_eq!(transformed.y, point.1);
        assert_eq!(transformed.z, 0.0);
    }
}

#[test]
fn tilted_equidistant() {
    let orbit = Orbit::new(
        1.0,
        0.0,
        2.848915582093,
        1.9520945821,
        2.1834987325,
        0.69482153021,
        1.0,
    );

    for point in poll_orbit(&orbit) {
        assert_almost_eq(point.length(), 1.0, "Distance");
    }
}

#[test]
fn tilted_90deg() {
    let orbit = Orbit::new(1.0, 0.0, PI / 2.0, 0.0, 0.0, 0.0, 1.0);

    let tests = [
        ("Vector 1", (1.0, 0.0), DVec3::new(1.0, 0.0, 0.0)),
        ("Vector 2", (0.0, 1.0), DVec3::new(0.0, 0.0, 1.0)),
        ("Vector 3", (-1.0, 0.0), DVec3::new(-1.0, 0.0, 0.0)),
        ("Vector 4", (0.0, -1.0), DVec3::new(0.0, 0.0, -1.0)),
    ];

    for (what, point, expected) in tests.iter() {
        let transformed = orbit.transform_pqw_vector(DVec2::new(point.0, point.1));

        assert_almost_eq_vec3(transformed, *expected, what);
    }
}

#[test]
fn orientation_matrix_matches_rotation_sequence() {
    // Rz(lan) * Rx(inc) * Rz(arg_pe), applied by hand
    for _ in 0..100 {
        let inc: f64 = rand::random_range(0.0..PI);
        let arg_pe: f64 = rand::random_range(0.0..TAU);
        let lan: f64 = rand::random_range(0.0..TAU);
        let matrix = Matrix3x2::from_orientation(inc, arg_pe, lan);

        let point = DVec2::new(rand::random_range(-2.0..2.0), rand::random_range(-2.0..2.0));

        let rotated = DVec3::new(
            point.x * arg_pe.cos() - point.y * arg_pe.sin(),
            point.x * arg_pe.sin() + point.y * arg_pe.cos(),
            0.0,
        );
        let tilted = DVec3::new(
            rotated.x,
            rotated.y * inc.cos(),
            rotated.y * inc.sin(),
        );
        let expected = DVec3::new(
            tilted.x * lan.cos() - tilted.y * lan.sin(),
            tilted.x * lan.sin() + tilted.y * lan.cos(),
            tilted.z,
        );

        assert_almost_eq_vec3(matrix.dot_vec(point), expected, "Rotated point");
    }
}

#[test]
fn perihelion_and_aphelion() {
    let orbit = Orbit::new(2.0, 0.5, 0.0, 0.0, 0.0, 0.0, 0.01);

    assert_almost_eq(orbit.get_perihelion(), 1.0, "Perihelion");
    assert_almost_eq(orbit.get_aphelion(), 3.0, "Aphelion");
    assert_almost_eq(orbit.get_semi_latus_rectum(), 1.5, "Semi-latus rectum");
    assert_almost_eq(orbit.get_orbital_period(), TAU / 0.01, "Period");

    assert_orbit_positions_3d(
        &orbit,
        &[
            ("At perihelion", 0.0, DVec3::new(1.0, 0.0, 0.0)),
            ("At aphelion", PI, DVec3::new(-3.0, 0.0, 0.0)),
        ],
    );
}

#[test]
fn eccentricity_is_clamped() {
    let orbit = Orbit::new(1.0, 1.7, 0.0, 0.0, 0.0, 0.0, 1.0);
    assert_eq!(orbit.get_eccentricity(), crate::MAX_ECCENTRICITY);

    let orbit = Orbit::new(1.0, -0.3, 0.0, 0.0, 0.0, 0.0, 1.0);
    assert_eq!(orbit.get_eccentricity(), 0.0);

    let orbit = Orbit2D::new(1.0, f64::NAN, 0.0, 1.0);
    assert_eq!(orbit.get_eccentricity(), 0.0);

    let mut orbit = Orbit::default();
    orbit.set_eccentricity(2.0);
    assert_eq!(orbit.get_eccentricity(), crate::MAX_ECCENTRICITY);
}

#[test]
fn setters_refresh_transformation() {
    let mut orbit = Orbit::new(1.3, 0.2, 0.0, 0.0, 0.0, 0.0, 0.01);
    orbit.set_inclination(0.4);
    orbit.set_arg_pe(1.1);
    orbit.set_long_asc_node(2.5);

    let fresh = Orbit::new(1.3, 0.2, 0.4, 1.1, 2.5, 0.0, 0.01);

    assert_eq!(orbit, fresh);
    assert_eq!(orbit.get_inclination(), 0.4);
    assert_eq!(orbit.get_arg_pe(), 1.1);
    assert_eq!(orbit.get_long_asc_node(), 2.5);
}

#[test]
fn planar_orbit_matches_flat_orbit() {
    for _ in 0..100 {
        let a = rand::random_range(0.3..5.0);
        let e = rand::random_range(0.0..0.95);
        let mean_anomaly = rand::random_range(0.0..TAU);
        let n = rand::random_range(0.001..0.05);

        let planar = Orbit2D::new(a, e, mean_anomaly, n);
        let flat = Orbit::new_flat(a, e, 0.0, mean_anomaly, n);

        for t in [0.0, 17.0, 400.0, 12_345.0] {
            let p2 = planar.get_planar_position_at_time(t);
            let p3 = flat.get_position_at_time(t);

            assert_almost_eq_vec3(p2.extend(0.0), p3, "Planar vs flat position");
        }
    }
}

#[test]
fn kepler_solver_residual_grid() {
    for i in 0..=95 {
        let e = i as f64 * 0.01;
        for j in 0..2000 {
            let mean_anomaly = j as f64 * TAU / 2000.0;
            let ecc_anomaly = solve_eccentric_anomaly(mean_anomaly, e);

            assert_kepler_residual(mean_anomaly, e, ecc_anomaly, 1e-8);
        }
    }
}

#[test]
fn kepler_solver_random() {
    for _ in 0..10_000 {
        let e = rand::random_range(0.0..=0.95);
        let mean_anomaly = rand::random_range(0.0..TAU);
        let ecc_anomaly = solve_eccentric_anomaly(mean_anomaly, e);

        assert_kepler_residual(mean_anomaly, e, ecc_anomaly, 1e-8);
    }
}

#[test]
fn kepler_solver_near_parabolic_boundary() {
    // At e = 0.99 the fixed iteration cap is not always enough for
    // mean anomalies close to 0 or tau; only finiteness holds there.
    let e = crate::MAX_ECCENTRICITY;

    for j in 0..ORBIT_POLL_ANGLES {
        let mean_anomaly = j as f64 * TAU / ORBIT_POLL_ANGLES as f64;
        let ecc_anomaly = solve_eccentric_anomaly(mean_anomaly, e);
        assert!(
            ecc_anomaly.is_finite(),
            "Solver returned {ecc_anomaly} for M = {mean_anomaly}"
        );
    }

    for mean_anomaly in [0.5, 1.0, 2.0, PI, 4.0, 5.0] {
        let ecc_anomaly = solve_eccentric_anomaly(mean_anomaly, e);
        assert_kepler_residual(mean_anomaly, e, ecc_anomaly, 1e-8);
    }
}

#[test]
fn kepler_solver_clamps_eccentricity() {
    for mean_anomaly in [0.3, 1.0, 2.5, 5.5] {
        assert_eq!(
            solve_eccentric_anomaly(mean_anomaly, 1.5),
            solve_eccentric_anomaly(mean_anomaly, crate::MAX_ECCENTRICITY),
        );
        assert_eq!(solve_eccentric_anomaly(mean_anomaly, -0.5), mean_anomaly);
    }
}

#[test]
fn roundtrip_radius_at_45_degrees() {
    let orbit = Orbit::new(1.5, 0.3, 0.0, 0.0, 0.0, 0.0, 0.01);
    let state = orbit.get_state_at_mean_anomaly(45_f64.to_radians());

    let from_eccentric = 1.5 * (1.0 - 0.3 * state.eccentric_anomaly.cos());
    let from_conic = orbit.get_altitude_at_true_anomaly(state.true_anomaly);

    assert_rel_eq(from_eccentric, from_conic, 1e-6, "Radius at M = 45 deg");
    assert_rel_eq(state.radius, from_conic, 1e-6, "State radius at M = 45 deg");
}

#[test]
fn state_consistency_random_orbits() {
    for _ in 0..20 {
        let orbit = random_orbit();

        for (mean_anomaly, state) in poll_states(&orbit) {
            let conic = orbit.get_altitude_at_true_anomaly(state.true_anomaly);

            assert_rel_eq(state.radius, conic, 1e-9, "Radius vs conic");
            assert_rel_eq(
                state.position.length(),
                state.radius,
                1e-9,
                "Position length",
            );
            let roundtrip = orbit.get_mean_anomaly_at_true_anomaly(state.true_anomaly);
            assert!(
                angle_distance(roundtrip, mean_anomaly) < 1e-6,
                "Mean anomaly roundtrip failed at M = {mean_anomaly}"
            );
        }
    }
}

#[test]
fn true_anomaly_positions_match_mean_anomaly_positions() {
    let orbit = random_orbit();

    for (_, state) in poll_states(&orbit).into_iter().step_by(64) {
        let expected = orbit.get_position_at_true_anomaly(state.true_anomaly);
        assert_almost_eq_vec3(state.position, expected, "Position at true anomaly");
    }
}

#[test]
fn anomaly_conversions_invert() {
    for _ in 0..10_000 {
        let e = rand::random_range(0.0..0.95);
        let true_anomaly = rand::random_range(-PI..PI);

        let ecc_anomaly = eccentric_anomaly_at_true_anomaly(true_anomaly, e);
        let back = true_anomaly_at_eccentric_anomaly(ecc_anomaly, e);

        assert_almost_eq(back, true_anomaly, "True anomaly roundtrip");

        let mean_anomaly = mean_anomaly_at_true_anomaly(true_anomaly, e);
        assert!((0.0..TAU).contains(&mean_anomaly));
    }
}

#[test]
fn wrap_degrees_examples() {
    assert_eq!(wrap_degrees(-10.0), 350.0);
    assert_eq!(wrap_degrees(370.0), 10.0);
    assert_eq!(wrap_degrees(0.0), 0.0);
    assert_eq!(wrap_degrees(360.0), 0.0);
    assert_eq!(wrap_degrees(-720.0), 0.0);
    assert_eq!(wrap_degrees(-1e-20), 0.0);
}

#[test]
fn wrap_degrees_range() {
    for _ in 0..10_000 {
        let angle = rand::random_range(-1e7..1e7);
        let wrapped = wrap_degrees(angle);

        assert!(
            (0.0..360.0).contains(&wrapped),
            "wrap_degrees({angle}) = {wrapped}"
        );
    }
}

#[test]
fn wrap_radians_range() {
    assert_eq!(wrap_radians(-1e-20), 0.0);
    assert_eq!(wrap_radians(TAU), 0.0);

    for _ in 0..10_000 {
        let angle = rand::random_range(-1e5..1e5);
        let wrapped = wrap_radians(angle);

        assert!(
            (0.0..TAU).contains(&wrapped),
            "wrap_radians({angle}) = {wrapped}"
        );
    }
}

#[test]
fn raw_elements_defaults() {
    let raw = RawElements {
        semi_major_axis_au: Some(2.0),
        eccentricity: Some(0.1),
        inclination_deg: Some(f64::NAN),
        ..Default::default()
    };
    let elements = OrbitalElementSet::from_raw(&raw).expect("usable elements");

    assert_eq!(elements.inclination_deg, 0.0);
    assert_eq!(elements.ascending_node_longitude_deg, 0.0);
    assert_eq!(elements.perihelion_argument_deg, 0.0);
    assert_eq!(elements.mean_anomaly_deg, 0.0);
    assert_eq!(elements.epoch_osculation_jd, J2000_JD);
    assert_almost_eq(
        elements.mean_motion_deg_per_day,
        GAUSSIAN_MEAN_MOTION_DEG / 2.0_f64.powf(1.5),
        "Default mean motion",
    );
}

#[test]
fn raw_elements_rejected() {
    let usable = RawElements {
        semi_major_axis_au: Some(1.2),
        eccentricity: Some(0.2),
        ..Default::default()
    };
    assert!(OrbitalElementSet::from_raw(&usable).is_some());

    let rejected = [
        RawElements {
            semi_major_axis_au: None,
            ..usable
        },
        RawElements {
            eccentricity: None,
            ..usable
        },
        RawElements {
            semi_major_axis_au: Some(f64::INFINITY),
            ..usable
        },
        RawElements {
            eccentricity: Some(f64::NAN),
            ..usable
        },
        RawElements {
            semi_major_axis_au: Some(0.0),
            ..usable
        },
        RawElements {
            semi_major_axis_au: Some(-1.0),
            ..usable
        },
    ];

    for raw in rejected {
        assert!(
            OrbitalElementSet::from_raw(&raw).is_none(),
            "{raw:?} accepted"
        );
    }
}

#[test]
fn element_orbit_bridges() {
    let elements = random_elements();
    let orbit = elements.to_orbit();
    let planar = elements.to_orbit_2d();

    assert_eq!(orbit.get_semi_major_axis(), elements.semi_major_axis_au);
    assert_almost_eq(
        orbit.get_inclination(),
        elements.inclination_deg.to_radians(),
        "Inclination",
    );
    assert_almost_eq(
        planar.get_mean_motion(),
        elements.mean_motion_deg_per_day.to_radians(),
        "Mean motion",
    );

    let at_epoch = elements.state_at_julian_date(elements.epoch_osculation_jd);
    assert_almost_eq_vec3(
        at_epoch.position,
        orbit.get_position_at_mean_anomaly(elements.mean_anomaly_deg.to_radians()),
        "Position at epoch",
    );
}

#[test]
fn shape_sampler_follows_conic() {
    let orbit = Orbit::new_flat(1.8, 0.4, 0.0, 0.0, 0.01);
    let points: Vec<DVec3> = ShapeSampler::new(&orbit, 360).collect();

    assert_eq!(points.len(), 360);

    for (k, point) in points.iter().enumerate() {
        let true_anomaly = TAU * k as f64 / 360.0;
        let expected = orbit.get_altitude_at_true_anomaly(true_anomaly);

        assert_almost_eq(point.length(), expected, "Outline radius");
        assert_almost_eq(point.z, 0.0, "Outline height");
    }
}

#[test]
fn shape_sampler_is_restartable() {
    let orbit = random_orbit();
    let sampler = ShapeSampler::new(&orbit, 512);

    assert_eq!(sampler.len(), 512);

    let first: Vec<DVec3> = sampler.clone().collect();
    let second: Vec<DVec3> = sampler.collect();

    assert_eq!(first, second);
    assert_eq!(first, crate::sampler::shape_points(&orbit, 512));
}

#[test]
fn shape_sampler_matches_true_anomaly_polling() {
    let orbit = random_orbit();
    let outline: Vec<DVec3> = ShapeSampler::new(&orbit, ORBIT_POLL_ANGLES).collect();

    for (point, expected) in outline.into_iter().zip(poll_true_anomaly(&orbit)) {
        assert_almost_eq_vec3(point, expected, "Outline point");
    }
}

#[test]
fn trajectory_sampler_is_monotonic() {
    let orbit = random_orbit();
    let sampler = TrajectorySampler::new(&orbit, -30.0, 900.0, 256).expect("valid window");

    assert_eq!(sampler.len(), 256);

    let samples: Vec<_> = sampler.clone().collect();
    assert_eq!(samples.len(), 256);
    assert_eq!(samples[0].elapsed_days, -30.0);
    assert_almost_eq(samples[255].elapsed_days, 900.0, "Last sample time");

    for pair in samples.windows(2) {
        assert!(pair[1].elapsed_days > pair[0].elapsed_days);
    }

    for sample in &samples {
        assert_eq!(sample.state, orbit.get_state_at_time(sample.elapsed_days));
        assert_eq!(
            sample.mean_anomaly,
            orbit.get_mean_anomaly_at_time(sample.elapsed_days)
        );
    }

    let again: Vec<_> = sampler.collect();
    assert_eq!(samples, again);
}

#[test]
fn trajectory_sampler_windows() {
    let orbit = Orbit::default();

    let single: Vec<_> = TrajectorySampler::new(&orbit, 12.0, 12.0, 1)
        .expect("single sample")
        .collect();
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].elapsed_days, 12.0);

    let empty = TrajectorySampler::new(&orbit, 0.0, 10.0, 0).expect("empty window");
    assert_eq!(empty.count(), 0);

    assert_eq!(
        TrajectorySampler::new(&orbit, 10.0, 10.0, 2).err(),
        Some(SamplerError::InvertedWindow {
            start: 10.0,
            end: 10.0
        })
    );
    assert!(matches!(
        TrajectorySampler::new(&orbit, 10.0, 0.0, 5),
        Err(SamplerError::InvertedWindow { .. })
    ));
    assert!(matches!(
        TrajectorySampler::new(&orbit, f64::NAN, 0.0, 5),
        Err(SamplerError::NonFinite { .. })
    ));
    assert!(matches!(
        TrajectorySampler::new(&orbit, 0.0, f64::INFINITY, 1),
        Err(SamplerError::NonFinite { .. })
    ));
}

#[test]
fn element_trajectory_between() {
    let elements = random_elements();
    let start = elements.epoch_osculation_jd + 10.0;
    let samples = elements
        .trajectory_between(start, start + 100.0, 11)
        .expect("valid window");

    assert_eq!(samples.len(), 11);
    assert_almost_eq(samples[0].elapsed_days, 10.0, "First elapsed day");
    assert_almost_eq(samples[10].elapsed_days, 110.0, "Last elapsed day");

    for sample in &samples {
        let expected = elements.state_at_elapsed_days(sample.elapsed_days);
        assert_almost_eq_vec3(
            sample.state.position,
            expected.position,
            "Trajectory position",
        );
    }

    assert!(elements
        .trajectory_between(start, start - 1.0, 3)
        .is_err());
}

#[test]
fn display_scale() {
    let scale = DisplayScale(50.0);

    assert_eq!(
        scale.apply(DVec3::new(1.0, -2.0, 0.5)),
        DVec3::new(50.0, -100.0, 25.0)
    );
    assert_eq!(scale.apply_2d(DVec2::new(0.25, 0.0)), DVec2::new(12.5, 0.0));

    let mut points = vec![DVec3::X, DVec3::Y];
    scale.apply_all(&mut points);
    assert_eq!(
        points,
        vec![DVec3::new(50.0, 0.0, 0.0), DVec3::new(0.0, 50.0, 0.0)]
    );

    assert_eq!(DisplayScale::default(), scale);
}
