use libmbio::coords::{apply_lonflip, rollpitch_to_takeoff, takeoff_to_rollpitch, DTR};
use proptest::prelude::*;

/// Unit vector of a ray in takeoff angle coordinates
fn takeoff_ray(theta: f64, phi: f64) -> [f64; 3] {
    let (sin_theta, cos_theta) = (DTR * theta).sin_cos();
    let (sin_phi, cos_phi) = (DTR * phi).sin_cos();
    [sin_theta * cos_phi, sin_theta * sin_phi, cos_theta]
}

/// Unit vector of a ray in roll-pitch coordinates
fn rollpitch_ray(alpha: f64, beta: f64) -> [f64; 3] {
    let (sin_alpha, cos_alpha) = (DTR * alpha).sin_cos();
    let (sin_beta, cos_beta) = (DTR * beta).sin_cos();
    [cos_alpha * cos_beta, sin_alpha, cos_alpha * sin_beta]
}

fn close(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-7)
}

/// Difference of two angles in degrees, modulo full turns
fn angle_error(a: f64, b: f64) -> f64 {
    ((a - b + 180.0).rem_euclid(360.0) - 180.0).abs()
}

proptest! {
    #[test]
    fn takeoff_angles_describe_the_same_ray(theta in 0.0..=90.0f64, phi in -90.0..270.0f64) {
        let (alpha, beta) = takeoff_to_rollpitch(theta, phi);
        prop_assert!(alpha.abs() <= 90.0 + 1e-9);
        prop_assert!((-1e-9..=180.0 + 1e-9).contains(&beta));
        prop_assert!(close(takeoff_ray(theta, phi), rollpitch_ray(alpha, beta)));
    }

    #[test]
    fn takeoff_angles_come_back_unchanged(theta in 0.001..=90.0f64, phi in -90.0..270.0f64) {
        let (alpha, beta) = takeoff_to_rollpitch(theta, phi);
        let (theta2, phi2) = rollpitch_to_takeoff(alpha, beta);
        prop_assert!(angle_error(theta, theta2) < 1e-6, "theta {theta} came back as {theta2}");
        prop_assert!(angle_error(phi, phi2) < 1e-6, "phi {phi} came back as {phi2}");
        prop_assert!((-90.0..=270.0).contains(&phi2));
    }

    #[test]
    fn conversions_invert_each_other(alpha in -89.0..=89.0f64, beta in 0.0..=180.0f64) {
        let (theta, phi) = rollpitch_to_takeoff(alpha, beta);
        let (alpha2, beta2) = takeoff_to_rollpitch(theta, phi);
        prop_assert!(close(rollpitch_ray(alpha, beta), rollpitch_ray(alpha2, beta2)));
    }

    #[test]
    fn conversions_never_produce_nan(a in -360.0..=360.0f64, b in -360.0..=360.0f64) {
        let (alpha, beta) = takeoff_to_rollpitch(a, b);
        let (theta, phi) = rollpitch_to_takeoff(a, b);
        prop_assert!(!(alpha.is_nan() || beta.is_nan() || theta.is_nan() || phi.is_nan()));
    }

    #[test]
    fn lonflip_stays_in_range(lon in -1000.0..1000.0f64, lonflip in -1i8..=1) {
        let flipped = apply_lonflip(lonflip, lon);
        let (min, max) = match lonflip {
            -1 => (-360.0, 0.0),
            0 => (-180.0, 180.0),
            _ => (0.0, 360.0),
        };
        prop_assert!((min..=max).contains(&flipped));
        let turns = (flipped - lon) / 360.0;
        prop_assert!((turns - turns.round()).abs() < 1e-9);
    }
}

#[test]
fn shallow_and_sideways_rays_keep_their_azimuth() {
    for (theta, phi) in [(0.001, 37.0), (0.1, -90.0), (5.51, -90.0), (2.02, 89.9), (45.0, 269.9)] {
        let (alpha, beta) = takeoff_to_rollpitch(theta, phi);
        let (theta2, phi2) = rollpitch_to_takeoff(alpha, beta);
        assert!(angle_error(theta, theta2) < 1e-6, "{theta} {phi}: theta {theta2}");
        assert!(angle_error(phi, phi2) < 1e-6, "{theta} {phi}: phi {phi2}");
    }
}

#[test]
fn poles_of_both_systems_are_finite() {
    let (alpha, beta) = takeoff_to_rollpitch(90.0, 90.0);
    assert!((alpha - 90.0).abs() < 1e-9);
    assert_eq!(beta, 0.0);

    let (theta, phi) = rollpitch_to_takeoff(90.0, 45.0);
    assert!((theta - 90.0).abs() < 1e-6);
    assert!((phi - 90.0).abs() < 1e-6);

    let (theta, phi) = rollpitch_to_takeoff(0.0, 90.0);
    assert!(theta.abs() < 1e-6);
    assert_eq!(phi, 0.0);
}
