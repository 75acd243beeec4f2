//! Conversions between takeoff-angle and roll-pitch spherical coordinates
//!
//! Both coordinate systems describe the direction of an acoustic ray leaving a
//! transducer. Takeoff-angle coordinates are natural for raytracing:
//!
//! - `theta`: angle from vertical down, 0 to 90 degrees
//! - `phi`: azimuth measured from acrosstrack, -90 to 270 degrees
//!
//! Roll-pitch coordinates are natural for applying attitude corrections:
//!
//! - `alpha`: pitch equivalent, -90 to 90 degrees
//! - `beta`: roll equivalent measured from the port horizontal, 0 to 180 degrees
//!
//! All public functions take and return degrees.

/// Degrees per radian
pub const RTD: f64 = 180.0 / std::f64::consts::PI;
/// Radians per degree
pub const DTR: f64 = std::f64::consts::PI / 180.0;

// Below this magnitude the azimuth of a ray is treated as undefined
const SINGULAR_EPS: f64 = 1.0e-12;

/// Converts takeoff angle coordinates `(theta, phi)` to roll-pitch coordinates `(alpha, beta)`
///
/// At `alpha` = ±90 degrees `beta` is undefined and is returned as 0.
#[must_use]
pub fn takeoff_to_rollpitch(theta: f64, phi: f64) -> (f64, f64) {
    let (sin_theta, cos_theta) = (DTR * theta).sin_cos();
    let (sin_phi, cos_phi) = (DTR * phi).sin_cos();
    let x = sin_theta * cos_phi;
    let y = sin_theta * sin_phi;
    let z = cos_theta;

    let across = x.hypot(z);
    let alpha = y.atan2(across);
    let beta = if across < SINGULAR_EPS { 0.0 } else { z.atan2(x) };
    (RTD * alpha, RTD * beta)
}

/// Converts roll-pitch coordinates `(alpha, beta)` to takeoff angle coordinates `(theta, phi)`
///
/// `phi` is returned in [-90, 270). For a vertical ray (`theta` = 0) the
/// azimuth is undefined and is returned as 0.
#[must_use]
pub fn rollpitch_to_takeoff(alpha: f64, beta: f64) -> (f64, f64) {
    let (sin_alpha, cos_alpha) = (DTR * alpha).sin_cos();
    let (sin_beta, cos_beta) = (DTR * beta).sin_cos();
    let x = cos_alpha * cos_beta;
    let y = sin_alpha;
    let z = cos_alpha * sin_beta;

    let horizontal = x.hypot(y);
    let theta = horizontal.atan2(z);
    let mut phi = if horizontal < SINGULAR_EPS {
        0.0
    } else {
        RTD * y.atan2(x)
    };
    if phi < -90.0 {
        phi += 360.0;
    }
    (RTD * theta, phi)
}

/// Returns the `(longitude, latitude)` degrees per meter at a latitude
///
/// Uses the series expansion of the WGS-72 ellipsoid, adequate over the
/// distances between consecutive pings.
#[must_use]
pub fn coor_scale(latitude: f64) -> (f64, f64) {
    const C1: f64 = 111_412.84;
    const C2: f64 = -93.5;
    const C3: f64 = 0.118;
    const C4: f64 = 111_132.92;
    const C5: f64 = -559.82;
    const C6: f64 = 1.175;
    const C7: f64 = 0.0023;

    let radlat = DTR * latitude;
    let mtodeglon =
        1.0 / (C1 * radlat.cos() + C2 * (3.0 * radlat).cos() + C3 * (5.0 * radlat).cos()).abs();
    let mtodeglat = 1.0
        / (C4 + C5 * (2.0 * radlat).cos() + C6 * (4.0 * radlat).cos() + C7 * (6.0 * radlat).cos())
            .abs();
    (mtodeglon, mtodeglat)
}

/// Normalizes a longitude into the range selected by `lonflip`
///
/// `-1` selects [-360, 0], `0` selects [-180, 180] and `1` selects [0, 360].
#[must_use]
pub fn apply_lonflip(lonflip: i8, mut lon: f64) -> f64 {
    let (min, max) = match lonflip {
        i8::MIN..=-1 => (-360.0, 0.0),
        0 => (-180.0, 180.0),
        1..=i8::MAX => (0.0, 360.0),
    };
    if !lon.is_finite() {
        return lon;
    }
    while lon < min {
        lon += 360.0;
    }
    while lon > max {
        lon -= 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_ray_has_zero_azimuth() {
        let (theta, phi) = rollpitch_to_takeoff(0.0, 90.0);
        assert!(theta.abs() < 1e-9);
        assert!(phi.abs() < 1e-9);
    }

    #[test]
    fn starboard_horizontal_ray() {
        let (alpha, beta) = takeoff_to_rollpitch(90.0, 0.0);
        assert!(alpha.abs() < 1e-9);
        assert!(beta.abs() < 1e-9);
    }

    #[test]
    fn scale_at_equator() {
        let (mtodeglon, mtodeglat) = coor_scale(0.0);
        // roughly 111 km per degree both ways
        assert!((1.0 / mtodeglon - 111_319.0).abs() < 100.0);
        assert!((1.0 / mtodeglat - 110_574.0).abs() < 100.0);
    }

    #[test]
    fn lonflip_ranges() {
        assert!((apply_lonflip(0, 190.0) + 170.0).abs() < 1e-12);
        assert!((apply_lonflip(1, -10.0) - 350.0).abs() < 1e-12);
        assert!((apply_lonflip(-1, 10.0) + 350.0).abs() < 1e-12);
    }
}
