//! Circular angle arithmetic on ecliptic longitudes.
//!
//! Longitudes are degrees on a circle (0 == 360). Never subtract them
//! linearly; go through these helpers.

/// Reduce an angle to [0, 360), handling negative input.
pub fn normalize(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}

/// Reduce an angle to (-180, 180].
pub fn signed_delta(angle: f64) -> f64 {
    let a = normalize(angle);
    if a > 180.0 {
        a - 360.0
    } else {
        a
    }
}

/// Minimal absolute circular distance between two longitudes, in [0, 180].
pub fn separation(a: f64, b: f64) -> f64 {
    // |a - b| is exactly symmetric in a and b, and fmod is exact
    let d = (a - b).abs() % 360.0;
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Distance of a separation from an aspect's exact angle.
pub fn deviation(separation_deg: f64, target_deg: f64) -> f64 {
    (separation_deg - target_deg).abs()
}
