//! Low-precision analytic positions from mean circular orbits.
//!
//! Each planet moves on a circular, coplanar heliocentric orbit at its mean
//! daily motion; the geocentric longitude is the direction from Earth to
//! the planet, so apparent retrograde loops come out naturally. The Moon
//! and lunar node use their mean longitudes. Accuracy is a few degrees,
//! which is enough for demos, tests and benchmarks but not for charts.

use chrono::{DateTime, Utc};

use crate::angle;
use crate::ephemeris::provider::PositionProvider;
use crate::ephemeris::types::{days_since_j2000, Body, BodyPosition, FrameConfig};
use crate::error::ProviderError;

/// Supported span around J2000, in days (roughly 1000 CE to 3000 CE).
const MAX_ABS_DAYS: f64 = 365_250.0;

/// (body, mean longitude at J2000 in degrees, mean motion in degrees/day,
/// semi-major axis in AU)
const ORBITS: &[(Body, f64, f64, f64)] = &[
    (Body::Mercury, 252.250_906, 4.092_334_437, 0.387_098),
    (Body::Venus, 181.979_801, 1.602_130_224, 0.723_330),
    (Body::Mars, 355.433_000, 0.524_020_777, 1.523_679),
    (Body::Jupiter, 34.351_519, 0.083_085_300, 5.202_603),
    (Body::Saturn, 50.077_444, 0.033_444_228, 9.554_909),
    (Body::Uranus, 314.055_005, 0.011_725_806, 19.218_446),
    (Body::Neptune, 304.348_665, 0.005_981_000, 30.110_387),
    (Body::Pluto, 238.928_810, 0.003_975_000, 39.482_120),
];

const EARTH_L0: f64 = 100.466_457;
const EARTH_RATE: f64 = 0.985_647_335;
const EARTH_A: f64 = 1.000_001;

const MOON_L0: f64 = 218.316_448;
const MOON_RATE: f64 = 13.176_396_48;

const NODE_L0: f64 = 125.044_548;
const NODE_RATE: f64 = -0.052_953_765;

/// Analytic provider; see the module docs for what it models.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanOrbitProvider;

impl MeanOrbitProvider {
    pub fn new() -> Self {
        Self
    }

    /// Tropical geocentric longitude and speed.
    fn tropical(&self, body: Body, days: f64) -> Option<(f64, f64)> {
        let earth = EARTH_L0 + EARTH_RATE * days;
        match body {
            Body::Sun => Some((earth + 180.0, EARTH_RATE)),
            Body::Moon => Some((MOON_L0 + MOON_RATE * days, MOON_RATE)),
            Body::NorthNode => Some((NODE_L0 + NODE_RATE * days, NODE_RATE)),
            Body::SouthNode => Some((NODE_L0 + 180.0 + NODE_RATE * days, NODE_RATE)),
            Body::Chiron => None,
            _ => {
                let &(_, l0, rate, a) = ORBITS.iter().find(|(b, ..)| *b == body)?;
                Some(geocentric(l0 + rate * days, rate, a, earth))
            }
        }
    }
}

/// Project a heliocentric circular orbit onto the geocentric ecliptic.
fn geocentric(planet_lon: f64, planet_rate: f64, planet_a: f64, earth_lon: f64) -> (f64, f64) {
    let (lp, le) = (planet_lon.to_radians(), earth_lon.to_radians());
    let (np, ne) = (planet_rate.to_radians(), EARTH_RATE.to_radians());

    let x = planet_a * lp.cos() - EARTH_A * le.cos();
    let y = planet_a * lp.sin() - EARTH_A * le.sin();
    let dx = -planet_a * np * lp.sin() + EARTH_A * ne * le.sin();
    let dy = planet_a * np * lp.cos() - EARTH_A * ne * le.cos();

    let lon = y.atan2(x).to_degrees();
    let speed = ((x * dy - y * dx) / (x * x + y * y)).to_degrees();
    (lon, speed)
}

impl PositionProvider for MeanOrbitProvider {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError> {
        let days = days_since_j2000(instant);
        if !days.is_finite() || days.abs() > MAX_ABS_DAYS {
            return Err(ProviderError::OutOfRange { instant });
        }
        let (lon, speed) = self
            .tropical(body, days)
            .ok_or(ProviderError::UnsupportedBody { body })?;
        Ok(BodyPosition {
            longitude: frame.apply(angle::normalize(lon), instant),
            speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn sun_near_capricorn_at_j2000() {
        let t = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let sun = MeanOrbitProvider
            .position(Body::Sun, t, &FrameConfig::Tropical)
            .unwrap();
        // true value is ~280.4
        assert!((sun.longitude - 280.47).abs() < 1.0);
        assert!(!sun.retrograde());
    }

    #[test]
    fn mars_goes_retrograde_near_opposition() {
        let provider = MeanOrbitProvider;
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let retro = (0..800)
            .map(|d| start + Duration::days(d))
            .filter_map(|t| provider.position(Body::Mars, t, &FrameConfig::Tropical).ok())
            .any(|p| p.retrograde());
        assert!(retro);
    }

    #[test]
    fn rejects_chiron_and_far_dates() {
        let provider = MeanOrbitProvider;
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            provider.position(Body::Chiron, t, &FrameConfig::Tropical),
            Err(ProviderError::UnsupportedBody { .. })
        ));
        let far = Utc.with_ymd_and_hms(3500, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            provider.position(Body::Sun, far, &FrameConfig::Tropical),
            Err(ProviderError::OutOfRange { .. })
        ));
    }

    #[test]
    fn nodes_are_opposite() {
        let t = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let n = MeanOrbitProvider
            .position(Body::NorthNode, t, &FrameConfig::Tropical)
            .unwrap();
        let s = MeanOrbitProvider
            .position(Body::SouthNode, t, &FrameConfig::Tropical)
            .unwrap();
        assert!((angle::separation(n.longitude, s.longitude) - 180.0).abs() < 1e-9);
        assert!(n.retrograde());
    }
}
