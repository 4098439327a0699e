use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::angle;
use crate::error::ConfigError;

/// Unix timestamp of the J2000.0 epoch (2000-01-01T12:00:00Z).
const J2000_UNIX_SECONDS: i64 = 946_728_000;
const J2000_JULIAN_DAY: f64 = 2_451_545.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// General precession in longitude, degrees per day (50.290966"/yr).
pub const PRECESSION_DEG_PER_DAY: f64 = 50.290966 / 3600.0 / 365.25;

/// Days (fractional) elapsed since J2000.0.
pub fn days_since_j2000(instant: DateTime<Utc>) -> f64 {
    let secs = (instant.timestamp() - J2000_UNIX_SECONDS) as f64;
    (secs + instant.timestamp_subsec_nanos() as f64 / 1e9) / SECONDS_PER_DAY
}

/// UT Julian day for an instant.
pub fn julian_day(instant: DateTime<Utc>) -> f64 {
    J2000_JULIAN_DAY + days_since_j2000(instant)
}

/// Bodies whose positions this crate knows how to ask for.
///
/// Declaration order is the fixed body ordering used for every tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    Chiron,
    NorthNode,
    SouthNode,
}

impl Body {
    pub const ALL: [Body; 13] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
        Body::Chiron,
        Body::NorthNode,
        Body::SouthNode,
    ];

    /// Sun through Pluto, the default chart bodies.
    pub const PLANETS: [Body; 10] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
        Body::Pluto,
    ];

    /// Lowercase identifier, as used in configuration files.
    pub fn id(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Moon => "moon",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
            Body::Pluto => "pluto",
            Body::Chiron => "chiron",
            Body::NorthNode => "north_node",
            Body::SouthNode => "south_node",
        }
    }

    /// Three-letter code ("Sun", "Moo", "Mer", ...).
    pub fn short_code(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moo",
            Body::Mercury => "Mer",
            Body::Venus => "Ven",
            Body::Mars => "Mar",
            Body::Jupiter => "Jup",
            Body::Saturn => "Sat",
            Body::Uranus => "Ura",
            Body::Neptune => "Nep",
            Body::Pluto => "Plu",
            Body::Chiron => "Chi",
            Body::NorthNode => "NNo",
            Body::SouthNode => "SNo",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
            Body::Chiron => "Chiron",
            Body::NorthNode => "North Node",
            Body::SouthNode => "South Node",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Body {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "rahu" | "true_node" | "mean_node" => return Ok(Body::NorthNode),
            "ketu" => return Ok(Body::SouthNode),
            _ => {}
        }
        Body::ALL
            .iter()
            .copied()
            .find(|b| b.id() == key || b.short_code().to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownBody {
                name: s.to_string(),
            })
    }
}

/// Sidereal offset models. Values are the offset at J2000.0, advanced
/// linearly at the general precession rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ayanamsha {
    Lahiri,
    Raman,
    Krishnamurti,
    FaganBradley,
    DeLuce,
    Yukteshwar,
    Custom { offset_deg: f64 },
}

const AYANAMSHAS: &[(&str, Ayanamsha)] = &[
    ("lahiri", Ayanamsha::Lahiri),
    ("chitrapaksha", Ayanamsha::Lahiri),
    ("raman", Ayanamsha::Raman),
    ("krishnamurti", Ayanamsha::Krishnamurti),
    ("faganbradley", Ayanamsha::FaganBradley),
    ("deluce", Ayanamsha::DeLuce),
    ("yukteshwar", Ayanamsha::Yukteshwar),
];

impl Ayanamsha {
    /// Offset at J2000.0 in degrees.
    pub fn j2000_offset(self) -> f64 {
        match self {
            Ayanamsha::Lahiri => 23.857_092,
            Ayanamsha::Raman => 22.410_791,
            Ayanamsha::Krishnamurti => 23.760_240,
            Ayanamsha::FaganBradley => 24.740_300,
            Ayanamsha::DeLuce => 27.815_753,
            Ayanamsha::Yukteshwar => 22.478_803,
            Ayanamsha::Custom { offset_deg } => offset_deg,
        }
    }

    /// Offset in degrees at the given instant.
    pub fn offset_at(self, instant: DateTime<Utc>) -> f64 {
        self.j2000_offset() + PRECESSION_DEG_PER_DAY * days_since_j2000(instant)
    }
}

impl FromStr for Ayanamsha {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        AYANAMSHAS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, a)| *a)
            .ok_or_else(|| ConfigError::UnknownAyanamsha {
                name: s.to_string(),
                valid: AYANAMSHAS.iter().map(|(name, _)| name.to_string()).collect(),
            })
    }
}

/// Reference frame for longitudes. Passed explicitly to every lookup;
/// there is no process-wide frame state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "zodiac", rename_all = "snake_case")]
pub enum FrameConfig {
    #[default]
    Tropical,
    Sidereal { ayanamsha: Ayanamsha },
}

impl FrameConfig {
    pub fn sidereal(ayanamsha: Ayanamsha) -> Self {
        FrameConfig::Sidereal { ayanamsha }
    }

    /// Convert a tropical longitude into this frame.
    pub fn apply(&self, tropical_lon: f64, instant: DateTime<Utc>) -> f64 {
        match self {
            FrameConfig::Tropical => angle::normalize(tropical_lon),
            FrameConfig::Sidereal { ayanamsha } => {
                angle::normalize(tropical_lon - ayanamsha.offset_at(instant))
            }
        }
    }
}

/// A body's ecliptic position as returned by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyPosition {
    /// Longitude in degrees, [0, 360)
    pub longitude: f64,
    /// Speed in longitude (degrees per day)
    pub speed: f64,
}

impl BodyPosition {
    pub fn retrograde(&self) -> bool {
        self.speed < 0.0
    }
}

/// One body's longitude in a chart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub body: Body,
    pub longitude: f64,
    /// Degrees per day, when known
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub speed: Option<f64>,
}

impl ChartPoint {
    pub fn new(body: Body, longitude: f64) -> Self {
        Self {
            body,
            longitude,
            speed: None,
        }
    }

    pub fn with_speed(body: Body, longitude: f64, speed: f64) -> Self {
        Self {
            body,
            longitude,
            speed: Some(speed),
        }
    }

    pub fn from_position(body: Body, position: BodyPosition) -> Self {
        Self::with_speed(body, position.longitude, position.speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_names_and_short_codes() {
        assert_eq!("moon".parse::<Body>().unwrap(), Body::Moon);
        assert_eq!("Moo".parse::<Body>().unwrap(), Body::Moon);
        assert_eq!("North Node".parse::<Body>().unwrap(), Body::NorthNode);
        assert_eq!("rahu".parse::<Body>().unwrap(), Body::NorthNode);
        assert!(matches!(
            "vulcan".parse::<Body>(),
            Err(ConfigError::UnknownBody { .. })
        ));
    }

    #[test]
    fn j2000_is_day_zero() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(days_since_j2000(j2000), 0.0);
        assert_eq!(julian_day(j2000), 2_451_545.0);
    }

    #[test]
    fn sidereal_frame_subtracts_offset() {
        let j2000 = Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap();
        let frame = FrameConfig::sidereal(Ayanamsha::Custom { offset_deg: 24.0 });
        assert!((frame.apply(10.0, j2000) - 346.0).abs() < 1e-9);
        assert_eq!(FrameConfig::Tropical.apply(370.0, j2000), 10.0);
    }

    #[test]
    fn ayanamsha_names_are_forgiving() {
        assert_eq!("Fagan_Bradley".parse::<Ayanamsha>().unwrap(), Ayanamsha::FaganBradley);
        assert_eq!("Lahiri".parse::<Ayanamsha>().unwrap(), Ayanamsha::Lahiri);
        assert!("sassanian".parse::<Ayanamsha>().is_err());
    }
}
