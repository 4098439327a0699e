use chrono::{DateTime, Datelike, Timelike, Utc};
use std::env;
use std::path::PathBuf;
use swisseph::swe::{calc_ut, julday};

use crate::angle;
use crate::ephemeris::provider::PositionProvider;
use crate::ephemeris::types::{Body, BodyPosition, FrameConfig};
use crate::error::ProviderError;

// Swiss Ephemeris body IDs: SUN=0 .. PLUTO=9, TRUE_NODE=11, CHIRON=15.
// The south node is derived from the north node.
const BODY_IDS: &[(Body, i32)] = &[
    (Body::Sun, 0),
    (Body::Moon, 1),
    (Body::Mercury, 2),
    (Body::Venus, 3),
    (Body::Mars, 4),
    (Body::Jupiter, 5),
    (Body::Saturn, 6),
    (Body::Uranus, 7),
    (Body::Neptune, 8),
    (Body::Pluto, 9),
    (Body::NorthNode, 11),
    (Body::Chiron, 15),
];

/// FLG_SWIEPH | FLG_SPEED. Always tropical: sidereal offsets come from
/// the caller's `FrameConfig`, never from library-global sidereal mode.
const FLAGS: u32 = 2 | 256;

/// Swiss Ephemeris backed provider
pub struct SwissEphemerisAdapter {
    _ephemeris_path: PathBuf,
}

impl SwissEphemerisAdapter {
    /// Create a new adapter with optional ephemeris path
    pub fn new(ephemeris_path: Option<PathBuf>) -> Result<Self, ProviderError> {
        let path = ephemeris_path.unwrap_or_else(|| {
            env::var("SWISS_EPHEMERIS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/usr/local/share/swisseph"))
        });

        if !path.exists() {
            return Err(ProviderError::EphemerisUnavailable {
                path: path.display().to_string(),
                message: "Ephemeris path does not exist. Please ensure Swiss Ephemeris data files are installed.".to_string(),
            });
        }

        Ok(Self {
            _ephemeris_path: path,
        })
    }

    fn tropical(&self, body: Body, instant: DateTime<Utc>) -> Result<BodyPosition, ProviderError> {
        let lookup = if body == Body::SouthNode {
            Body::NorthNode
        } else {
            body
        };
        let code = BODY_IDS
            .iter()
            .find(|(b, _)| *b == lookup)
            .map(|(_, code)| *code)
            .ok_or(ProviderError::UnsupportedBody { body })?;

        let jd = datetime_to_julian_day(instant);
        let result = calc_ut(jd, code as u32, FLAGS).map_err(|e| ProviderError::CalculationFailed {
            body,
            instant,
            message: format!("Swiss Ephemeris error: {}", e),
        })?;

        let out = result.out;
        let mut longitude = out[0];
        if body == Body::SouthNode {
            longitude += 180.0;
        }
        Ok(BodyPosition {
            longitude: angle::normalize(longitude),
            speed: out[3],
        })
    }
}

impl PositionProvider for SwissEphemerisAdapter {
    fn position(
        &self,
        body: Body,
        instant: DateTime<Utc>,
        frame: &FrameConfig,
    ) -> Result<BodyPosition, ProviderError> {
        let pos = self.tropical(body, instant)?;
        Ok(BodyPosition {
            longitude: frame.apply(pos.longitude, instant),
            speed: pos.speed,
        })
    }
}

/// Convert UTC datetime to Julian Day
fn datetime_to_julian_day(dt: DateTime<Utc>) -> f64 {
    let hour_decimal = dt.hour() as f64
        + dt.minute() as f64 / 60.0
        + (dt.second() as f64 + dt.nanosecond() as f64 / 1e9) / 3600.0;
    // GREG_CAL = 1
    julday(dt.year(), dt.month() as i32, dt.day() as i32, hour_decimal, 1)
}
