//! Preset scan horizons.
//!
//! Longer horizons sample more coarsely and drop fast bodies, whose
//! transits over months are too frequent to be meaningful.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ephemeris::Body;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Horizon {
    Day,
    Week,
    Month,
    HalfYear,
    Year,
}

impl Horizon {
    pub fn span(self) -> Duration {
        match self {
            Horizon::Day => Duration::days(1),
            Horizon::Week => Duration::days(7),
            Horizon::Month => Duration::days(30),
            Horizon::HalfYear => Duration::days(182),
            Horizon::Year => Duration::days(365),
        }
    }

    /// Recommended sampling step.
    pub fn step(self) -> Duration {
        match self {
            Horizon::Day | Horizon::Week => Duration::hours(1),
            Horizon::Month => Duration::hours(3),
            Horizon::HalfYear | Horizon::Year => Duration::hours(6),
        }
    }

    /// Transiting bodies skipped at this horizon.
    pub fn exclusions(self) -> &'static [Body] {
        match self {
            Horizon::Day | Horizon::Week => &[],
            Horizon::Month => &[Body::Moon],
            Horizon::HalfYear => &[Body::Moon, Body::Mercury, Body::Venus, Body::Sun],
            Horizon::Year => &[Body::Moon, Body::Mercury, Body::Venus, Body::Sun, Body::Mars],
        }
    }
}

impl FromStr for Horizon {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "1d" | "day" | "1_day" => Ok(Horizon::Day),
            "1w" | "week" | "1_week" => Ok(Horizon::Week),
            "1m" | "month" | "1_month" => Ok(Horizon::Month),
            "6m" | "half_year" | "6_months" => Ok(Horizon::HalfYear),
            "1y" | "year" | "1_year" => Ok(Horizon::Year),
            _ => Err(ConfigError::UnknownHorizon {
                name: s.to_string(),
            }),
        }
    }
}
