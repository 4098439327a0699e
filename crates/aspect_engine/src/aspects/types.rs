use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ephemeris::Body;
use crate::error::ConfigError;

/// The five major aspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectKind {
    Conjunction,
    Sextile,
    Square,
    Trine,
    Opposition,
}

/// Harmonious aspects ease, challenging ones create tension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectNature {
    Harmonious,
    Challenging,
}

impl AspectKind {
    pub const ALL: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    /// Exact angle for this aspect (0, 60, 90, 120, 180)
    pub fn angle(self) -> f64 {
        match self {
            AspectKind::Conjunction => 0.0,
            AspectKind::Sextile => 60.0,
            AspectKind::Square => 90.0,
            AspectKind::Trine => 120.0,
            AspectKind::Opposition => 180.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::Sextile => "sextile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Opposition => "opposition",
        }
    }

    /// Short code used in period keys ("Con", "Sxt", ...)
    pub fn code(self) -> &'static str {
        match self {
            AspectKind::Conjunction => "Con",
            AspectKind::Sextile => "Sxt",
            AspectKind::Square => "Sqr",
            AspectKind::Trine => "Tri",
            AspectKind::Opposition => "Opp",
        }
    }

    pub fn nature(self) -> AspectNature {
        match self {
            AspectKind::Square | AspectKind::Opposition => AspectNature::Challenging,
            _ => AspectNature::Harmonious,
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AspectKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        if key == "sex" {
            return Ok(AspectKind::Sextile);
        }
        AspectKind::ALL
            .iter()
            .copied()
            .find(|k| k.name() == key || k.code().to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownAspect {
                name: s.to_string(),
            })
    }
}

/// One row of an aspect catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    /// Exact separation in degrees
    pub target_angle: f64,
    /// Tolerance radius in degrees
    pub max_orb: f64,
}

impl AspectDefinition {
    pub fn new(kind: AspectKind, max_orb: f64) -> Self {
        Self {
            kind,
            target_angle: kind.angle(),
            max_orb,
        }
    }
}

/// A separation that falls inside some aspect's orb.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectMatch {
    pub aspect: AspectKind,
    /// Angular separation between the two longitudes, [0, 180]
    pub separation: f64,
    /// Distance from the exact aspect angle
    pub deviation: f64,
    /// Orb the match was judged against
    pub max_orb: f64,
    /// 1 at exact, falling linearly to 0 at the orb edge
    pub strength: f64,
}

/// Linear closeness to exact, clamped to [0, 1].
pub fn strength(deviation: f64, max_orb: f64) -> f64 {
    (1.0 - deviation / max_orb).clamp(0.0, 1.0)
}

/// An aspect between two chart points at a single instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstantAspect {
    pub first: Body,
    pub second: Body,
    pub first_longitude: f64,
    pub second_longitude: f64,
    #[serde(flatten)]
    pub aspect: AspectMatch,
    /// Whether the pair is moving toward exact; `None` when speeds are unknown
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub is_applying: Option<bool>,
}

impl InstantAspect {
    /// Whether this aspect joins the two bodies, in either order.
    pub fn joins(&self, a: Body, b: Body) -> bool {
        (self.first == a && self.second == b) || (self.first == b && self.second == a)
    }
}
