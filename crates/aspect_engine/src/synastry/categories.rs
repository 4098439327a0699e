use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aspects::AspectKind;
use crate::ephemeris::Body;

/// Compatibility categories and their fixed weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Emotional,
    Communication,
    Chemistry,
    Stability,
    ElementalBalance,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Emotional,
        Category::Communication,
        Category::Chemistry,
        Category::Stability,
        Category::ElementalBalance,
    ];

    /// Share of the total score. The five weights sum to 1.
    pub fn weight(self) -> f64 {
        match self {
            Category::Emotional => 0.25,
            Category::Communication => 0.20,
            Category::Chemistry => 0.25,
            Category::Stability => 0.20,
            Category::ElementalBalance => 0.10,
        }
    }

    /// Cross-chart body pairs this category watches, in either order.
    /// Elemental balance watches none; it compares element distributions.
    pub fn pairs(self) -> &'static [(Body, Body)] {
        match self {
            Category::Emotional => &[(Body::Moon, Body::Venus), (Body::Moon, Body::Moon)],
            Category::Communication => &[(Body::Mercury, Body::Mercury), (Body::Mercury, Body::Moon)],
            Category::Chemistry => &[(Body::Venus, Body::Mars), (Body::Venus, Body::Sun)],
            Category::Stability => &[(Body::Saturn, Body::Sun), (Body::Saturn, Body::Moon)],
            Category::ElementalBalance => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Emotional => "emotional",
            Category::Communication => "communication",
            Category::Chemistry => "chemistry",
            Category::Stability => "stability",
            Category::ElementalBalance => "elemental_balance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Score out of 10 for an exact aspect; harmonious aspects rank higher.
pub fn base_score(kind: AspectKind) -> f64 {
    match kind {
        AspectKind::Conjunction => 10.0,
        AspectKind::Trine => 9.0,
        AspectKind::Sextile => 7.5,
        AspectKind::Opposition => 6.0,
        AspectKind::Square => 4.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        let total: f64 = Category::ALL.iter().map(|c| c.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }
}
