//! Signs, elements and modalities, and the simple chart traits derived
//! from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::angle;
use crate::ephemeris::{Body, ChartPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl Sign {
    pub const ALL: [Sign; 12] = [
        Sign::Aries,
        Sign::Taurus,
        Sign::Gemini,
        Sign::Cancer,
        Sign::Leo,
        Sign::Virgo,
        Sign::Libra,
        Sign::Scorpio,
        Sign::Sagittarius,
        Sign::Capricorn,
        Sign::Aquarius,
        Sign::Pisces,
    ];

    /// Sign containing an ecliptic longitude (30 degrees per sign).
    pub fn from_longitude(longitude: f64) -> Self {
        let index = (angle::normalize(longitude) / 30.0).floor() as usize;
        Self::ALL[index.min(11)]
    }

    pub fn element(self) -> Element {
        match self {
            Sign::Aries | Sign::Leo | Sign::Sagittarius => Element::Fire,
            Sign::Taurus | Sign::Virgo | Sign::Capricorn => Element::Earth,
            Sign::Gemini | Sign::Libra | Sign::Aquarius => Element::Air,
            Sign::Cancer | Sign::Scorpio | Sign::Pisces => Element::Water,
        }
    }

    pub fn modality(self) -> Modality {
        match self {
            Sign::Aries | Sign::Cancer | Sign::Libra | Sign::Capricorn => Modality::Cardinal,
            Sign::Taurus | Sign::Leo | Sign::Scorpio | Sign::Aquarius => Modality::Fixed,
            _ => Modality::Mutable,
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

impl Element {
    pub const ALL: [Element; 4] = [Element::Fire, Element::Earth, Element::Air, Element::Water];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Cardinal,
    Fixed,
    Mutable,
}

impl Modality {
    pub const ALL: [Modality; 3] = [Modality::Cardinal, Modality::Fixed, Modality::Mutable];

    pub fn description(self) -> &'static str {
        match self {
            Modality::Cardinal => "Initiating and action-oriented",
            Modality::Fixed => "Stable and persistent",
            Modality::Mutable => "Adaptable and flexible",
        }
    }
}

/// Share of placements per element; sums to 1 for a non-empty chart.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementBalance {
    pub fire: f64,
    pub earth: f64,
    pub air: f64,
    pub water: f64,
}

impl ElementBalance {
    pub fn from_points(points: &[ChartPoint]) -> Self {
        let mut balance = Self::default();
        if points.is_empty() {
            return balance;
        }
        let share = 1.0 / points.len() as f64;
        for p in points {
            *balance.get_mut(Sign::from_longitude(p.longitude).element()) += share;
        }
        balance
    }

    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::Fire => self.fire,
            Element::Earth => self.earth,
            Element::Air => self.air,
            Element::Water => self.water,
        }
    }

    fn get_mut(&mut self, element: Element) -> &mut f64 {
        match element {
            Element::Fire => &mut self.fire,
            Element::Earth => &mut self.earth,
            Element::Air => &mut self.air,
            Element::Water => &mut self.water,
        }
    }

    /// Sum of absolute differences, in [0, 2].
    pub fn distance(&self, other: &ElementBalance) -> f64 {
        Element::ALL
            .iter()
            .map(|&e| (self.get(e) - other.get(e)).abs())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        Element::ALL.iter().all(|&e| self.get(e) == 0.0)
    }

    /// First element with the largest share, in Fire, Earth, Air, Water order.
    pub fn dominant(&self) -> Option<Element> {
        if self.is_empty() {
            return None;
        }
        Element::ALL
            .iter()
            .copied()
            .fold(None, |best: Option<Element>, e| match best {
                Some(b) if self.get(b) >= self.get(e) => Some(b),
                _ => Some(e),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperament {
    ExtrovertLeaning,
    IntrovertLeaning,
    Balanced,
}

/// Simple natal traits derived from sign placements only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTraits {
    /// Signs of the personal bodies (Sun through Mars) present in the chart
    pub key_signs: BTreeMap<Body, Sign>,
    pub element_balance: ElementBalance,
    pub modality_balance: BTreeMap<Modality, f64>,
    pub dominant_element: Option<Element>,
    pub dominant_modality: Option<Modality>,
    pub temperament: Temperament,
}

impl ChartTraits {
    pub fn from_points(points: &[ChartPoint]) -> Self {
        let element_balance = ElementBalance::from_points(points);

        let mut modality_balance: BTreeMap<Modality, f64> =
            Modality::ALL.iter().map(|&m| (m, 0.0)).collect();
        let mut key_signs = BTreeMap::new();
        let share = if points.is_empty() {
            0.0
        } else {
            1.0 / points.len() as f64
        };
        for p in points {
            let sign = Sign::from_longitude(p.longitude);
            *modality_balance.entry(sign.modality()).or_insert(0.0) += share;
            if matches!(
                p.body,
                Body::Sun | Body::Moon | Body::Mercury | Body::Venus | Body::Mars
            ) {
                key_signs.insert(p.body, sign);
            }
        }

        let dominant_modality = if points.is_empty() {
            None
        } else {
            Modality::ALL.iter().copied().fold(None, |best: Option<Modality>, m| match best {
                Some(b) if modality_balance[&b] >= modality_balance[&m] => Some(b),
                _ => Some(m),
            })
        };

        // fire and air lean outward, earth and water inward
        let outward = element_balance.fire + element_balance.air;
        let inward = element_balance.earth + element_balance.water;
        let temperament = if outward - inward >= 0.2 {
            Temperament::ExtrovertLeaning
        } else if inward - outward >= 0.2 {
            Temperament::IntrovertLeaning
        } else {
            Temperament::Balanced
        };

        Self {
            key_signs,
            dominant_element: element_balance.dominant(),
            element_balance,
            modality_balance,
            dominant_modality,
            temperament,
        }
    }
}
