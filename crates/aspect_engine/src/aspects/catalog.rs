use serde::{Deserialize, Serialize};

use crate::aspects::types::{AspectDefinition, AspectKind};
use crate::error::ConfigError;

/// Ordered table of recognised aspects and their orbs.
///
/// Declaration order matters: on an exact deviation tie the earlier entry
/// wins. Orbs are per aspect; there is no global orb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<AspectDefinition>", into = "Vec<AspectDefinition>")]
pub struct AspectCatalog {
    definitions: Vec<AspectDefinition>,
}

impl AspectCatalog {
    /// Build a catalog, validating every orb and rejecting duplicates.
    pub fn new(definitions: Vec<AspectDefinition>) -> Result<Self, ConfigError> {
        if definitions.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for (i, def) in definitions.iter().enumerate() {
            validate_orb(def.kind, def.max_orb)?;
            validate_target(def.kind, def.target_angle)?;
            if definitions[..i].iter().any(|d| d.kind == def.kind) {
                return Err(ConfigError::DuplicateAspect { aspect: def.kind });
            }
        }
        Ok(Self { definitions })
    }

    /// Build from (aspect, orb) pairs with each aspect at its exact angle.
    pub fn from_orbs(orbs: &[(AspectKind, f64)]) -> Result<Self, ConfigError> {
        Self::new(
            orbs.iter()
                .map(|&(kind, orb)| AspectDefinition::new(kind, orb))
                .collect(),
        )
    }

    fn preset(orbs: [f64; 5]) -> Self {
        Self {
            definitions: AspectKind::ALL
                .iter()
                .zip(orbs)
                .map(|(&kind, orb)| AspectDefinition::new(kind, orb))
                .collect(),
        }
    }

    /// General-purpose orbs: wide for conjunction, opposition and trine,
    /// narrow for square and sextile.
    pub fn standard() -> Self {
        Self::preset([8.0, 4.0, 6.0, 7.0, 8.0])
    }

    /// Tight orbs for transit-to-natal timelines.
    pub fn transit() -> Self {
        Self::preset([4.0, 3.0, 4.0, 4.0, 4.0])
    }

    /// Wide orbs for natal and synastry snapshots. These overlap, so the
    /// matcher's tie-break decides between neighbouring aspects.
    pub fn natal() -> Self {
        Self::preset([10.0, 15.0, 15.0, 15.0, 15.0])
    }

    /// Replace one aspect's orb, appending the aspect if it is missing.
    pub fn with_orb(mut self, kind: AspectKind, orb: f64) -> Result<Self, ConfigError> {
        validate_orb(kind, orb)?;
        match self.definitions.iter_mut().find(|d| d.kind == kind) {
            Some(def) => def.max_orb = orb,
            None => self.definitions.push(AspectDefinition::new(kind, orb)),
        }
        Ok(self)
    }

    /// Keep only the listed aspects, preserving declaration order.
    pub fn only(&self, kinds: &[AspectKind]) -> Result<Self, ConfigError> {
        let definitions: Vec<_> = self
            .definitions
            .iter()
            .filter(|d| kinds.contains(&d.kind))
            .copied()
            .collect();
        Self::new(definitions)
    }

    /// Copy with every orb raised to at least `floor`.
    pub fn widened(&self, floor: f64) -> Self {
        Self {
            definitions: self
                .definitions
                .iter()
                .map(|d| AspectDefinition {
                    max_orb: d.max_orb.max(floor),
                    ..*d
                })
                .collect(),
        }
    }

    pub fn get(&self, kind: AspectKind) -> Option<&AspectDefinition> {
        self.definitions.iter().find(|d| d.kind == kind)
    }

    /// Position of an aspect in declaration order.
    pub fn index_of(&self, kind: AspectKind) -> Option<usize> {
        self.definitions.iter().position(|d| d.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AspectDefinition> {
        self.definitions.iter()
    }

    pub fn definitions(&self) -> &[AspectDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for AspectCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<AspectDefinition>> for AspectCatalog {
    type Error = ConfigError;

    fn try_from(definitions: Vec<AspectDefinition>) -> Result<Self, Self::Error> {
        Self::new(definitions)
    }
}

impl From<AspectCatalog> for Vec<AspectDefinition> {
    fn from(catalog: AspectCatalog) -> Self {
        catalog.definitions
    }
}

fn validate_orb(kind: AspectKind, orb: f64) -> Result<(), ConfigError> {
    if orb.is_finite() && orb > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOrb { aspect: kind, orb })
    }
}

fn validate_target(kind: AspectKind, angle: f64) -> Result<(), ConfigError> {
    if (0.0..=180.0).contains(&angle) {
        Ok(())
    } else {
        Err(ConfigError::InvalidTargetAngle { aspect: kind, angle })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_cover_all_five_in_order() {
        let c = AspectCatalog::standard();
        let kinds: Vec<_> = c.iter().map(|d| d.kind).collect();
        assert_eq!(kinds, AspectKind::ALL.to_vec());
        assert_eq!(c.get(AspectKind::Sextile).unwrap().max_orb, 4.0);
        assert_eq!(c.get(AspectKind::Trine).unwrap().target_angle, 120.0);
    }

    #[test]
    fn rejects_bad_orbs_and_duplicates() {
        assert!(matches!(
            AspectCatalog::from_orbs(&[(AspectKind::Square, 0.0)]),
            Err(ConfigError::InvalidOrb { .. })
        ));
        assert!(matches!(
            AspectCatalog::from_orbs(&[(AspectKind::Square, f64::NAN)]),
            Err(ConfigError::InvalidOrb { .. })
        ));
        assert!(matches!(
            AspectCatalog::from_orbs(&[(AspectKind::Square, 5.0), (AspectKind::Square, 3.0)]),
            Err(ConfigError::DuplicateAspect { .. })
        ));
        assert_eq!(AspectCatalog::new(vec![]), Err(ConfigError::EmptyCatalog));
    }

    #[test]
    fn rejects_target_angle_off_the_half_circle() {
        let mut def = AspectDefinition::new(AspectKind::Trine, 5.0);
        def.target_angle = 400.0;
        assert!(matches!(
            AspectCatalog::new(vec![def]),
            Err(ConfigError::InvalidTargetAngle { angle, .. }) if angle == 400.0
        ));
        def.target_angle = f64::NAN;
        assert!(AspectCatalog::new(vec![def]).is_err());
        def.target_angle = 180.0;
        assert!(AspectCatalog::new(vec![def]).is_ok());

        // deserialisation goes through the same checks
        let mut json = serde_json::to_value(AspectCatalog::transit()).unwrap();
        json[0]["target_angle"] = serde_json::json!(-10.0);
        assert!(serde_json::from_value::<AspectCatalog>(json).is_err());
    }

    #[test]
    fn with_orb_and_only() {
        let c = AspectCatalog::transit()
            .with_orb(AspectKind::Conjunction, 6.5)
            .unwrap();
        assert_eq!(c.get(AspectKind::Conjunction).unwrap().max_orb, 6.5);

        let c = c.only(&[AspectKind::Trine, AspectKind::Conjunction]).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.index_of(AspectKind::Conjunction), Some(0));
        assert!(c.only(&[AspectKind::Square]).is_err());
    }

    #[test]
    fn widened_never_narrows() {
        let c = AspectCatalog::transit().widened(3.5);
        assert_eq!(c.get(AspectKind::Sextile).unwrap().max_orb, 3.5);
        assert_eq!(c.get(AspectKind::Square).unwrap().max_orb, 4.0);
    }
}
