use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::aspects::{AspectCatalog, AspectKind};
use crate::ephemeris::{Body, ChartPoint, FrameConfig};
use crate::error::ConfigError;
use crate::transit::horizon::Horizon;

/// What a transiting body is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reference {
    /// A longitude that does not move, such as a natal placement. It must
    /// already be in the scan's frame.
    Fixed { label: String, longitude: f64 },
    /// Another body, evaluated at the same instants as the transiting body.
    Moving { body: Body },
}

impl Reference {
    pub fn fixed(label: impl Into<String>, longitude: f64) -> Self {
        Reference::Fixed {
            label: label.into(),
            longitude,
        }
    }

    pub fn moving(body: Body) -> Self {
        Reference::Moving { body }
    }

    /// A natal placement, labelled "natal <Body>".
    pub fn natal(point: &ChartPoint) -> Self {
        Reference::fixed(format!("natal {}", point.body), point.longitude)
    }

    pub fn label(&self) -> String {
        match self {
            Reference::Fixed { label, .. } => label.clone(),
            Reference::Moving { body } => body.to_string(),
        }
    }
}

/// A reference plus the aspects to look for against it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodTarget {
    pub reference: Reference,
    pub catalog: AspectCatalog,
}

impl PeriodTarget {
    pub fn new(reference: Reference, catalog: AspectCatalog) -> Self {
        Self { reference, catalog }
    }

    /// One fixed target per natal placement, all sharing a catalog.
    pub fn natal_chart(points: &[ChartPoint], catalog: &AspectCatalog) -> Vec<PeriodTarget> {
        points
            .iter()
            .map(|p| PeriodTarget::new(Reference::natal(p), catalog.clone()))
            .collect()
    }
}

/// Settings for locating the exact instant between samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    /// Stop once the bracket is narrower than this
    pub tolerance: Duration,
    pub max_iterations: u32,
}

impl Default for Refinement {
    fn default() -> Self {
        Self {
            tolerance: Duration::minutes(1),
            max_iterations: 60,
        }
    }
}

/// Everything a window scan needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub bodies: Vec<Body>,
    pub targets: Vec<PeriodTarget>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Sampling step. Short-lived windows narrower than this can be missed.
    pub step: Duration,
    /// Transiting bodies to skip entirely
    pub exclude: Vec<Body>,
    pub frame: FrameConfig,
    /// Per transiting body orb floor: effective orb = max(aspect orb, floor)
    pub body_orbs: BTreeMap<Body, f64>,
    pub refinement: Refinement,
}

impl ScanRequest {
    pub fn new(
        bodies: Vec<Body>,
        targets: Vec<PeriodTarget>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Self {
        Self {
            bodies,
            targets,
            start,
            end,
            step,
            exclude: Vec::new(),
            frame: FrameConfig::Tropical,
            body_orbs: BTreeMap::new(),
            refinement: Refinement::default(),
        }
    }

    /// Request spanning a horizon from `start`, with that horizon's
    /// recommended step and exclusions.
    pub fn for_horizon(
        horizon: Horizon,
        bodies: Vec<Body>,
        targets: Vec<PeriodTarget>,
        start: DateTime<Utc>,
    ) -> Self {
        Self::new(bodies, targets, start, start + horizon.span(), horizon.step())
            .excluding(horizon.exclusions())
    }

    pub fn excluding(mut self, bodies: &[Body]) -> Self {
        for b in bodies {
            if !self.exclude.contains(b) {
                self.exclude.push(*b);
            }
        }
        self
    }

    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_body_orb(mut self, body: Body, orb: f64) -> Self {
        self.body_orbs.insert(body, orb);
        self
    }

    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = refinement;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.end < self.start {
            return Err(ConfigError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.step <= Duration::zero() {
            return Err(ConfigError::NonPositiveStep {
                seconds: self.step.num_seconds(),
            });
        }
        if self.bodies.is_empty() {
            return Err(ConfigError::EmptyBodies);
        }
        if self.targets.is_empty() {
            return Err(ConfigError::EmptyReferences);
        }
        for target in &self.targets {
            if let Reference::Fixed { label, longitude } = &target.reference {
                if !longitude.is_finite() {
                    return Err(ConfigError::NonFiniteReference {
                        label: label.clone(),
                        value: *longitude,
                    });
                }
            }
        }
        for (&body, &orb) in &self.body_orbs {
            if !(orb.is_finite() && orb > 0.0) {
                return Err(ConfigError::InvalidBodyOrb { body, orb });
            }
        }
        Ok(())
    }
}

/// A contiguous in-orb window for one (transiting body, aspect, reference).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectPeriod {
    pub transiting_body: Body,
    pub aspect: AspectKind,
    /// Label of the reference ("natal Sun", or the moving body's name)
    pub reference: String,
    /// First sampled instant in orb
    pub window_start: DateTime<Utc>,
    /// Refined instant of closest approach to exact
    pub exact_instant: DateTime<Utc>,
    /// Last sampled instant in orb
    pub window_end: DateTime<Utc>,
    pub peak_strength: f64,
    /// Degrees from exact at `exact_instant`
    pub min_deviation: f64,
    /// Effective orb the window was measured with
    pub max_orb: f64,
}

impl AspectPeriod {
    /// "Jup-Tri-natal Sun" style key
    pub fn key(&self) -> String {
        format!(
            "{}-{}-{}",
            self.transiting_body.short_code(),
            self.aspect.code(),
            self.reference
        )
    }

    pub fn duration(&self) -> Duration {
        self.window_end - self.window_start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.window_start <= instant && instant <= self.window_end
    }
}

/// Output order: window start, transiting body, aspect name, reference.
pub(crate) fn compare_periods(a: &AspectPeriod, b: &AspectPeriod) -> Ordering {
    a.window_start
        .cmp(&b.window_start)
        .then_with(|| a.transiting_body.cmp(&b.transiting_body))
        .then_with(|| a.aspect.name().cmp(b.aspect.name()))
        .then_with(|| a.reference.cmp(&b.reference))
        .then_with(|| a.exact_instant.cmp(&b.exact_instant))
}
