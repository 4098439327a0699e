use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::aspects::AspectKind;
use crate::ephemeris::Body;

/// Caller-side mistakes. Surfaced immediately, never retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid range: end {end} is before start {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[error("Sampling step must be positive, got {seconds}s")]
    NonPositiveStep { seconds: i64 },
    #[error("No transiting bodies to scan")]
    EmptyBodies,
    #[error("No reference targets to scan against")]
    EmptyReferences,
    #[error("Unknown body: {name}")]
    UnknownBody { name: String },
    #[error("Unknown horizon: {name}. Use 1D, 1W, 1M, 6M or 1Y")]
    UnknownHorizon { name: String },
    #[error("Unknown aspect: {name}")]
    UnknownAspect { name: String },
    #[error("Unknown ayanamsha: {name}. Valid ayanamshas: {valid:?}")]
    UnknownAyanamsha { name: String, valid: Vec<String> },
    #[error("Invalid orb {orb} for {aspect:?}: orbs must be finite and positive")]
    InvalidOrb { aspect: AspectKind, orb: f64 },
    #[error("Invalid target angle {angle} for {aspect:?}: must lie in [0, 180]")]
    InvalidTargetAngle { aspect: AspectKind, angle: f64 },
    #[error("Invalid orb {orb} for transiting {body}: orbs must be finite and positive")]
    InvalidBodyOrb { body: Body, orb: f64 },
    #[error("Aspect catalog is empty")]
    EmptyCatalog,
    #[error("Aspect {aspect:?} declared more than once")]
    DuplicateAspect { aspect: AspectKind },
    #[error("Body {body} appears more than once in the same chart")]
    DuplicateBody { body: Body },
    #[error("Longitude for {body} is not finite: {value}")]
    NonFiniteLongitude { body: Body, value: f64 },
    #[error("Reference {label} has a non-finite longitude: {value}")]
    NonFiniteReference { label: String, value: f64 },
    #[error("Scan would take {count} samples per body (limit {limit}); use a coarser step")]
    TooManySamples { count: u64, limit: u64 },
}

/// The position provider could not resolve a body at an instant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Ephemeris data not found at path: {path}. {message}")]
    EphemerisUnavailable { path: String, message: String },
    #[error("Body {body} is not supported by this provider")]
    UnsupportedBody { body: Body },
    #[error("Instant {instant} is outside the provider's supported range")]
    OutOfRange { instant: DateTime<Utc> },
    #[error("Failed to calculate position for {body} at {instant}: {message}")]
    CalculationFailed {
        body: Body,
        instant: DateTime<Utc>,
        message: String,
    },
}

/// Failure of a whole detection call. Partial results are never returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AspectError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Position provider failure: {0}")]
    Provider(#[from] ProviderError),
    #[error("Scan task failed: {message}")]
    Task { message: String },
}

pub type Result<T, E = AspectError> = std::result::Result<T, E>;
