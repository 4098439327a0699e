//! Aspect detection between ecliptic longitudes: single-instant natal and
//! synastry aspects, transit windows over a time range, and compatibility
//! scoring.
//!
//! Positions come from a [`PositionProvider`]; the frame (tropical or
//! sidereal) is passed explicitly with every call.

pub mod angle;
pub mod aspects;
pub mod ephemeris;
pub mod error;
pub mod synastry;
pub mod transit;
pub mod zodiac;

pub use aspects::{
    find_instant_aspects, AspectCatalog, AspectDefinition, AspectKind, AspectMatch,
    InstantAspect, InstantAspectFinder,
};
pub use ephemeris::{
    chart_positions, Ayanamsha, Body, BodyPosition, ChartPoint, FrameConfig, MeanOrbitProvider,
    PositionCache, PositionProvider,
};
pub use error::{AspectError, ConfigError, ProviderError, Result};
pub use synastry::{Category, SynastryReport, SynastryScorer};
pub use transit::{
    find_aspect_periods, find_aspect_periods_concurrent, AspectPeriod, Horizon, PeriodTarget,
    Reference, ScanRequest,
};
