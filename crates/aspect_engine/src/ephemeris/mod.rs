pub mod analytic;
pub mod provider;
pub mod types;

#[cfg(feature = "swisseph")]
pub mod adapter;

#[cfg(feature = "swisseph")]
pub use adapter::SwissEphemerisAdapter;
pub use analytic::MeanOrbitProvider;
pub use provider::{chart_positions, FnProvider, PositionCache, PositionProvider};
pub use types::{
    days_since_j2000, julian_day, Ayanamsha, Body, BodyPosition, ChartPoint, FrameConfig,
};
