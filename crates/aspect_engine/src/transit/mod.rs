//! Transit windows: when a moving body holds an aspect to a reference.

pub mod horizon;
pub mod period;
mod refine;
pub mod window;

pub use horizon::Horizon;
pub use period::{AspectPeriod, PeriodTarget, Reference, Refinement, ScanRequest};
pub use window::{find_aspect_periods, find_aspect_periods_concurrent, MAX_SAMPLES};
