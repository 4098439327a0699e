//! Compatibility scoring over cross-chart aspects.

pub mod categories;
pub mod scorer;

pub use categories::{base_score, Category};
pub use scorer::{CategoryScore, SynastryReport, SynastryScorer, SynastryScores};
