pub mod calculator;
pub mod catalog;
pub mod matcher;
pub mod types;

pub use calculator::{find_instant_aspects, InstantAspectFinder};
pub use catalog::AspectCatalog;
pub use types::{
    strength, AspectDefinition, AspectKind, AspectMatch, AspectNature, InstantAspect,
};
