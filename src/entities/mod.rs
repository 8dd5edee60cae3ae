// Region and case entities
// A single super region owns its sub regions; cases attach to sub regions.

pub mod case;
pub mod region;

pub use case::CovidCase;
pub use region::{SubRegion, SuperRegion, CASE_RATE_BASIS};
