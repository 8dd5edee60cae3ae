// Covid Disparity Model - Core Library
// Exposes all modules for use in the CLI and tests

pub mod config;
pub mod entities;
pub mod loader;
pub mod model;
pub mod regression;
pub mod scaling;

// Re-export commonly used types
pub use config::{ModelConfig, RegressionConfig, CASES_SOURCE, REGIONS_SOURCE};
pub use entities::{CovidCase, SubRegion, SuperRegion, CASE_RATE_BASIS};
pub use loader::{parse_grouped_count, parse_iso_date, CsvRegionLoader, RegionDataLoader};
pub use model::PreprocessingSystem;
pub use regression::{ExponentialRegressionModel, RegressionModel};
pub use scaling::{ScaleBounds, INDEX_RANGE};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
