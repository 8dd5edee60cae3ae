// ⚙️ Model Configuration - Explicit config value for the pipeline
// Date window, source paths and regression granularity travel as one value
// handed to the loader and the model entry point.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Logical names of the recognized data sources.
pub const REGIONS_SOURCE: &str = "regions";
pub const CASES_SOURCE: &str = "cases";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Angle-grid granularity handed to the regression engine.
    pub angle_divisor: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Inclusive start of the case reporting window.
    pub start_date: NaiveDate,

    /// Inclusive end of the case reporting window.
    pub end_date: NaiveDate,

    /// Logical source name ("regions", "cases") to file path.
    pub source_paths: HashMap<String, PathBuf>,

    pub regression: RegressionConfig,
}

impl ModelConfig {
    /// Reference configuration for the Toronto datasets.
    pub fn toronto() -> Self {
        let mut source_paths = HashMap::new();
        source_paths.insert(
            REGIONS_SOURCE.to_string(),
            PathBuf::from("data/toronto_regions.csv"),
        );
        source_paths.insert(
            CASES_SOURCE.to_string(),
            PathBuf::from("data/toronto_covid_cases.csv"),
        );

        ModelConfig {
            start_date: NaiveDate::from_ymd_opt(2020, 12, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
            source_paths,
            regression: RegressionConfig {
                angle_divisor: 1000,
            },
        }
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ModelConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.start_date > self.end_date {
            bail!(
                "start_date {} is after end_date {}",
                self.start_date,
                self.end_date
            );
        }
        if self.regression.angle_divisor == 0 {
            bail!("angle_divisor must be at least 1");
        }
        Ok(())
    }

    /// Path of a configured source; a missing logical name is an error.
    pub fn source_path(&self, name: &str) -> Result<&Path> {
        self.source_paths
            .get(name)
            .map(PathBuf::as_path)
            .with_context(|| format!("No source path configured for '{}'", name))
    }

    pub fn regions_path(&self) -> Result<&Path> {
        self.source_path(REGIONS_SOURCE)
    }

    pub fn cases_path(&self) -> Result<&Path> {
        self.source_path(CASES_SOURCE)
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::toronto()
    }
}

// ============================================================================
// TESTS
// ============================================================================
