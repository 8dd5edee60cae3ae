// 🧮 Model Assembly - Builds the regional model end to end
// Load the hierarchy, attach cases, run both scaling passes, fit the curve.

use std::collections::BTreeMap;

use anyhow::{Context, Result};

use crate::config::ModelConfig;
use crate::entities::SuperRegion;
use crate::loader::{CsvRegionLoader, RegionDataLoader};
use crate::regression::ExponentialRegressionModel;

/// Owns every assembled super region, keyed by name.
#[derive(Debug, Default)]
pub struct PreprocessingSystem {
    regions: BTreeMap<String, SuperRegion>,
}

impl PreprocessingSystem {
    pub fn new() -> Self {
        PreprocessingSystem {
            regions: BTreeMap::new(),
        }
    }

    /// Assembles one super region from the configured sources, computes the
    /// scaled indices and fits the regression model. Returns the assembled
    /// region, which is also registered under its name.
    pub fn init_model(&mut self, config: &ModelConfig) -> Result<&SuperRegion> {
        config.validate()?;

        let loader = CsvRegionLoader::new(config.start_date, config.end_date);
        let regions_path = config.regions_path()?;
        let cases_path = config.cases_path()?;

        // 1. Region hierarchy
        let mut super_region = loader.load_super_region(regions_path)?;
        let sub_regions = loader.load_sub_regions(regions_path, &super_region)?;
        for mut sub_region in sub_regions {
            let cases = loader.load_covid_cases(cases_path, &sub_region)?;
            for case in cases {
                sub_region.add_covid_case(case);
            }
            super_region.add_sub_region(sub_region);
        }

        // 2. Scaled indices
        super_region.update_economic_scaling();
        super_region.update_case_scaling();

        // 3. Regression over (economic index, case index)
        let coordinates = super_region.index_coordinates();
        let model = ExponentialRegressionModel::fit(coordinates, config.regression.angle_divisor)
            .with_context(|| {
                format!("Failed to fit regression for region '{}'", super_region.name)
            })?;
        super_region.regression_model = Some(model);

        let name = super_region.name.clone();
        self.regions.insert(name.clone(), super_region);
        Ok(&self.regions[name.as_str()])
    }

    pub fn region(&self, name: &str) -> Option<&SuperRegion> {
        self.regions.get(name)
    }

    pub fn regions(&self) -> impl Iterator<Item = &SuperRegion> {
        self.regions.values()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CASES_SOURCE, REGIONS_SOURCE};
    use chrono::NaiveDate;
    use std::fs;
    use std::path::PathBuf;

    const REGIONS_CSV: &str = "\
Region,Population,Median Household Income(pre-tax)
Toronto,\"36,000\",\"65,829\"
Danforth,\"9,000\",\"49,400\"
Leaside,\"17,000\",\"122,010\"
Weston,\"10,000\",\"35,200\"
";

    const CASES_CSV: &str = "\
_id,Assigned_ID,Outbreak Associated,Age Group,Neighbourhood Name,FSA,Source of Infection,Classification,Episode Date,Reported Date
1,1,Sporadic,20-29,Danforth,M4J,Community,CONFIRMED,2020-12-01,2020-12-05
2,2,Sporadic,30-39,Danforth,M4J,Community,CONFIRMED,2021-01-08,2021-01-12
3,3,Sporadic,40-49,Leaside,M4G,Community,CONFIRMED,2021-01-15,2021-01-20
4,4,Sporadic,50-59,Weston,M9N,Community,CONFIRMED,2021-01-16,2021-01-21
5,5,Sporadic,60-69,Weston,M9N,Community,CONFIRMED,2021-01-17,2021-01-22
6,6,Sporadic,70-79,Weston,M9N,Community,CONFIRMED,2021-01-18,2021-01-23
7,7,Sporadic,70-79,Weston,M9N,Community,CONFIRMED,2019-06-01,2019-06-05
";

    fn fixture_config(tag: &str, regions: &str, cases: &str) -> (ModelConfig, PathBuf, PathBuf) {
        let dir = std::env::temp_dir();
        let regions_path = dir.join(format!(
            "covid_disparity_model_{}_{}_regions.csv",
            std::process::id(),
            tag
        ));
        let cases_path = dir.join(format!(
            "covid_disparity_model_{}_{}_cases.csv",
            std::process::id(),
            tag
        ));
        fs::write(&regions_path, regions).unwrap();
        fs::write(&cases_path, cases).unwrap();

        let mut config = ModelConfig::toronto();
        config.regression.angle_divisor = 200;
        config
            .source_paths
            .insert(REGIONS_SOURCE.to_string(), regions_path.clone());
        config
            .source_paths
            .insert(CASES_SOURCE.to_string(), cases_path.clone());

        (config, regions_path, cases_path)
    }

    #[test]
    fn test_init_model_end_to_end() {
        let (config, regions_path, cases_path) =
            fixture_config("e2e", REGIONS_CSV, CASES_CSV);

        let mut system = PreprocessingSystem::new();
        let region = system.init_model(&config).unwrap();

        assert_eq!(region.name, "Toronto");
        assert_eq!(region.sub_region_count(), 3);
        // Case 7 predates the window and is filtered out.
        assert_eq!(region.total_case_count(), 6);
        assert_eq!(region.sub_region("Danforth").unwrap().case_count(), 2);
        assert_eq!(region.sub_region("Weston").unwrap().case_count(), 3);

        // Indices land in [0, 10]; Weston has the lowest income and the
        // highest case rate.
        for sub in region.sub_regions() {
            assert!(sub.scaled_economic_index >= 0.0 && sub.scaled_economic_index <= 10.0);
            assert!(sub.scaled_case_index >= 0.0 && sub.scaled_case_index <= 10.0);
        }
        let weston = region.sub_region("Weston").unwrap();
        assert_eq!(weston.scaled_economic_index, 0.0);
        assert!((weston.scaled_case_index - 10.0).abs() < 1e-12);

        let model = region.regression_model.as_ref().unwrap();
        assert_eq!(model.coordinates().len(), 3);
        assert_eq!(model.angle_divisor(), 200);

        fs::remove_file(&regions_path).ok();
        fs::remove_file(&cases_path).ok();
    }

    #[test]
    fn test_assembled_region_is_registered() {
        let (config, regions_path, cases_path) =
            fixture_config("registered", REGIONS_CSV, CASES_CSV);

        let mut system = PreprocessingSystem::new();
        system.init_model(&config).unwrap();

        assert!(system.region("Toronto").is_some());
        assert!(system.region("Montreal").is_none());
        assert_eq!(system.regions().count(), 1);

        fs::remove_file(&regions_path).ok();
        fs::remove_file(&cases_path).ok();
    }

    #[test]
    fn test_regression_failure_propagates() {
        // A regions file with no sub regions leaves the regression engine
        // with an empty point set; the pipeline must surface that error.
        let (config, regions_path, cases_path) = fixture_config(
            "no_subs",
            "Region,Population,Income\nToronto,\"36,000\",\"65,829\"\n",
            CASES_CSV,
        );

        let mut system = PreprocessingSystem::new();
        assert!(system.init_model(&config).is_err());

        fs::remove_file(&regions_path).ok();
        fs::remove_file(&cases_path).ok();
    }

    #[test]
    fn test_missing_source_path_propagates() {
        let mut config = ModelConfig::toronto();
        config.source_paths.remove(CASES_SOURCE);
        // Window stays valid; only the path lookup fails.
        config.start_date = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();

        let mut system = PreprocessingSystem::new();
        assert!(system.init_model(&config).is_err());
    }
}
