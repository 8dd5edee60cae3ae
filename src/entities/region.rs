// 🏙️ Region Hierarchy - Super and sub regions
// Two record types linked by name: a SuperRegion owns its SubRegions, and a
// SubRegion keeps a non-owning back-reference to its owner's name. All
// insertions are append-only; duplicates signal through a bool, never an
// error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::CovidCase;
use crate::regression::ExponentialRegressionModel;
use crate::scaling::ScaleBounds;

/// Case rates are reported per 100,000 residents.
pub const CASE_RATE_BASIS: f64 = 100_000.0;

// ============================================================================
// SUB REGION
// ============================================================================

/// A subdivision of a super region (e.g. a neighbourhood) carrying its own
/// demographic and case data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubRegion {
    pub name: String,
    pub population: u64,

    /// Name of the owning super region (non-owning back-reference).
    pub super_region: String,

    pub median_household_income: u64,

    /// Cases per 100,000 residents, recomputed on every accepted insertion.
    pub case_count_per_capita: f64,

    /// Indices in [0, 10], written by the owner's scaling passes.
    /// 0 until the first pass runs.
    pub scaled_economic_index: f64,
    pub scaled_case_index: f64,

    cases: BTreeMap<u64, CovidCase>,
}

impl SubRegion {
    pub fn new(
        name: &str,
        population: u64,
        super_region: &str,
        median_household_income: u64,
    ) -> Self {
        SubRegion {
            name: name.to_string(),
            population,
            super_region: super_region.to_string(),
            median_household_income,
            case_count_per_capita: 0.0,
            scaled_economic_index: 0.0,
            scaled_case_index: 0.0,
            cases: BTreeMap::new(),
        }
    }

    /// Adds a covid case if its id is not already present. Returns whether
    /// the case was inserted; count and per-capita rate are untouched when
    /// it was not.
    pub fn add_covid_case(&mut self, case: CovidCase) -> bool {
        if self.cases.contains_key(&case.case_id) {
            return false;
        }

        self.cases.insert(case.case_id, case);
        self.case_count_per_capita = if self.population == 0 {
            // No recorded residents: the rate stays 0 instead of dividing
            // by zero.
            0.0
        } else {
            (self.cases.len() as f64 / self.population as f64) * CASE_RATE_BASIS
        };
        true
    }

    pub fn case_count(&self) -> usize {
        self.cases.len()
    }

    pub fn case(&self, case_id: u64) -> Option<&CovidCase> {
        self.cases.get(&case_id)
    }

    pub fn cases(&self) -> impl Iterator<Item = &CovidCase> {
        self.cases.values()
    }
}

// ============================================================================
// SUPER REGION
// ============================================================================

/// The top-level aggregate area (e.g. a city) containing the sub regions.
///
/// Expected (not enforced): the sub region populations sum to the super
/// region's own population. The loader-provided datasets satisfy this; the
/// expectation is checked by tests only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuperRegion {
    pub name: String,
    pub population: u64,

    /// Income bounds over the current sub regions, from the last economic
    /// scaling pass.
    pub economic_bounds: ScaleBounds,

    /// Case-rate bounds over the current sub regions, from the last case
    /// scaling pass.
    pub case_bounds: ScaleBounds,

    /// Fitted curve over the scaled indices, set by the model pipeline.
    pub regression_model: Option<ExponentialRegressionModel>,

    sub_regions: BTreeMap<String, SubRegion>,
}

impl SuperRegion {
    pub fn new(name: &str, population: u64) -> Self {
        SuperRegion {
            name: name.to_string(),
            population,
            economic_bounds: ScaleBounds::default(),
            case_bounds: ScaleBounds::default(),
            regression_model: None,
            sub_regions: BTreeMap::new(),
        }
    }

    /// Adds a sub region if its name is not already present. Returns whether
    /// it was inserted.
    pub fn add_sub_region(&mut self, sub_region: SubRegion) -> bool {
        if self.sub_regions.contains_key(&sub_region.name) {
            return false;
        }
        self.sub_regions.insert(sub_region.name.clone(), sub_region);
        true
    }

    pub fn sub_region(&self, name: &str) -> Option<&SubRegion> {
        self.sub_regions.get(name)
    }

    pub fn sub_regions(&self) -> impl Iterator<Item = &SubRegion> {
        self.sub_regions.values()
    }

    pub fn sub_region_count(&self) -> usize {
        self.sub_regions.len()
    }

    pub fn total_case_count(&self) -> usize {
        self.sub_regions.values().map(SubRegion::case_count).sum()
    }

    /// Recomputes the income bounds and rewrites every sub region's scaled
    /// economic index. Returns the multiplier. Caller-triggered after a
    /// batch of insertions; not kept in sync per mutation.
    pub fn update_economic_scaling(&mut self) -> f64 {
        let incomes: Vec<f64> = self
            .sub_regions
            .values()
            .map(|sub| sub.median_household_income as f64)
            .collect();
        self.economic_bounds = ScaleBounds::from_values(&incomes);

        let bounds = self.economic_bounds;
        for sub_region in self.sub_regions.values_mut() {
            sub_region.scaled_economic_index = bounds.index(sub_region.median_household_income as f64);
        }

        self.economic_bounds.multiplier
    }

    /// Recomputes the case-rate bounds and rewrites every sub region's
    /// scaled case index. Returns the multiplier.
    pub fn update_case_scaling(&mut self) -> f64 {
        let rates: Vec<f64> = self
            .sub_regions
            .values()
            .map(|sub| sub.case_count_per_capita)
            .collect();
        self.case_bounds = ScaleBounds::from_values(&rates);

        let bounds = self.case_bounds;
        for sub_region in self.sub_regions.values_mut() {
            sub_region.scaled_case_index = bounds.index(sub_region.case_count_per_capita);
        }

        self.case_bounds.multiplier
    }

    /// One (economic index, case index) pair per sub region, in name order.
    /// This is the regression engine's training input.
    pub fn index_coordinates(&self) -> Vec<(f64, f64)> {
        self.sub_regions
            .values()
            .map(|sub| (sub.scaled_economic_index, sub.scaled_case_index))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
