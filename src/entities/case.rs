// 🦠 Covid Case - Immutable case record
// One reported case, attributed to its regions by name at construction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single reported covid case.
///
/// Back-references to the owning regions are non-owning names, set once and
/// never mutated. The case id is unique within its sub region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovidCase {
    pub case_id: u64,
    pub date: NaiveDate,
    /// Name of the super region this case was recorded in.
    pub super_region: String,
    /// Name of the sub region this case was recorded in.
    pub sub_region: String,
}

impl CovidCase {
    pub fn new(case_id: u64, date: NaiveDate, super_region: &str, sub_region: &str) -> Self {
        CovidCase {
            case_id,
            date,
            super_region: super_region.to_string(),
            sub_region: sub_region.to_string(),
        }
    }
}
