// 📂 Data Loading - CSV loaders for regions and covid cases
// The loading contract has three operations (super region, sub regions,
// covid cases) and is implemented once per data source family.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::entities::{CovidCase, SubRegion, SuperRegion};

// Column layout of the cases CSV.
const CASE_ID_COLUMN: usize = 0;
const CASE_SUB_REGION_COLUMN: usize = 4;
const CASE_DATE_COLUMN: usize = 9;

// ============================================================================
// LOADING CONTRACT
// ============================================================================

/// Contract between the region model and a concrete data source.
pub trait RegionDataLoader {
    /// Loads the super region record.
    fn load_super_region(&self, path: &Path) -> Result<SuperRegion>;

    /// Loads every sub region belonging to the given super region.
    fn load_sub_regions(&self, path: &Path, super_region: &SuperRegion)
        -> Result<Vec<SubRegion>>;

    /// Loads the accepted covid cases for one sub region.
    fn load_covid_cases(&self, path: &Path, sub_region: &SubRegion) -> Result<Vec<CovidCase>>;
}

// ============================================================================
// CSV LOADER
// ============================================================================

/// Loader for the CSV layout of the Toronto datasets.
///
/// The regions file carries a header row, then the super region
/// (name, population), then one sub region per row
/// (name, population, median household income). The cases file carries a
/// header row and one reported case per row; a row is accepted for a sub
/// region when the name matches exactly and the reported date falls inside
/// the configured window, both ends inclusive.
pub struct CsvRegionLoader {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl CsvRegionLoader {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        CsvRegionLoader {
            start_date,
            end_date,
        }
    }

    fn in_window(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

impl RegionDataLoader for CsvRegionLoader {
    fn load_super_region(&self, path: &Path) -> Result<SuperRegion> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open regions file: {}", path.display()))?;

        let record = reader
            .records()
            .next()
            .with_context(|| format!("Regions file has no data rows: {}", path.display()))?
            .with_context(|| format!("Failed to read regions file: {}", path.display()))?;

        let name = field(&record, 0, path)?;
        let population = parse_grouped_count(field(&record, 1, path)?)
            .with_context(|| format!("Bad population for region '{}'", name))?;

        Ok(SuperRegion::new(name, population))
    }

    fn load_sub_regions(
        &self,
        path: &Path,
        super_region: &SuperRegion,
    ) -> Result<Vec<SubRegion>> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open regions file: {}", path.display()))?;

        let mut sub_regions = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record
                .with_context(|| format!("Failed to read regions file: {}", path.display()))?;

            // The first data row is the super region itself.
            if row == 0 {
                continue;
            }

            let name = field(&record, 0, path)?;
            let population = parse_grouped_count(field(&record, 1, path)?)
                .with_context(|| format!("Bad population for sub region '{}'", name))?;
            let income = parse_grouped_count(field(&record, 2, path)?)
                .with_context(|| format!("Bad median income for sub region '{}'", name))?;

            sub_regions.push(SubRegion::new(name, population, &super_region.name, income));
        }

        Ok(sub_regions)
    }

    fn load_covid_cases(&self, path: &Path, sub_region: &SubRegion) -> Result<Vec<CovidCase>> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("Failed to open cases file: {}", path.display()))?;

        let mut cases = Vec::new();
        for record in reader.records() {
            let record = record
                .with_context(|| format!("Failed to read cases file: {}", path.display()))?;

            let date = parse_iso_date(field(&record, CASE_DATE_COLUMN, path)?)?;
            if !self.in_window(date) || field(&record, CASE_SUB_REGION_COLUMN, path)? != sub_region.name {
                continue;
            }

            let case_id: u64 = field(&record, CASE_ID_COLUMN, path)?
                .trim()
                .parse()
                .with_context(|| format!("Bad case id in {}", path.display()))?;

            cases.push(CovidCase::new(
                case_id,
                date,
                &sub_region.super_region,
                &sub_region.name,
            ));
        }

        Ok(cases)
    }
}

// ============================================================================
// FIELD PARSING
// ============================================================================

fn field<'r>(record: &'r csv::StringRecord, index: usize, path: &Path) -> Result<&'r str> {
    record.get(index).with_context(|| {
        format!(
            "Row in {} is missing column {}",
            path.display(),
            index
        )
    })
}

/// Parses an integer that may carry digit group separators ("2,731,571")
/// and stray spaces.
pub fn parse_grouped_count(raw: &str) -> Result<u64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != ' ').collect();
    cleaned
        .parse()
        .with_context(|| format!("Not a number: '{}'", raw))
}

/// Parses a YYYY-MM-DD date.
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Not a YYYY-MM-DD date: '{}'", raw))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn fixture(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "covid_disparity_loader_{}_{}",
            std::process::id(),
            name
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    fn loader() -> CsvRegionLoader {
        CsvRegionLoader::new(
            NaiveDate::from_ymd_opt(2020, 12, 1).unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
        )
    }

    const REGIONS_CSV: &str = "\
Region,Population,Median Household Income(pre-tax)
Toronto,\"2,731,571\",\"65,829\"
Danforth,\"9,666\",\"49,400\"
Leaside,\"16,828\",\"122,010\"
";

    // Case rows mirror the Toronto layout: id first, neighbourhood in
    // column 4, reported date in column 9.
    const CASES_CSV: &str = "\
_id,Assigned_ID,Outbreak Associated,Age Group,Neighbourhood Name,FSA,Source of Infection,Classification,Episode Date,Reported Date
1,1,Sporadic,20-29,Danforth,M4J,Community,CONFIRMED,2020-11-30,2020-12-01
2,2,Sporadic,30-39,Danforth,M4J,Community,CONFIRMED,2021-01-10,2021-01-12
3,3,Sporadic,40-49,Leaside,M4G,Community,CONFIRMED,2021-01-15,2021-01-20
4,4,Sporadic,50-59,Danforth,M4J,Community,CONFIRMED,2021-02-28,2021-03-01
5,5,Sporadic,60-69,Danforth,M4J,Community,CONFIRMED,2021-03-01,2021-03-02
6,6,Sporadic,70-79,Danforth,M4J,Community,CONFIRMED,2020-11-20,2020-11-30
";

    #[test]
    fn test_load_super_region() {
        let path = fixture("super.csv", REGIONS_CSV);
        let city = loader().load_super_region(&path).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(city.name, "Toronto");
        assert_eq!(city.population, 2_731_571);
    }

    #[test]
    fn test_load_sub_regions_skips_the_super_region_row() {
        let path = fixture("subs.csv", REGIONS_CSV);
        let city = loader().load_super_region(&path).unwrap();
        let sub_regions = loader().load_sub_regions(&path, &city).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(sub_regions.len(), 2);
        assert_eq!(sub_regions[0].name, "Danforth");
        assert_eq!(sub_regions[0].population, 9_666);
        assert_eq!(sub_regions[0].median_household_income, 49_400);
        assert_eq!(sub_regions[0].super_region, "Toronto");
        assert_eq!(sub_regions[1].name, "Leaside");
        assert_eq!(sub_regions[1].median_household_income, 122_010);
    }

    #[test]
    fn test_load_covid_cases_filters_by_name_and_window() {
        let regions = fixture("filter_regions.csv", REGIONS_CSV);
        let cases_path = fixture("filter_cases.csv", CASES_CSV);

        let city = loader().load_super_region(&regions).unwrap();
        let sub_regions = loader().load_sub_regions(&regions, &city).unwrap();
        let danforth = &sub_regions[0];

        let cases = loader().load_covid_cases(&cases_path, danforth).unwrap();
        fs::remove_file(&regions).ok();
        fs::remove_file(&cases_path).ok();

        // Rows 1 and 4 sit exactly on the window ends and are accepted;
        // row 5 is one day past the end, row 6 before the start, row 3
        // belongs to Leaside.
        let ids: Vec<u64> = cases.iter().map(|case| case.case_id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(cases.iter().all(|case| case.sub_region == "Danforth"));
        assert!(cases.iter().all(|case| case.super_region == "Toronto"));
    }

    #[test]
    fn test_malformed_population_is_an_error() {
        let path = fixture(
            "bad_pop.csv",
            "Region,Population\nToronto,not-a-number\n",
        );
        let result = loader().load_super_region(&path);
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_missing_data_rows_is_an_error() {
        let path = fixture("empty.csv", "Region,Population\n");
        let result = loader().load_super_region(&path);
        fs::remove_file(&path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        let regions = fixture("date_regions.csv", REGIONS_CSV);
        let cases_path = fixture(
            "bad_date.csv",
            "_id,a,b,c,Neighbourhood Name,e,f,g,h,Reported Date\n7,a,b,c,Danforth,e,f,g,h,01/12/2020\n",
        );

        let city = loader().load_super_region(&regions).unwrap();
        let sub_regions = loader().load_sub_regions(&regions, &city).unwrap();
        let result = loader().load_covid_cases(&cases_path, &sub_regions[0]);

        fs::remove_file(&regions).ok();
        fs::remove_file(&cases_path).ok();

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_grouped_count() {
        assert_eq!(parse_grouped_count("56,987").unwrap(), 56_987);
        assert_eq!(parse_grouped_count("2,731,571").unwrap(), 2_731_571);
        assert_eq!(parse_grouped_count(" 1 200 ").unwrap(), 1_200);
        assert_eq!(parse_grouped_count("42").unwrap(), 42);
        assert!(parse_grouped_count("12.5").is_err());
        assert!(parse_grouped_count("").is_err());
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2020-03-02").unwrap(),
            NaiveDate::from_ymd_opt(2020, 3, 2).unwrap()
        );
        assert!(parse_iso_date("02-03-2020").is_err());
        assert!(parse_iso_date("2020-13-02").is_err());
    }
}
