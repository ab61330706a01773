//! Shared demo-world fixtures for the integration tests.
//!
//! The world is one country with two regions, three districts, and five
//! clinics, four of which are active case-report sites. The ten case
//! records cover two epi weeks of June 2016.

// Not every test binary uses every helper.
#![allow(dead_code)]

use chrono::{NaiveDate, Weekday};
use epi_indicators::utils::dates::parse_date;
use epi_indicators::{
    CaseRecord, Location, LocationCatalog, LocationLevel, PeriodOptions, Variable, VariableCatalog,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn variables() -> VariableCatalog {
    VariableCatalog::new(vec![
        Variable::new("gen_1", "Male", &["gender"]),
        Variable::new("gen_2", "Female", &["gender"]),
        Variable::new("age_1", "<5", &["age"]),
        Variable::new("age_2", "5-14", &["age"]),
        Variable::new("age_3", "15-24", &["age"]),
        Variable::new("age_4", "25-44", &["age"]),
        Variable::new("age_5", "45-59", &["age"]),
        Variable::new("age_6", ">60", &["age"]),
        Variable::new("tot_1", "Case Report", &["key_indicators"]),
    ])
}

pub fn locations() -> LocationCatalog {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    LocationCatalog::new(vec![
        Location::new("1", "Demo Country", LocationLevel::Country),
        Location::new("2", "Region 1", LocationLevel::Region)
            .with_parent("1")
            .with_population(6500),
        Location::new("3", "Region 2", LocationLevel::Region)
            .with_parent("1")
            .with_population(2000),
        Location::new("4", "District 1", LocationLevel::District)
            .with_parent("2")
            .with_population(2500),
        // District 2 has no recorded population
        Location::new("5", "District 2", LocationLevel::District).with_parent("2"),
        Location::new("6", "District 3", LocationLevel::District)
            .with_parent("3")
            .with_population(2000),
        Location::new("7", "Clinic 1", LocationLevel::Clinic)
            .with_parent("4")
            .with_population(1500)
            .with_case_report(true)
            .with_start_date(start),
        Location::new("8", "Clinic 2", LocationLevel::Clinic)
            .with_parent("4")
            .with_population(1000)
            .with_case_report(true)
            .with_start_date(start),
        // Clinic 3 never files case reports
        Location::new("9", "Clinic 3", LocationLevel::Clinic).with_parent("5"),
        Location::new("10", "Clinic 4", LocationLevel::Clinic)
            .with_parent("6")
            .with_population(2000)
            .with_case_report(true)
            .with_start_date(start),
        Location::new("11", "Clinic 5", LocationLevel::Clinic)
            .with_parent("6")
            .with_population(2000)
            .with_case_report(true)
            .with_start_date(start),
    ])
}

fn case(date: &str, region: &str, district: &str, clinic: &str, flags: &[&str]) -> CaseRecord {
    let mut record = CaseRecord::new(parse_date(date).unwrap())
        .at(LocationLevel::Country, "1")
        .at(LocationLevel::Region, region)
        .at(LocationLevel::District, district)
        .at(LocationLevel::Clinic, clinic)
        .with_value("tot_1", 1.0);
    for flag in flags {
        record = record.with_value(flag, 1.0);
    }
    record
}

/// Ten case reports: 4 male, 6 female, spread over the weeks of
/// 2016-06-20 and 2016-06-27
pub fn case_records() -> Vec<CaseRecord> {
    vec![
        case("2016-06-20", "2", "4", "7", &["gen_1", "age_1"]),
        case("2016-06-21", "2", "4", "8", &["gen_1", "age_2"]),
        case("2016-06-21", "3", "6", "11", &["gen_1", "age_3"]),
        case("2016-06-22", "3", "6", "11", &["gen_1", "age_4"]),
        case("2016-06-20", "3", "6", "10", &["gen_2", "age_6"]),
        case("2016-06-21", "3", "6", "10", &["gen_2", "age_6"]),
        case("2016-06-22", "2", "4", "7", &["gen_2", "age_6"]),
        case("2016-06-23", "2", "4", "7", &["gen_2", "age_5"]),
        case("2016-06-24", "2", "4", "8", &["gen_2", "age_2"]),
        case("2016-06-27", "2", "4", "8", &["gen_2", "age_3"]),
    ]
}

/// Four Monday-anchored weeks covering June 2016
pub fn june_period() -> PeriodOptions {
    PeriodOptions::range("2016-06-06", "2016-07-04").with_week_start(Weekday::Mon)
}
