//! Facility reporting-completeness and hierarchy rollup
//!
//! Completeness counts submitted reports per clinic per epi-week as a
//! proxy for reporting-system health. The table is built on a dense
//! index: every active case-report clinic gets one slot per grid period
//! from its reporting start date, zero-filled, so silent weeks are
//! visible as zeros. Facility series can then be rolled up to district,
//! region, or country level as a per-period mean with an optional value
//! cap.

use std::collections::BTreeMap;

use chrono::{NaiveDateTime, NaiveTime};
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::catalog::LocationCatalog;
use crate::error::{AnalysisError, Result};
use crate::models::{CaseRecord, LocationLevel, Timeline};
use crate::period::{PeriodGrid, PeriodOptions, resolve_period};

/// Per-location weekly series, keyed by clinic id at facility level and
/// by display name after rollup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompletenessTable {
    rows: BTreeMap<String, Timeline>,
    #[serde(skip)]
    grid: PeriodGrid,
}

impl CompletenessTable {
    /// The series for one location key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Timeline> {
        self.rows.get(key)
    }

    /// All location keys, ascending
    #[must_use]
    pub fn keys(&self) -> Vec<&str> {
        self.rows.keys().map(String::as_str).collect()
    }

    /// Iterate over `(key, series)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Timeline)> {
        self.rows.iter().map(|(key, series)| (key.as_str(), series))
    }

    /// Number of location rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The period grid the table was built on
    #[must_use]
    pub fn grid(&self) -> &PeriodGrid {
        &self.grid
    }
}

/// Weekly report counts per active case-report clinic.
///
/// With `drop_duplicates` set, at most one submission per clinic per
/// calendar day per field value is counted; later duplicates are
/// dropped. Records dated before a clinic's reporting start date have no
/// slot on that clinic's series and are dropped from it.
///
/// # Arguments
/// * `records` - The record table
/// * `field` - Field summed per clinic per period
/// * `locations` - Location catalog naming the active clinics
/// * `period` - Date-range options
/// * `drop_duplicates` - Enforce one submission per clinic per day
///
/// # Returns
/// One row per active case-report clinic keyed by id, or
/// `MissingStartDateError` when an active clinic has no start date
pub fn number_per_week_clinic(
    records: &[CaseRecord],
    field: &str,
    locations: &LocationCatalog,
    period: &PeriodOptions,
    drop_duplicates: bool,
) -> Result<CompletenessTable> {
    let grid = resolve_period(period)?;

    // Dense index slots per active clinic, from its start date
    let mut rows: BTreeMap<String, Timeline> = BTreeMap::new();
    for clinic in locations.get_level(LocationLevel::Clinic, true) {
        let start_date = locations
            .start_date(clinic)
            .ok_or_else(|| AnalysisError::MissingStartDateError(clinic.to_string()))?;
        let threshold = start_date.and_time(NaiveTime::MIN).max(grid.start());
        let slots = grid.periods_from(threshold);
        rows.insert(clinic.to_string(), Timeline::zero_filled(slots));
    }

    let in_range: Vec<&CaseRecord> = records.iter().filter(|r| grid.contains(r.date)).collect();
    let kept = if drop_duplicates {
        deduplicate(&in_range, field)
    } else {
        in_range
    };

    for record in kept {
        if let Some(row) = rows.get_mut(&record.clinic) {
            let value = record.numeric(field).unwrap_or(0.0);
            row.add_assign_at(grid.period_start_of(record.date), value);
        }
    }

    Ok(CompletenessTable { rows, grid })
}

/// Roll a facility completeness table up to a higher hierarchy level.
///
/// Every location at `level` whose constituent clinics appear in the
/// input gets one row keyed by its display name: the per-period mean
/// across the constituents carrying that period. With a `cutoff`, values
/// strictly above it are clamped to it before averaging. The output
/// never contains the input's facility rows.
pub fn clinic_to_level(
    completeness: &CompletenessTable,
    locations: &LocationCatalog,
    level: LocationLevel,
    cutoff: Option<f64>,
) -> Result<CompletenessTable> {
    let mut rows: BTreeMap<String, Timeline> = BTreeMap::new();

    for target in locations.get_level(level, false) {
        let constituents: Vec<&Timeline> = locations
            .clinics_under(target)
            .into_iter()
            .filter_map(|clinic| completeness.get(clinic))
            .collect();
        if constituents.is_empty() {
            continue;
        }

        let mut sums: BTreeMap<NaiveDateTime, (f64, u32)> = BTreeMap::new();
        for series in constituents {
            for (period_start, value) in series.iter() {
                let capped = match cutoff {
                    Some(cap) => value.min(cap),
                    None => value,
                };
                let entry = sums.entry(period_start).or_insert((0.0, 0));
                entry.0 += capped;
                entry.1 += 1;
            }
        }

        let mut series = Timeline::new();
        for (period_start, (sum, count)) in sums {
            series.set(period_start, sum / f64::from(count));
        }
        let key = locations.name(target).unwrap_or(target).to_string();
        rows.insert(key, series);
    }

    Ok(CompletenessTable {
        rows,
        grid: completeness.grid.clone(),
    })
}

/// Drop rows that repeat `(region, district, clinic, day, field value)`,
/// keeping the first
fn deduplicate<'a>(records: &[&'a CaseRecord], field: &str) -> Vec<&'a CaseRecord> {
    let mut seen: FxHashSet<(String, String, String, chrono::NaiveDate, Option<u64>)> =
        FxHashSet::default();
    let mut kept = Vec::with_capacity(records.len());
    let mut dropped = 0usize;

    for record in records {
        let key = (
            record.region.clone(),
            record.district.clone(),
            record.clinic.clone(),
            record.date.date(),
            record.numeric(field).map(f64::to_bits),
        );
        if seen.insert(key) {
            kept.push(*record);
        } else {
            dropped += 1;
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {dropped} duplicate submissions");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;
    use crate::utils::dates::parse_date;
    use chrono::{NaiveDate, Weekday};

    fn catalog() -> LocationCatalog {
        LocationCatalog::new(vec![
            Location::new("2", "Region 1", LocationLevel::Region),
            Location::new("4", "District 1", LocationLevel::District).with_parent("2"),
            Location::new("7", "Clinic 1", LocationLevel::Clinic)
                .with_parent("4")
                .with_case_report(true)
                .with_start_date(NaiveDate::from_ymd_opt(2016, 1, 1).unwrap()),
            Location::new("8", "Clinic 2", LocationLevel::Clinic)
                .with_parent("4")
                .with_case_report(true)
                .with_start_date(NaiveDate::from_ymd_opt(2016, 1, 11).unwrap()),
            Location::new("9", "Clinic 3", LocationLevel::Clinic).with_parent("4"),
        ])
    }

    fn submission(date: &str, clinic: &str) -> CaseRecord {
        CaseRecord::new(parse_date(date).unwrap())
            .at(LocationLevel::Region, "2")
            .at(LocationLevel::District, "4")
            .at(LocationLevel::Clinic, clinic)
            .with_value("reg_1", 1.0)
    }

    fn january() -> PeriodOptions {
        PeriodOptions::range("2016-01-04", "2016-01-25").with_week_start(Weekday::Mon)
    }

    #[test]
    fn test_dense_index_respects_start_dates() {
        let table =
            number_per_week_clinic(&[], "reg_1", &catalog(), &january(), true).unwrap();
        assert_eq!(table.keys(), ["7", "8"]);
        // Clinic 7 reports from the grid start, clinic 8 from January 11
        assert_eq!(table.get("7").unwrap().len(), 3);
        assert_eq!(table.get("8").unwrap().len(), 2);
        assert_eq!(
            table.get("8").unwrap().periods()[0],
            parse_date("2016-01-11").unwrap()
        );
    }

    #[test]
    fn test_counts_and_pre_start_drop() {
        let records = vec![
            submission("2016-01-05", "7"),
            submission("2016-01-06", "8"), // before clinic 8 started
            submission("2016-01-12", "8"),
        ];
        let table =
            number_per_week_clinic(&records, "reg_1", &catalog(), &january(), true).unwrap();
        assert_eq!(
            table.get("7").unwrap().get(parse_date("2016-01-04").unwrap()),
            Some(1.0)
        );
        // The early submission has no slot on clinic 8's series
        assert_eq!(table.get("8").unwrap().total(), 1.0);
    }

    #[test]
    fn test_duplicate_submissions_dropped() {
        let records = vec![
            submission("2016-01-05T08:00:00", "7"),
            submission("2016-01-05T17:00:00", "7"), // same day duplicate
            submission("2016-01-06", "7"),
        ];
        let table =
            number_per_week_clinic(&records, "reg_1", &catalog(), &january(), true).unwrap();
        assert_eq!(table.get("7").unwrap().total(), 2.0);

        let undeduped =
            number_per_week_clinic(&records, "reg_1", &catalog(), &january(), false).unwrap();
        assert_eq!(undeduped.get("7").unwrap().total(), 3.0);
    }

    #[test]
    fn test_missing_start_date_is_an_error() {
        let bad_catalog = LocationCatalog::new(vec![
            Location::new("7", "Clinic 1", LocationLevel::Clinic).with_case_report(true),
        ]);
        let err = number_per_week_clinic(&[], "reg_1", &bad_catalog, &january(), true)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingStartDateError(id) if id == "7"));
    }

    #[test]
    fn test_rollup_mean_and_cutoff() {
        let records = vec![
            submission("2016-01-12", "7"),
            submission("2016-01-13", "7"),
            submission("2016-01-14", "7"),
            submission("2016-01-12", "8"),
        ];
        let table =
            number_per_week_clinic(&records, "reg_1", &catalog(), &january(), true).unwrap();
        let rolled =
            clinic_to_level(&table, &catalog(), LocationLevel::District, Some(2.0)).unwrap();

        // Output keys are display names, disjoint from the input's ids
        assert_eq!(rolled.keys(), ["District 1"]);
        let series = rolled.get("District 1").unwrap();
        // Week of Jan 11: clinic 7 capped from 3 to 2, clinic 8 has 1
        assert_eq!(series.get(parse_date("2016-01-11").unwrap()), Some(1.5));
        // Week of Jan 4: only clinic 7 carries the period
        assert_eq!(series.get(parse_date("2016-01-04").unwrap()), Some(0.0));
    }

    #[test]
    fn test_rollup_skips_locations_without_rows() {
        let table =
            number_per_week_clinic(&[], "reg_1", &catalog(), &january(), true).unwrap();
        let rolled = clinic_to_level(&table, &catalog(), LocationLevel::Region, None).unwrap();
        assert_eq!(rolled.keys(), ["Region 1"]);

        let empty = CompletenessTable {
            rows: BTreeMap::new(),
            grid: table.grid().clone(),
        };
        let rolled = clinic_to_level(&empty, &catalog(), LocationLevel::Region, None).unwrap();
        assert!(rolled.is_empty());
    }
}
