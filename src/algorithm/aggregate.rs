//! Scalar and timeline aggregation
//!
//! Sums record fields into totals and per-period series over the epi-week
//! grid. Row filtering for totals is inclusive of the range end while the
//! grid itself excludes it, so a record dated exactly at the end counts
//! toward the total but holds no period slot. Records whose period falls
//! outside the grid (the partial head week) are likewise dropped from the
//! timeline only.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::Result;
use crate::models::{CaseRecord, FieldValue, LocationLevel, Timeline};
use crate::period::{PeriodGrid, PeriodOptions, resolve_period};
use crate::utils::stats;

/// Total and weekly timeline of one record field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountSummary {
    /// Sum of the field over rows in range
    pub total: f64,
    /// Per-period sums on the full grid, missing periods as 0
    pub timeline: Timeline,
    /// Per-row mean of the field, `None` when no row carries it
    pub mean: Option<f64>,
    /// Per-row sample standard deviation, `None` below two rows
    pub std_dev: Option<f64>,
}

/// Overall proportion and per-period ratio timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionSummary {
    /// Summed numerator over summed denominator, 0 when the denominator
    /// sums to 0
    pub proportion: f64,
    /// Per-period numerator over denominator ratios
    pub timeline: Timeline,
}

/// Distinct reporting sites in range and per period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteCount {
    /// Distinct hierarchy ids over the whole range
    pub total: usize,
    /// Per-period distinct counts, missing periods as 0
    pub timeline: Timeline,
}

/// One group row of a grouped proportion table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRatioRow {
    /// Group label, a distinct value of the grouping column
    pub group: String,
    /// Numerator sum over denominator sum within the group
    pub proportion: f64,
    /// Denominator sum within the group
    pub denominator: f64,
    /// Requested descriptive fields, each taken from the group's first
    /// row carrying it
    pub fields: Vec<(String, FieldValue)>,
}

/// Total count and weekly timeline of a record field.
///
/// # Arguments
/// * `records` - The record table
/// * `field` - Field to sum; an absent field yields a zero result
/// * `period` - Date-range options
pub fn count(
    records: &[CaseRecord],
    field: &str,
    period: &PeriodOptions,
) -> Result<CountSummary> {
    let grid = resolve_period(period)?;
    let mut timeline = grid.empty_timeline();
    let mut total = 0.0;
    let mut row_values = Vec::new();

    for record in records.iter().filter(|r| grid.contains(r.date)) {
        if let Some(value) = record.numeric(field) {
            total += value;
            row_values.push(value);
            timeline.add_assign_at(grid.period_start_of(record.date), value);
        }
    }

    Ok(CountSummary {
        total,
        timeline,
        mean: stats::mean(&row_values),
        std_dev: stats::sample_std(&row_values),
    })
}

/// Proportion of one field over another, with a per-period ratio
/// timeline.
///
/// Rows are kept only when the denominator field equals 1: it is an
/// eligibility flag, not a count. When `restrict` names a field, rows
/// where it is absent or 0 are discarded first. A period whose
/// denominator sums to 0 is computed with denominator 1 so the timeline
/// never contains NaN; a zero overall denominator yields proportion 0.
///
/// # Arguments
/// * `records` - The record table
/// * `numerator` - Field summed as the numerator
/// * `denominator` - Eligibility flag field, summed as the denominator
/// * `period` - Date-range options
/// * `restrict` - Optional boolean-valued field gating rows
pub fn count_over_count(
    records: &[CaseRecord],
    numerator: &str,
    denominator: &str,
    period: &PeriodOptions,
    restrict: Option<&str>,
) -> Result<ProportionSummary> {
    let grid = resolve_period(period)?;
    let mut numerators = grid.empty_timeline();
    let mut denominators = grid.empty_timeline();
    let mut numerator_sum = 0.0;
    let mut denominator_sum = 0.0;

    for record in eligible_rows(records, &grid, denominator, restrict) {
        let n = record.numeric(numerator).unwrap_or(0.0);
        let d = record.numeric(denominator).unwrap_or(0.0);
        numerator_sum += n;
        denominator_sum += d;
        let period_start = grid.period_start_of(record.date);
        numerators.add_assign_at(period_start, n);
        denominators.add_assign_at(period_start, d);
    }

    let proportion = if denominator_sum == 0.0 {
        0.0
    } else {
        numerator_sum / denominator_sum
    };

    let mut timeline = grid.empty_timeline();
    for (period_start, d) in denominators.iter() {
        let n = numerators.get(period_start).unwrap_or(0.0);
        let divisor = if d == 0.0 { 1.0 } else { d };
        timeline.set(period_start, n / divisor);
    }

    Ok(ProportionSummary {
        proportion,
        timeline,
    })
}

/// Number of distinct reporting sites at a hierarchy level, overall and
/// per period.
pub fn number_of_sites(
    records: &[CaseRecord],
    level: LocationLevel,
    period: &PeriodOptions,
) -> Result<SiteCount> {
    let grid = resolve_period(period)?;
    let mut all_sites: FxHashSet<&str> = FxHashSet::default();
    let mut per_period: BTreeMap<NaiveDateTime, FxHashSet<&str>> = BTreeMap::new();

    for record in records.iter().filter(|r| grid.contains(r.date)) {
        let site = record.location(level);
        if site.is_empty() {
            continue;
        }
        all_sites.insert(site);
        per_period
            .entry(grid.period_start_of(record.date))
            .or_default()
            .insert(site);
    }

    let mut timeline = grid.empty_timeline();
    for (period_start, sites) in per_period {
        timeline.add_assign_at(period_start, sites.len() as f64);
    }

    Ok(SiteCount {
        total: all_sites.len(),
        timeline,
    })
}

/// Per-group proportions of one field over another.
///
/// Groups are the distinct values of the `group_by` column among rows in
/// range, ascending; rows missing the column are skipped. Groups whose
/// eligible denominator sums to 0 are omitted. Each row also carries the
/// requested descriptive `fields`, taken per field from the group's
/// first row carrying it.
pub fn grouped_count_over_count(
    records: &[CaseRecord],
    numerator: &str,
    denominator: &str,
    group_by: &str,
    fields: &[&str],
    period: &PeriodOptions,
    restrict: Option<&str>,
) -> Result<Vec<GroupedRatioRow>> {
    let grid = resolve_period(period)?;
    let mut groups: BTreeMap<String, Vec<&CaseRecord>> = BTreeMap::new();

    for record in records.iter().filter(|r| grid.contains(r.date)) {
        let Some(value) = record.field(group_by) else {
            continue;
        };
        groups.entry(value.label()).or_default().push(record);
    }

    let mut rows = Vec::new();
    for (group, members) in groups {
        let mut numerator_sum = 0.0;
        let mut denominator_sum = 0.0;
        for record in members.iter().filter(|r| is_eligible(r, denominator, restrict)) {
            numerator_sum += record.numeric(numerator).unwrap_or(0.0);
            denominator_sum += record.numeric(denominator).unwrap_or(0.0);
        }
        if denominator_sum == 0.0 {
            continue;
        }

        let field_values = fields
            .iter()
            .filter_map(|&name| {
                members
                    .iter()
                    .find_map(|r| r.field(name))
                    .map(|value| (name.to_string(), value))
            })
            .collect();

        rows.push(GroupedRatioRow {
            group,
            proportion: numerator_sum / denominator_sum,
            denominator: denominator_sum,
            fields: field_values,
        });
    }

    Ok(rows)
}

/// Rows in range that pass the restrict gate and carry the denominator
/// eligibility flag
fn eligible_rows<'a>(
    records: &'a [CaseRecord],
    grid: &'a PeriodGrid,
    denominator: &'a str,
    restrict: Option<&'a str>,
) -> impl Iterator<Item = &'a CaseRecord> {
    records
        .iter()
        .filter(|r| grid.contains(r.date))
        .filter(move |r| is_eligible(r, denominator, restrict))
}

fn is_eligible(record: &CaseRecord, denominator: &str, restrict: Option<&str>) -> bool {
    if let Some(gate) = restrict {
        if record.numeric(gate).unwrap_or(0.0) == 0.0 {
            return false;
        }
    }
    record.numeric(denominator).unwrap_or(0.0) == 1.0
}
