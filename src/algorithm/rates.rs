//! Incidence rates, confidence intervals, and odds ratios
//!
//! Rates are computed over the records the caller supplies; there is no
//! date filtering here. A variable can be referenced by id or by display
//! name; name resolution needs the variable catalog. A field absent from
//! every supplied record is a zero-observation result, never an error,
//! while a requested population override that cannot be found is a
//! structural error.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{LocationCatalog, VariableCatalog};
use crate::error::{AnalysisError, Result};
use crate::models::{CaseRecord, LocationLevel};
use crate::utils::stats::wilson_score_interval;

/// Fixed z-value for the 95% log-scale odds-ratio interval
const Z_ODDS: f64 = 1.96;

/// Variable reference, by id or by display name
#[derive(Debug, Clone, Copy)]
pub enum VarRef<'a> {
    /// Reference by variable id, used directly as the record column
    Id(&'a str),
    /// Reference by display name, resolved through the variable catalog
    Name(&'a str),
}

impl<'a> VarRef<'a> {
    /// Resolve to a record column name. A name with no catalog fails
    /// with `MissingVariablesError`; a name the catalog cannot resolve
    /// uniquely yields `None` and reads as an absent field.
    fn resolve(self, variables: Option<&'a VariableCatalog>) -> Result<Option<&'a str>> {
        match self {
            Self::Id(id) => Ok(Some(id)),
            Self::Name(name) => match variables {
                Some(catalog) => Ok(catalog.get_id(name)),
                None => Err(AnalysisError::MissingVariablesError),
            },
        }
    }
}

/// Rate with absolute Wilson interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateInterval {
    /// Count over population
    pub rate: f64,
    /// Absolute lower interval bound
    pub lower: f64,
    /// Absolute upper interval bound
    pub upper: f64,
}

/// Rate with asymmetric interval half-widths. Absolute bounds are
/// `rate - below` and `rate + above`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateOffsets {
    /// Count over population
    pub rate: f64,
    /// Distance from the rate down to the lower bound
    pub below: f64,
    /// Distance from the rate up to the upper bound
    pub above: f64,
}

/// Odds ratio with log-scale interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OddsRatio {
    /// Case-rate ratio of the two groups
    pub ratio: f64,
    /// Lower log-scale interval bound
    pub ci_lower: f64,
    /// Upper log-scale interval bound
    pub ci_upper: f64,
}

/// Sum of a field over a row selection, tracking whether any selected
/// row carries the field at all
struct FieldTally {
    sum: f64,
    rows: usize,
}

fn tally<'a, I>(records: I, field: &str) -> FieldTally
where
    I: IntoIterator<Item = &'a CaseRecord>,
{
    let mut sum = 0.0;
    let mut rows = 0;
    for record in records {
        rows += 1;
        sum += record.numeric(field).unwrap_or(0.0);
    }
    FieldTally { sum, rows }
}

/// Whether any record carries the field
fn field_present(records: &[CaseRecord], field: &str) -> bool {
    records.iter().any(|r| r.numeric(field).is_some())
}

fn rate_with_interval(count: f64, population: f64) -> RateInterval {
    if population <= 0.0 {
        return RateInterval {
            rate: 0.0,
            lower: 0.0,
            upper: 0.0,
        };
    }
    let (lower, upper) = wilson_score_interval(count, population);
    RateInterval {
        rate: count / population,
        lower,
        upper,
    }
}

fn offsets_from(interval: RateInterval) -> RateOffsets {
    RateOffsets {
        rate: interval.rate,
        below: interval.rate - interval.lower,
        above: interval.upper - interval.rate,
    }
}

/// Look up a population override by id, falling back to the display name
fn population_override(
    populations: &BTreeMap<String, u64>,
    id: &str,
    name: Option<&str>,
) -> Result<u64> {
    if let Some(&population) = populations.get(id) {
        return Ok(population);
    }
    if let Some(&population) = name.and_then(|n| populations.get(n)) {
        return Ok(population);
    }
    Err(AnalysisError::MissingPopulationError(id.to_string()))
}

/// Incidence rate of a variable over the supplied records, with the
/// 95% Wilson score interval as absolute bounds.
///
/// The count is the field sum over all records; the population defaults
/// to the row count, so the rate degenerates to a plain proportion. A
/// field absent from every record, or a zero population, yields the
/// all-zero result.
///
/// # Arguments
/// * `records` - Pre-filtered records to count over
/// * `var` - The variable to count
/// * `population` - Population at risk, defaults to the row count
/// * `variables` - Variable catalog, required to resolve names
pub fn incidence_rate(
    records: &[CaseRecord],
    var: VarRef<'_>,
    population: Option<u64>,
    variables: Option<&VariableCatalog>,
) -> Result<RateInterval> {
    let Some(field) = var.resolve(variables)? else {
        return Ok(rate_with_interval(0.0, 0.0));
    };
    if !field_present(records, field) {
        return Ok(rate_with_interval(0.0, 0.0));
    }
    let counts = tally(records, field);
    let population = population.unwrap_or(counts.rows as u64);
    Ok(rate_with_interval(counts.sum, population as f64))
}

/// Incidence rate of a variable within every member group of a category.
///
/// Each member of the category defines a group: the rows where its flag
/// equals 1. Without a population map the group's row count is the
/// population; with one, the member's population is looked up by id then
/// display name, and a miss fails with `MissingPopulationError`. Rows
/// are keyed by member display name and expose asymmetric interval
/// half-widths.
pub fn incidence_rate_by_category(
    records: &[CaseRecord],
    variables: &VariableCatalog,
    category: &str,
    var: VarRef<'_>,
    populations: Option<&BTreeMap<String, u64>>,
) -> Result<BTreeMap<String, RateOffsets>> {
    let members = variables
        .group(category)
        .ok_or_else(|| AnalysisError::UnknownCategoryError(category.to_string()))?;
    let Some(field) = var.resolve(Some(variables))? else {
        return Ok(zero_offsets_by_name(members.iter().map(|id| {
            variables.name(id).unwrap_or(id).to_string()
        })));
    };
    let present = field_present(records, field);

    let mut rows = BTreeMap::new();
    for member in members {
        let name = variables.name(member).unwrap_or(member);
        let group = records
            .iter()
            .filter(|r| r.numeric(member).unwrap_or(0.0) == 1.0);
        let counts = tally(group, field);
        let population = match populations {
            Some(map) => population_override(map, member, Some(name))?,
            None => counts.rows as u64,
        };
        let interval = if present {
            rate_with_interval(counts.sum, population as f64)
        } else {
            rate_with_interval(0.0, 0.0)
        };
        rows.insert(name.to_string(), offsets_from(interval));
    }
    Ok(rows)
}

/// Incidence rate of a variable for every location at a hierarchy level.
///
/// Records group by their `level` hierarchy column against the catalog's
/// ids at that level; at clinic level only active case-report sites are
/// included. Populations come from the location catalog unless an
/// override map is supplied, in which case every location must resolve
/// through it by id or display name. Rows are keyed by location display
/// name and expose asymmetric interval half-widths.
pub fn incidence_rate_by_location(
    records: &[CaseRecord],
    locations: &LocationCatalog,
    var: VarRef<'_>,
    level: LocationLevel,
    variables: Option<&VariableCatalog>,
    populations: Option<&BTreeMap<String, u64>>,
) -> Result<BTreeMap<String, RateOffsets>> {
    let ids = locations.get_level(level, true);
    let Some(field) = var.resolve(variables)? else {
        return Ok(zero_offsets_by_name(
            ids.iter().map(|id| locations.name(id).unwrap_or(id).to_string()),
        ));
    };
    let present = field_present(records, field);

    let mut rows = BTreeMap::new();
    for id in ids {
        let name = locations.name(id).unwrap_or(id);
        let group = records.iter().filter(|r| r.location(level) == id);
        let counts = tally(group, field);
        let population = match populations {
            Some(map) => population_override(map, id, Some(name))?,
            None => locations.population(id),
        };
        let interval = if present {
            rate_with_interval(counts.sum, population as f64)
        } else {
            rate_with_interval(0.0, 0.0)
        };
        rows.insert(name.to_string(), offsets_from(interval));
    }
    Ok(rows)
}

/// Odds ratio of a disease between two groups, approximated as the
/// ratio of the groups' case rates.
///
/// Group populations default to the groups' row counts; with a
/// population map both groups must resolve through it by id or display
/// name. The 95% interval is computed on the log scale with the fixed
/// 1.96 z-value. The all-zero result is returned when the disease field
/// is absent from the records or when either group's case count or
/// population is 0, so the log-scale terms stay finite.
pub fn odds_ratio(
    records: &[CaseRecord],
    disease: VarRef<'_>,
    groups: (&str, &str),
    populations: Option<&BTreeMap<String, u64>>,
    variables: Option<&VariableCatalog>,
) -> Result<OddsRatio> {
    const ZERO: OddsRatio = OddsRatio {
        ratio: 0.0,
        ci_lower: 0.0,
        ci_upper: 0.0,
    };

    let Some(field) = disease.resolve(variables)? else {
        return Ok(ZERO);
    };
    if !field_present(records, field) {
        return Ok(ZERO);
    }

    let (group_a, group_b) = groups;
    let mut tallies = [0.0; 2];
    let mut group_populations = [0.0; 2];
    for (slot, group) in [group_a, group_b].into_iter().enumerate() {
        let members = records
            .iter()
            .filter(|r| r.numeric(group).unwrap_or(0.0) == 1.0);
        let counts = tally(members, field);
        let population = match populations {
            Some(map) => {
                let name = variables.and_then(|v| v.name(group));
                population_override(map, group, name)?
            }
            None => counts.rows as u64,
        };
        tallies[slot] = counts.sum;
        group_populations[slot] = population as f64;
    }

    let [count_a, count_b] = tallies;
    let [population_a, population_b] = group_populations;
    if count_a == 0.0 || count_b == 0.0 || population_a == 0.0 || population_b == 0.0 {
        return Ok(ZERO);
    }

    let ratio = (count_a / population_a) / (count_b / population_b);
    let se = (1.0 / count_a + 1.0 / population_a + 1.0 / count_b + 1.0 / population_b).sqrt();
    Ok(OddsRatio {
        ratio,
        ci_lower: (ratio.ln() - Z_ODDS * se).exp(),
        ci_upper: (ratio.ln() + Z_ODDS * se).exp(),
    })
}

fn zero_offsets_by_name<I>(names: I) -> BTreeMap<String, RateOffsets>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .map(|name| {
            (
                name,
                RateOffsets {
                    rate: 0.0,
                    below: 0.0,
                    above: 0.0,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Variable;
    use crate::utils::dates::parse_date;

    fn flagged(count: usize, field: &str, value: f64) -> Vec<CaseRecord> {
        (0..count)
            .map(|_| CaseRecord::new(parse_date("2016-06-20").unwrap()).with_value(field, value))
            .collect()
    }

    fn catalog() -> VariableCatalog {
        VariableCatalog::new(vec![
            Variable::new("gen_1", "Male", &["gender"]),
            Variable::new("gen_2", "Female", &["gender"]),
            Variable::new("dis_1", "Cholera", &["disease"]),
        ])
    }

    #[test]
    fn test_incidence_rate_wilson_reference() {
        // 10 records, 4 flagged, population defaulting to the row count
        let mut records = flagged(4, "gen_1", 1.0);
        records.extend(flagged(6, "gen_1", 0.0));

        let result = incidence_rate(&records, VarRef::Id("gen_1"), None, None).unwrap();
        assert!((result.rate - 0.4).abs() < 1e-12);
        assert!((result.lower - 0.168_180_3).abs() < 1e-6);
        assert!((result.upper - 0.687_326_3).abs() < 1e-6);
    }

    #[test]
    fn test_incidence_rate_explicit_population() {
        let records = flagged(25, "dis_1", 1.0);
        let result =
            incidence_rate(&records, VarRef::Id("dis_1"), Some(100), None).unwrap();
        assert!((result.rate - 0.25).abs() < 1e-12);
        assert!(result.lower < result.rate && result.rate < result.upper);
    }

    #[test]
    fn test_incidence_rate_absent_field() {
        let records = flagged(10, "gen_1", 1.0);
        let result = incidence_rate(&records, VarRef::Id("nothing"), Some(100), None).unwrap();
        assert_eq!(result, RateInterval { rate: 0.0, lower: 0.0, upper: 0.0 });
    }

    #[test]
    fn test_name_resolution() {
        let records = flagged(4, "gen_1", 1.0);
        let catalog = catalog();

        let by_name =
            incidence_rate(&records, VarRef::Name("Male"), None, Some(&catalog)).unwrap();
        assert!((by_name.rate - 1.0).abs() < 1e-12);

        // A name that resolves to nothing reads as an absent field
        let unresolved =
            incidence_rate(&records, VarRef::Name("No such"), None, Some(&catalog)).unwrap();
        assert_eq!(unresolved.rate, 0.0);

        // A name without a catalog is a structural error
        let err = incidence_rate(&records, VarRef::Name("Male"), None, None).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingVariablesError));
    }

    #[test]
    fn test_by_category_groups_and_offsets() {
        let mut records = flagged(4, "gen_1", 1.0);
        records.extend(flagged(6, "gen_2", 1.0));
        for record in &mut records {
            *record = record.clone().with_value("dis_1", 1.0);
        }
        let catalog = catalog();

        let rows = incidence_rate_by_category(
            &records,
            &catalog,
            "gender",
            VarRef::Id("dis_1"),
            None,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        // Every member's rows all carry the disease, so each rate is 1
        let male = rows["Male"];
        assert!((male.rate - 1.0).abs() < 1e-12);
        // Offsets reconstruct the absolute Wilson bounds
        let (lower, upper) = wilson_score_interval(4.0, 4.0);
        assert!((male.rate - male.below - lower).abs() < 1e-12);
        assert!((male.rate + male.above - upper).abs() < 1e-12);
    }

    #[test]
    fn test_by_category_unknown_category() {
        let err = incidence_rate_by_category(
            &[],
            &catalog(),
            "not_a_category",
            VarRef::Id("dis_1"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::UnknownCategoryError(c) if c == "not_a_category"));
    }

    #[test]
    fn test_by_category_population_map() {
        let records = flagged(4, "gen_1", 1.0)
            .into_iter()
            .map(|r| r.with_value("dis_1", 1.0))
            .collect::<Vec<_>>();
        let catalog = catalog();

        // Lookup by display name works
        let populations =
            BTreeMap::from([("Male".to_string(), 100), ("Female".to_string(), 200)]);
        let rows = incidence_rate_by_category(
            &records,
            &catalog,
            "gender",
            VarRef::Id("dis_1"),
            Some(&populations),
        )
        .unwrap();
        assert!((rows["Male"].rate - 0.04).abs() < 1e-12);

        // A missing entry is a structural error
        let partial = BTreeMap::from([("Male".to_string(), 100)]);
        let err = incidence_rate_by_category(
            &records,
            &catalog,
            "gender",
            VarRef::Id("dis_1"),
            Some(&partial),
        )
        .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingPopulationError(_)));
    }

    #[test]
    fn test_odds_ratio() {
        let mut records = Vec::new();
        // Group A: 10 rows, 2 cases; group B: 10 rows, 1 case
        for i in 0..10 {
            let case = if i < 2 { 1.0 } else { 0.0 };
            records.push(
                CaseRecord::new(parse_date("2016-06-20").unwrap())
                    .with_value("gen_1", 1.0)
                    .with_value("dis_1", case),
            );
        }
        for i in 0..10 {
            let case = if i < 1 { 1.0 } else { 0.0 };
            records.push(
                CaseRecord::new(parse_date("2016-06-20").unwrap())
                    .with_value("gen_2", 1.0)
                    .with_value("dis_1", case),
            );
        }

        let result =
            odds_ratio(&records, VarRef::Id("dis_1"), ("gen_1", "gen_2"), None, None).unwrap();
        assert!((result.ratio - 2.0).abs() < 1e-12);
        // Log-scale bounds are geometrically symmetric around the ratio
        assert!(((result.ci_lower * result.ci_upper).sqrt() - result.ratio).abs() < 1e-9);
        assert!(result.ci_lower < result.ratio && result.ratio < result.ci_upper);
    }

    #[test]
    fn test_odds_ratio_zero_guards() {
        let records = flagged(10, "gen_1", 1.0);
        // Disease field entirely absent
        let absent =
            odds_ratio(&records, VarRef::Id("dis_1"), ("gen_1", "gen_2"), None, None).unwrap();
        assert_eq!(absent.ratio, 0.0);

        // Group B has no cases
        let mut records = flagged(10, "gen_1", 1.0);
        records.extend(flagged(10, "gen_2", 1.0));
        records[0] = records[0].clone().with_value("dis_1", 1.0);
        let no_b_cases =
            odds_ratio(&records, VarRef::Id("dis_1"), ("gen_1", "gen_2"), None, None).unwrap();
        assert_eq!(
            no_b_cases,
            OddsRatio { ratio: 0.0, ci_lower: 0.0, ci_upper: 0.0 }
        );
    }
}
