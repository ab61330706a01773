//! Cross tabulation and single-variable breakdowns
//!
//! Both operations work off the variable catalog's category groups.
//! Members are always laid out in id order; `use_names` only swaps the
//! labels, never the order. A member column absent from the records
//! contributes zero counts.

use itertools::Itertools;
use serde::Serialize;

use crate::catalog::VariableCatalog;
use crate::error::{AnalysisError, Result};
use crate::models::{CaseRecord, LocationLevel};

/// Hierarchy column names that route a breakdown to a plain value count
const HIERARCHY_COLUMNS: [&str; 4] = ["country", "region", "district", "clinic"];

/// Two-way contingency table of category members
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossTable {
    columns: Vec<String>,
    rows: Vec<String>,
    values: Vec<Vec<u64>>,
}

impl CrossTable {
    /// Column labels, in member id order
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Row labels, in member id order
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Cell count by row and column label
    #[must_use]
    pub fn value(&self, row: &str, column: &str) -> Option<u64> {
        let r = self.rows.iter().position(|label| label == row)?;
        let c = self.columns.iter().position(|label| label == column)?;
        Some(self.values[r][c])
    }
}

/// Ordered label-to-value rows of a single-variable breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    rows: Vec<(String, f64)>,
}

impl Breakdown {
    /// Value by row label
    #[must_use]
    pub fn get(&self, label: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|(l, _)| l == label)
            .map(|&(_, value)| value)
    }

    /// Row labels in table order
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rows.iter().map(|(label, value)| (label.as_str(), *value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn member_label(variables: &VariableCatalog, id: &str, use_names: bool) -> String {
    if use_names {
        variables.name(id).unwrap_or(id).to_string()
    } else {
        id.to_string()
    }
}

fn category_members<'a>(
    variables: &'a VariableCatalog,
    category: &str,
) -> Result<Vec<&'a str>> {
    let members = variables
        .group(category)
        .ok_or_else(|| AnalysisError::UnknownCategoryError(category.to_string()))?;
    Ok(members.iter().map(String::as_str).collect())
}

fn flag_set(record: &CaseRecord, field: &str) -> bool {
    record.numeric(field).unwrap_or(0.0) == 1.0
}

/// Cross tabulate two categories: columns from `category1`, rows from
/// `category2`, each cell counting the records where both member flags
/// are set.
///
/// An unknown category fails with `UnknownCategoryError`. With
/// `use_names` the axes carry display names instead of variable ids.
pub fn cross_table(
    variables: &VariableCatalog,
    category1: &str,
    category2: &str,
    records: &[CaseRecord],
    use_names: bool,
) -> Result<CrossTable> {
    let column_members = category_members(variables, category1)?;
    let row_members = category_members(variables, category2)?;

    let values = row_members
        .iter()
        .map(|row| {
            column_members
                .iter()
                .map(|column| {
                    records
                        .iter()
                        .filter(|r| flag_set(r, column) && flag_set(r, row))
                        .count() as u64
                })
                .collect()
        })
        .collect();

    Ok(CrossTable {
        columns: column_members
            .iter()
            .map(|id| member_label(variables, id, use_names))
            .collect(),
        rows: row_members
            .iter()
            .map(|id| member_label(variables, id, use_names))
            .collect(),
        values,
    })
}

/// Break records down over one category.
///
/// A hierarchy column name (`country`, `region`, `district`, `clinic`)
/// is counted directly: one row per distinct id, ordered by count
/// descending then label ascending. Any other category sums each member
/// flag in id order, with zero for members no record carries.
pub fn breakdown_by_category(
    variables: &VariableCatalog,
    category: &str,
    records: &[CaseRecord],
    use_names: bool,
) -> Result<Breakdown> {
    if HIERARCHY_COLUMNS.contains(&category) {
        return Ok(value_counts(records, LocationLevel::from(category)));
    }

    let members = category_members(variables, category)?;
    let rows = members
        .iter()
        .map(|id| {
            let total: f64 = records
                .iter()
                .filter_map(|r| r.numeric(id))
                .sum();
            (member_label(variables, id, use_names), total)
        })
        .collect();
    Ok(Breakdown { rows })
}

/// Count occurrences of each distinct id in a hierarchy column, ignoring
/// records with an empty id
fn value_counts(records: &[CaseRecord], level: LocationLevel) -> Breakdown {
    let rows = records
        .iter()
        .map(|r| r.location(level))
        .filter(|id| !id.is_empty())
        .counts()
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)))
        .map(|(label, count)| (label.to_string(), count as f64))
        .collect();
    Breakdown { rows }
}
