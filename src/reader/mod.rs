//! Reading case records from CSV and JSON files
//!
//! Both formats are header driven: `date` is required on every row, the
//! four hierarchy columns are kept as location id strings, and every
//! other cell is kept only when it reads as a number. Text that is not
//! numeric is dropped silently so that free-text columns never poison
//! the numeric aggregations.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{AnalysisError, Result};
use crate::models::{CaseRecord, LocationLevel};
use crate::utils::dates::parse_date;

const HIERARCHY_COLUMNS: [(&str, LocationLevel); 4] = [
    ("country", LocationLevel::Country),
    ("region", LocationLevel::Region),
    ("district", LocationLevel::District),
    ("clinic", LocationLevel::Clinic),
];

/// Read case records from CSV text.
pub fn records_from_csv_str(data: &str) -> Result<Vec<CaseRecord>> {
    read_csv(csv::Reader::from_reader(data.as_bytes()))
}

/// Read case records from a CSV file.
pub fn records_from_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaseRecord>> {
    read_csv(csv::Reader::from_path(path)?)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<CaseRecord>> {
    let headers = reader.headers()?.clone();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cells: Vec<(&str, &str)> = headers.iter().zip(row.iter()).collect();
        records.push(record_from_cells(&cells)?);
    }
    let count = records.len();
    log::info!("Read {count} case records from CSV");
    Ok(records)
}

/// Read case records from a JSON array of flat objects.
pub fn records_from_json_str(data: &str) -> Result<Vec<CaseRecord>> {
    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_str(data)?;
    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let cells: Vec<(&str, String)> = row
            .iter()
            .map(|(name, value)| (name.as_str(), cell_text(value)))
            .collect();
        records.push(record_from_cells(&cells)?);
    }
    let count = records.len();
    log::info!("Read {count} case records from JSON");
    Ok(records)
}

/// Read case records from a JSON file.
pub fn records_from_json_file<P: AsRef<Path>>(path: P) -> Result<Vec<CaseRecord>> {
    records_from_json_str(&fs::read_to_string(path)?)
}

/// Render a JSON value the way its CSV cell would look. Whole numbers
/// drop the fraction so numeric location ids match catalog ids.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_i64() {
            Some(whole) => whole.to_string(),
            None => n.to_string(),
        },
        Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn record_from_cells<S: AsRef<str>>(cells: &[(&str, S)]) -> Result<CaseRecord> {
    let date_cell = cells
        .iter()
        .find(|(name, _)| *name == "date")
        .map(|(_, value)| value.as_ref())
        .ok_or_else(|| AnalysisError::InvalidDateError("row without a date column".to_string()))?;
    let mut record = CaseRecord::new(parse_date(date_cell)?);

    for (name, value) in cells {
        if *name == "date" {
            continue;
        }
        let value = value.as_ref().trim();
        if let Some(&(_, level)) = HIERARCHY_COLUMNS.iter().find(|(column, _)| column == name) {
            record = record.at(level, value);
        } else if let Ok(number) = value.parse::<f64>() {
            record = record.with_value(name, number);
        }
    }
    Ok(record)
}
