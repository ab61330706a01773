//! Case record model
//!
//! A case record is one row of the materialized record table: a report
//! timestamp, the reporting hierarchy ids, and a sparse set of named
//! numeric fields (indicator flags, counts, measurements). Columns absent
//! from a record are simply missing, never an error.

use chrono::NaiveDateTime;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::types::{FieldValue, LocationLevel};

/// One row of the record table
#[derive(Debug, Clone, Serialize)]
pub struct CaseRecord {
    /// Report timestamp
    pub date: NaiveDateTime,
    /// Country id the report belongs to
    pub country: String,
    /// Region id the report belongs to
    pub region: String,
    /// District id the report belongs to
    pub district: String,
    /// Clinic id the report was submitted from
    pub clinic: String,
    /// Named numeric fields, sparse
    #[serde(flatten)]
    values: FxHashMap<String, f64>,
}

impl CaseRecord {
    /// Create a record with the given report timestamp and no other data
    #[must_use]
    pub fn new(date: NaiveDateTime) -> Self {
        Self {
            date,
            country: String::new(),
            region: String::new(),
            district: String::new(),
            clinic: String::new(),
            values: FxHashMap::default(),
        }
    }

    /// Set the hierarchy id for one level
    #[must_use]
    pub fn at(mut self, level: LocationLevel, id: &str) -> Self {
        match level {
            LocationLevel::Country => self.country = id.to_string(),
            LocationLevel::Region => self.region = id.to_string(),
            LocationLevel::District => self.district = id.to_string(),
            LocationLevel::Clinic => self.clinic = id.to_string(),
        }
        self
    }

    /// Set a named numeric field
    #[must_use]
    pub fn with_value(mut self, field: &str, value: f64) -> Self {
        self.values.insert(field.to_string(), value);
        self
    }

    /// Get a named numeric field. Hierarchy columns are not numeric fields.
    #[must_use]
    pub fn numeric(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    /// Get the hierarchy id for a level
    #[must_use]
    pub fn location(&self, level: LocationLevel) -> &str {
        match level {
            LocationLevel::Country => &self.country,
            LocationLevel::Region => &self.region,
            LocationLevel::District => &self.district,
            LocationLevel::Clinic => &self.clinic,
        }
    }

    /// Uniform column access. Hierarchy columns answer as text, named
    /// numeric fields as numbers, anything else as `None`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "country" | "region" | "district" | "clinic" => {
                let id = self.location(LocationLevel::from(name));
                if id.is_empty() {
                    None
                } else {
                    Some(FieldValue::Text(id.to_string()))
                }
            }
            _ => self.numeric(name).map(FieldValue::Number),
        }
    }

    /// Names of the numeric fields present on this record
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}
