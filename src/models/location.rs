//! Location model
//!
//! A location is one node of the reporting hierarchy: country, region,
//! district, or clinic. Clinics are the reporting sites; they carry the
//! case-report flag, a catchment population, and the date they started
//! reporting. Flat exports encode booleans as 0/1 and parent links under
//! a `parent_location` key, so deserialization accepts both readings.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::types::LocationLevel;

/// One node of the reporting location hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location id
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Hierarchy level
    pub level: LocationLevel,
    /// Catchment population, 0 when not recorded
    #[serde(default)]
    pub population: u64,
    /// First reporting date, clinics only
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Whether this is an active case-report site
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub case_report: bool,
    /// Parent location id, absent for the hierarchy root
    #[serde(default, alias = "parent_location", deserialize_with = "deserialize_id")]
    pub parent: Option<String>,
}

impl Location {
    /// Create a location with no population, parent, or reporting data
    #[must_use]
    pub fn new(id: &str, name: &str, level: LocationLevel) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            level,
            population: 0,
            start_date: None,
            case_report: false,
            parent: None,
        }
    }

    /// Set the catchment population
    #[must_use]
    pub fn with_population(mut self, population: u64) -> Self {
        self.population = population;
        self
    }

    /// Set the parent location id
    #[must_use]
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    /// Set the first reporting date
    #[must_use]
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Mark the location as an active case-report site
    #[must_use]
    pub fn with_case_report(mut self, case_report: bool) -> Self {
        self.case_report = case_report;
        self
    }
}

/// Boolean flag that flat exports may encode as a bool, 0/1, or "0"/"1"
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
        Null,
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Text(s) => matches!(s.trim(), "1" | "true"),
        Flag::Null => false,
    })
}

/// Location id that flat exports may encode as a string or a number
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Null,
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => Some(s),
        Id::Int(i) => Some(i.to_string()),
        Id::Null => None,
    })
}
