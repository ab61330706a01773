//! Common domain type definitions
//!
//! This module contains the enum types shared across domain models: the
//! reporting hierarchy levels and the uniform value type used when a
//! record column can be either text or numeric.

use serde::{Deserialize, Serialize};

/// Level in the reporting location hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    /// Whole-country level
    Country,
    /// Region level
    Region,
    /// District level
    District,
    /// Clinic (reporting site) level
    Clinic,
}

impl LocationLevel {
    /// Canonical lowercase name, also the record column carrying this level
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Region => "region",
            Self::District => "district",
            Self::Clinic => "clinic",
        }
    }
}

impl From<&str> for LocationLevel {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "country" => Self::Country,
            "region" => Self::Region,
            "district" => Self::District,
            _ => Self::Clinic,
        }
    }
}

/// Value of a record column that can be either text or numeric
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Text column value (hierarchy ids and free-form labels)
    Text(String),
    /// Numeric column value (indicator and count fields)
    Number(f64),
}

impl FieldValue {
    /// Numeric reading of the value, `None` for text
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// Label form used for grouping and breakdown keys. Whole numbers
    /// print without a fractional part.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}
