//! Variable definition model
//!
//! A variable describes one named indicator field of the record table:
//! its id (the record column name), its display name, and the category
//! tags that group related variables for tabulation.

use serde::{Deserialize, Serialize};

/// Definition of one record-table indicator field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Variable id, also the record column carrying its values
    #[serde(default)]
    pub id: String,
    /// Display name for dashboard output
    pub name: String,
    /// Category tags this variable belongs to
    #[serde(default)]
    pub category: Vec<String>,
}

impl Variable {
    /// Create a variable definition
    #[must_use]
    pub fn new(id: &str, name: &str, categories: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: categories.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// Whether this variable carries the given category tag
    #[must_use]
    pub fn in_category(&self, tag: &str) -> bool {
        self.category.iter().any(|c| c == tag)
    }
}
