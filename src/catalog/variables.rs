//! Variable catalog
//!
//! Holds variable definitions keyed by id and the category groups built
//! from their tags. Group membership drives cross-tabulation and
//! per-category rates, so member iteration is kept in ascending id order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::Variable;

/// Catalog of variable definitions and their category groups
#[derive(Debug, Clone, Default)]
pub struct VariableCatalog {
    variables: BTreeMap<String, Variable>,
    groups: BTreeMap<String, BTreeSet<String>>,
}

/// JSON export entry, keyed externally by variable id
#[derive(Deserialize)]
struct JsonVariable {
    name: String,
    #[serde(default)]
    category: Vec<String>,
}

/// CSV export row with the category tags joined into one cell
#[derive(Deserialize)]
struct CsvVariable {
    id: String,
    name: String,
    #[serde(default)]
    category: String,
}

impl VariableCatalog {
    /// Build a catalog from variable definitions
    #[must_use]
    pub fn new(variables: Vec<Variable>) -> Self {
        let mut catalog = Self::default();
        for variable in variables {
            catalog.insert(variable);
        }
        catalog
    }

    /// Load a catalog from the JSON export shape: an object keyed by
    /// variable id
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, JsonVariable> = serde_json::from_str(json)?;
        let variables = entries
            .into_iter()
            .map(|(id, entry)| Variable {
                id,
                name: entry.name,
                category: entry.category,
            })
            .collect();
        Ok(Self::new(variables))
    }

    /// Load a catalog from a JSON export file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Load a catalog from CSV with `id,name,category` columns. The
    /// category cell is split on `;` when present, otherwise on `,`.
    pub fn from_csv_str(csv_text: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        let mut variables = Vec::new();
        for row in reader.deserialize() {
            let row: CsvVariable = row?;
            let category = split_categories(&row.category);
            variables.push(Variable {
                id: row.id,
                name: row.name,
                category,
            });
        }
        Ok(Self::new(variables))
    }

    /// Load a catalog from a CSV export file
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_csv_str(&content)
    }

    fn insert(&mut self, variable: Variable) {
        for tag in &variable.category {
            self.groups
                .entry(tag.clone())
                .or_default()
                .insert(variable.id.clone());
        }
        self.variables.insert(variable.id.clone(), variable);
    }

    /// Get a variable definition by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Display name of a variable
    #[must_use]
    pub fn name(&self, id: &str) -> Option<&str> {
        self.variables.get(id).map(|v| v.name.as_str())
    }

    /// Resolve a variable id from its display name. Returns `None` when
    /// no variable carries the name or when more than one does.
    #[must_use]
    pub fn get_id(&self, name: &str) -> Option<&str> {
        let mut matches = self
            .variables
            .values()
            .filter(|v| v.name == name)
            .map(|v| v.id.as_str());
        match (matches.next(), matches.next()) {
            (Some(id), None) => Some(id),
            _ => None,
        }
    }

    /// Member ids of a category group, ascending by id. `None` when the
    /// category is unknown.
    #[must_use]
    pub fn group(&self, category: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(category)
    }

    /// Number of variable definitions in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Whether the catalog holds no definitions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Split a joined category cell on `;` when present, otherwise on `,`
fn split_categories(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    let separator = if cell.contains(';') { ';' } else { ',' };
    cell.split(separator)
        .map(|piece| piece.trim().to_string())
        .filter(|piece| !piece.is_empty())
        .collect()
}
