//! Location catalog
//!
//! Holds the reporting hierarchy keyed by location id. Besides plain
//! lookups the catalog answers the two structural queries the indicator
//! computations need: all ids at a hierarchy level, and all clinics whose
//! parent chain passes through a given location.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::NaiveDate;
use rustc_hash::FxHashSet;

use crate::error::Result;
use crate::models::{Location, LocationLevel};

/// Catalog of the reporting location hierarchy
#[derive(Debug, Clone, Default)]
pub struct LocationCatalog {
    locations: BTreeMap<String, Location>,
}

impl LocationCatalog {
    /// Build a catalog from location entries
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        let mut map = BTreeMap::new();
        for location in locations {
            map.insert(location.id.clone(), location);
        }
        Self { locations: map }
    }

    /// Load a catalog from the JSON export shape: an object keyed by
    /// location id
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, Location> = serde_json::from_str(json)?;
        let locations = entries
            .into_iter()
            .map(|(id, mut location)| {
                location.id = id;
                location
            })
            .collect();
        Ok(Self::new(locations))
    }

    /// Load a catalog from a JSON export file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Get a location entry by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// Display name of a location
    #[must_use]
    pub fn name(&self, id: &str) -> Option<&str> {
        self.locations.get(id).map(|l| l.name.as_str())
    }

    /// Catchment population of a location, 0 when the location or its
    /// population is unknown
    #[must_use]
    pub fn population(&self, id: &str) -> u64 {
        self.locations.get(id).map_or(0, |l| l.population)
    }

    /// First reporting date of a location
    #[must_use]
    pub fn start_date(&self, id: &str) -> Option<NaiveDate> {
        self.locations.get(id).and_then(|l| l.start_date)
    }

    /// Whether a location is an active case-report site
    #[must_use]
    pub fn case_report(&self, id: &str) -> bool {
        self.locations.get(id).is_some_and(|l| l.case_report)
    }

    /// All location ids at a hierarchy level, ascending. At clinic level
    /// `only_case_report` restricts to active case-report sites; other
    /// levels ignore the flag.
    #[must_use]
    pub fn get_level(&self, level: LocationLevel, only_case_report: bool) -> BTreeSet<&str> {
        self.locations
            .values()
            .filter(|l| l.level == level)
            .filter(|l| level != LocationLevel::Clinic || !only_case_report || l.case_report)
            .map(|l| l.id.as_str())
            .collect()
    }

    /// All clinic ids whose parent chain passes through `id`. A clinic is
    /// under itself.
    #[must_use]
    pub fn clinics_under(&self, id: &str) -> BTreeSet<&str> {
        self.locations
            .values()
            .filter(|l| l.level == LocationLevel::Clinic && self.is_under(&l.id, id))
            .map(|l| l.id.as_str())
            .collect()
    }

    /// Resolve a location id from a display name within a district.
    /// Names are only unique per district, so both are required.
    #[must_use]
    pub fn loc_id_from_name(&self, name: &str, district: &str) -> Option<&str> {
        self.locations
            .values()
            .find(|l| l.name == name && self.district_ancestor(&l.id) == Some(district))
            .map(|l| l.id.as_str())
    }

    /// Number of locations in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the catalog holds no locations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Whether `ancestor` appears on the parent chain of `id`. The seen
    /// set guards against parent cycles in malformed catalogs.
    fn is_under(&self, id: &str, ancestor: &str) -> bool {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut current = id;
        loop {
            if current == ancestor {
                return true;
            }
            if !seen.insert(current) {
                return false;
            }
            match self.locations.get(current).and_then(|l| l.parent.as_deref()) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// The district-level location on the parent chain of `id`, the id
    /// itself for a district
    fn district_ancestor(&self, id: &str) -> Option<&str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut current = self.locations.get(id)?;
        loop {
            if current.level == LocationLevel::District {
                return Some(current.id.as_str());
            }
            if !seen.insert(current.id.as_str()) {
                return None;
            }
            current = self.locations.get(current.parent.as_deref()?)?;
        }
    }
}
