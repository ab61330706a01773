//! Period-indexed timeline series
//!
//! All weekly indicator output is reported on a timeline: an ordered map
//! from period start to value. Timelines are built zero-filled over the
//! period slots they may carry, so a period without data reads as 0 rather
//! than being absent from the series.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;

/// Value series indexed by period start, ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Timeline {
    points: BTreeMap<NaiveDateTime, f64>,
}

impl Timeline {
    /// Create an empty timeline
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: BTreeMap::new(),
        }
    }

    /// Create a timeline with the given period slots, all set to 0
    #[must_use]
    pub fn zero_filled<I>(periods: I) -> Self
    where
        I: IntoIterator<Item = NaiveDateTime>,
    {
        Self {
            points: periods.into_iter().map(|p| (p, 0.0)).collect(),
        }
    }

    /// Set the value for a period slot, creating the slot when absent
    pub fn set(&mut self, period: NaiveDateTime, value: f64) {
        self.points.insert(period, value);
    }

    /// Add to an existing period slot. A period outside the slots the
    /// timeline was built with is dropped, mirroring re-indexing onto the
    /// period grid. Returns whether the delta landed.
    pub fn add_assign_at(&mut self, period: NaiveDateTime, delta: f64) -> bool {
        match self.points.get_mut(&period) {
            Some(value) => {
                *value += delta;
                true
            }
            None => false,
        }
    }

    /// Get the value for a period slot
    #[must_use]
    pub fn get(&self, period: NaiveDateTime) -> Option<f64> {
        self.points.get(&period).copied()
    }

    /// All period starts in ascending order
    #[must_use]
    pub fn periods(&self) -> Vec<NaiveDateTime> {
        self.points.keys().copied().collect()
    }

    /// All values in period order
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Iterate over `(period start, value)` pairs in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDateTime, f64)> + '_ {
        self.points.iter().map(|(&period, &value)| (period, value))
    }

    /// Number of period slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the timeline has no period slots
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all period values
    #[must_use]
    pub fn total(&self) -> f64 {
        self.points.values().sum()
    }
}
