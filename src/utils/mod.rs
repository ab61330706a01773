//! Shared utilities for date handling and basic statistics.

pub mod dates;
pub mod stats;
