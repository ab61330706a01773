//! A Rust library for computing epidemiological surveillance indicators
//! from periodic case-report data, aligned on configurable epi-week grids.

pub mod algorithm;
pub mod catalog;
pub mod error;
pub mod models;
pub mod period;
pub mod reader;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use error::{AnalysisError, Result};
pub use models::{CaseRecord, FieldValue, Location, LocationLevel, Timeline, Variable};

// Catalogs
pub use catalog::{LocationCatalog, VariableCatalog};

// Period grids
pub use period::{resolve_period, PeriodGrid, PeriodOptions};

// Indicator computations
pub use algorithm::{
    breakdown_by_category, clinic_to_level, count, count_over_count, cross_table,
    grouped_count_over_count, incidence_rate, incidence_rate_by_category,
    incidence_rate_by_location, number_of_sites, number_per_week_clinic, odds_ratio,
};
pub use algorithm::{
    Breakdown, CompletenessTable, CountSummary, CrossTable, GroupedRatioRow, OddsRatio,
    ProportionSummary, RateInterval, RateOffsets, SiteCount, VarRef,
};

// Record loading
pub use reader::{
    records_from_csv_file, records_from_csv_str, records_from_json_file, records_from_json_str,
};
