//! Indicator computation algorithms
//!
//! This module implements the indicator computations the dashboards
//! request. It includes:
//!
//! 1. Scalar and timeline aggregation of record fields onto the epi-week
//!    grid, including ratio-of-sums indicators
//! 2. Facility reporting-completeness with hierarchical rollup
//! 3. Incidence rates, confidence intervals, and odds ratios
//! 4. Category cross-tabulation and breakdowns
//!
//! Every computation is a pure pass over the supplied record table; the
//! catalogs are only read for naming, grouping, and hierarchy.

pub mod aggregate;
pub mod completeness;
pub mod crosstab;
pub mod rates;

// Re-export key types
pub use aggregate::{
    count, count_over_count, grouped_count_over_count, number_of_sites, CountSummary,
    GroupedRatioRow, ProportionSummary, SiteCount,
};
pub use completeness::{clinic_to_level, number_per_week_clinic, CompletenessTable};
pub use crosstab::{breakdown_by_category, cross_table, Breakdown, CrossTable};
pub use rates::{
    incidence_rate, incidence_rate_by_category, incidence_rate_by_location, odds_ratio, OddsRatio,
    RateInterval, RateOffsets, VarRef,
};
