//! Domain models for surveillance indicator computation
//!
//! This module contains the core entity models used throughout the crate:
//! case records from the reporting sites, the catalog entries describing
//! variables and locations, and the period-indexed timeline series that
//! all weekly indicators are reported on.

pub mod location;
pub mod record;
pub mod timeline;
pub mod types;
pub mod variable;

// Re-export commonly used types
pub use location::Location;
pub use record::CaseRecord;
pub use timeline::Timeline;
pub use types::{FieldValue, LocationLevel};
pub use variable::Variable;
