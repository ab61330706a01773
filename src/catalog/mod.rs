//! Variable and location catalogs
//!
//! Catalogs hold the definitions the indicator computations resolve
//! against: the variable catalog maps ids to display names and category
//! groups, the location catalog holds the reporting hierarchy with
//! populations and reporting start dates. Both load from the flat JSON
//! exports the surveillance system produces; the variable catalog also
//! loads from CSV.

pub mod locations;
pub mod variables;

pub use locations::LocationCatalog;
pub use variables::VariableCatalog;
