//! Error handling for the indicator engine.
//!
//! Structural misconfiguration (bad dates, unknown categories, missing
//! populations or start dates) is an error; sparse data (an absent column,
//! a zero denominator) is a zero-valued result and never reaches this type.

/// Specialized error type for indicator computations
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// A supplied date string could not be parsed by any accepted format
    #[error("Invalid date: {0}")]
    InvalidDateError(String),

    /// A category/group is absent from the variable catalog
    #[error("Unknown category: {0}")]
    UnknownCategoryError(String),

    /// A population override was requested but not found by id or name
    #[error("Missing population for: {0}")]
    MissingPopulationError(String),

    /// An active case-report clinic has no reporting start date
    #[error("Missing start date for clinic: {0}")]
    MissingStartDateError(String),

    /// A variable was referenced by name without a variable catalog
    #[error("Variable lookup by name requires a variable catalog")]
    MissingVariablesError,

    /// Error reading a catalog or record export file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing a JSON export
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error parsing a CSV export
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// Alias for Result with `AnalysisError`
pub type Result<T> = std::result::Result<T, AnalysisError>;
