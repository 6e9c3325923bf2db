//! Error types for table access

use thiserror::Error;

use crate::zone::ZoneId;

/// Structural mismatch between a control spec and the tables it describes.
///
/// These are never recoverable: a missing column or zone means the data
/// handed to a step does not line up with the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// A control target named by the spec is absent from a table
    #[error("control target '{target}' missing from {table}")]
    MissingControlTarget { table: String, target: String },

    /// No table is registered for a geography
    #[error("no {kind} table for geography '{geography}'")]
    MissingTable { kind: String, geography: String },

    /// A named column is absent from a table
    #[error("column '{column}' missing from {table}")]
    MissingColumn { table: String, column: String },

    /// A zone is absent from a table
    #[error("{geography} zone {zone} missing from {table}")]
    MissingZone {
        table: String,
        geography: String,
        zone: ZoneId,
    },

    /// A zone was inserted twice
    #[error("{geography} zone {zone} appears more than once")]
    DuplicateZone { geography: String, zone: ZoneId },

    /// A control target appears more than once in a control spec
    #[error("control target '{0}' appears more than once in the control spec")]
    DuplicateTarget(String),

    /// A row or column has the wrong number of values
    #[error("{context}: expected {expected} values, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Two tables that must cover the same zones do not
    #[error("{geography} zone sets differ: {detail}")]
    ZoneSetMismatch { geography: String, detail: String },
}

/// Result type alias for table operations
pub type Result<T> = std::result::Result<T, TableError>;
