//! Error types for integerization

use thiserror::Error;

/// Input that the integerizer refuses to round.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegerizerError {
    /// Incidence rows, weights or target counts disagree
    #[error("{context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A float weight is NaN or infinite
    #[error("household {row} has non-finite weight {value}")]
    NonFiniteWeight { row: usize, value: f64 },

    /// A float weight is negative
    #[error("household {row} has negative weight {value}")]
    NegativeWeight { row: usize, value: f64 },

    /// An incidence value is NaN, infinite or negative
    #[error("household {row} has invalid incidence {value} for control '{target}'")]
    InvalidIncidence {
        row: usize,
        target: String,
        value: f64,
    },

    /// A control total is NaN or infinite
    #[error("control '{target}' has non-finite total {value}")]
    NonFiniteControl { target: String, value: f64 },

    /// The total-household control is unusable
    #[error("total household control '{target}': {reason}")]
    InvalidTotal { target: String, reason: String },
}
