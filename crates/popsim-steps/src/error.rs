//! Error types for the synthesis steps

use popsim_config::ConfigError;
use popsim_core::{TableError, ZoneId};
use popsim_integerizer::IntegerizerError;
use thiserror::Error;

/// Fatal failure of a synthesis step.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Two tables that must be aligned row by row have different lengths
    #[error("{context}: incidence table has {incidence_rows} rows, weights have {weight_rows}")]
    RowMismatch {
        context: String,
        incidence_rows: usize,
        weight_rows: usize,
    },

    /// A weight row belongs to a different zone than its incidence row
    #[error("row {row} is in zone {weight_zone} of the weight table but zone {incidence_zone} of the incidence table")]
    MisalignedRow {
        row: usize,
        incidence_zone: ZoneId,
        weight_zone: ZoneId,
    },

    /// A seed zone's households report more than one meta zone
    #[error("{seed_geography} zone {seed} spans {meta_geography} zones {first} and {second}")]
    GeographyNotNested {
        seed_geography: String,
        seed: ZoneId,
        meta_geography: String,
        first: ZoneId,
        second: ZoneId,
    },

    /// A control table's columns do not line up with the control spec
    #[error("{table} columns {actual:?} do not match control spec targets {expected:?}")]
    ColumnMismatch {
        table: String,
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A factored control could not be rounded to an integer
    #[error(
        "control '{target}' for zone {zone} is {value} \
         (factored seed weight {factored_seed_weight}, scaling factor {scaling_factor}, \
         meta control {meta_control})"
    )]
    NonIntegerCast {
        target: String,
        zone: ZoneId,
        value: f64,
        factored_seed_weight: f64,
        scaling_factor: f64,
        meta_control: f64,
    },

    /// A NaN control that no household data explains, under strict cleaning
    #[error("control '{target}' for zone {zone} is NaN although the zone has matching households")]
    UnexplainedNanControl { zone: ZoneId, target: String },

    /// The integerizer failed for one zone
    #[error(
        "integerization failed for zone {zone} ({household_count} households, \
         balanced weight {balanced_weight_sum}): {source}"
    )]
    ZoneSolver {
        zone: ZoneId,
        household_count: usize,
        balanced_weight_sum: f64,
        /// Control values that are NaN, infinite or fractional.
        anomalous_controls: Vec<(String, f64)>,
        #[source]
        source: IntegerizerError,
    },

    #[error("failed to build zone thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type alias for step operations
pub type Result<T> = std::result::Result<T, StepError>;
