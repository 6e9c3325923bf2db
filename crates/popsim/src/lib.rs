//! PopSim - Hierarchical control factoring and seed integerization
//!
//! Runs the two steps that follow list balancing in a population synthesizer:
//! meta-level controls are factored down to seed zones, then each seed zone's
//! balanced weights are rounded to integer household counts.
//!
//! # Example
//!
//! ```rust
//! use popsim::prelude::*;
//!
//! // Scores rank integer weight assignments
//! let score = IntegerizeScore::of(0, -1000, -250);
//! assert!(score.is_feasible());
//! assert!(!score.is_perfect());
//! ```

// Data model
pub use popsim_core::{
    ControlSpec, ControlSpecRow, ControlTable, InMemoryTables, IncidenceTable, IntegerizeScore,
    TableError, TableStore, WeightTable, ZoneId, BALANCED_WEIGHT, INTEGER_WEIGHT,
    PRELIMINARY_BALANCED_WEIGHT,
};

// Configuration
pub use popsim_config::{
    ConfigError, FailurePolicy, IntegerizerConfig, Settings, TerminationConfig, ThreadCount,
};

// Single-zone integerizer
pub use popsim_integerizer::{
    integerize, ControlTarget, IntegerizeProblem, IntegerizeStatus, Integerized, Integerizer,
    IntegerizerError,
};

// Steps
pub use popsim_steps::{
    integerize_final_seed_weights, meta_control_factoring, CleanedControl, FactoringDiagnostic,
    FactoringOutcome, IntegerizationOutcome, IntegerizationReport, NanControlCause, StepError,
    ZoneOutcome, ZoneReport,
};

mod pipeline;
pub use pipeline::{Pipeline, PipelineReport};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::{ControlSpec, ControlSpecRow, InMemoryTables, IntegerizeScore, TableStore};
    pub use super::{FailurePolicy, Settings, ThreadCount};
    pub use super::{IntegerizationReport, Pipeline, PipelineReport, StepError};
}
