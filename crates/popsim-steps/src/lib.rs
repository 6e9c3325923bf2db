//! PopSim Steps - Hierarchical control factoring and seed integerization
//!
//! The two synthesis steps that run after the balancer:
//! - [`meta_control_factoring`] redistributes meta-level controls to the
//!   seed zones inside each meta zone
//! - [`integerize_final_seed_weights`] rounds every seed zone's balanced
//!   weights to integers, zones in parallel
//!
//! Both are pure functions over the input tables; persisting the results is
//! up to the caller.

pub mod clean;
pub mod dispatch;
pub mod error;
pub mod factoring;
pub mod integerize;
pub mod report;
pub mod work;

pub use clean::{CleanedControl, NanControlCause};
pub use error::StepError;
pub use factoring::{
    meta_control_factoring, scaling_factor, FactoringDiagnostic, FactoringOutcome,
    UndefinedFactor,
};
pub use integerize::{integerize_final_seed_weights, IntegerizationOutcome};
pub use report::{IntegerizationReport, ZoneOutcome, ZoneReport};
pub use work::ZoneWork;
