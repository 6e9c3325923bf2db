//! PopSim Integerizer - Constrained rounding of fractional household weights
//!
//! Each zone's float weights are rounded to their floor or ceiling so that the
//! total-household control is matched exactly where possible and the other
//! controls are missed as little as their importance allows:
//! - Largest-remainder construction
//! - Late acceptance local search over flip and swap moves
//! - Incremental scoring through the rounding director
//! - Time, step and unimproved-step termination

pub mod construction;
pub mod director;
pub mod error;
pub mod localsearch;
pub mod problem;
pub mod solver;
pub mod statistics;
pub mod termination;

pub use director::{RoundingDirector, RoundingMove};
pub use error::IntegerizerError;
pub use localsearch::{LateAcceptanceSearch, SearchResult};
pub use problem::{ControlTarget, IntegerizeProblem};
pub use solver::{integerize, IntegerizeStatus, Integerized, Integerizer};
pub use statistics::IntegerizeStatistics;
pub use termination::{TerminationReason, ZoneTermination};

#[cfg(test)]
mod tests;
