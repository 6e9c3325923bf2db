//! Control, incidence and weight tables.
//!
//! Tables are plain owned values. Steps take them by reference and return
//! new tables; persisting a result is the caller's decision, made through a
//! [`TableStore`].

mod control;
mod incidence;
mod store;
mod weight;

pub use control::ControlTable;
pub use incidence::IncidenceTable;
pub use store::{InMemoryTables, TableStore};
pub use weight::WeightTable;

/// Fractional household weight produced by the final balancer.
pub const BALANCED_WEIGHT: &str = "balanced_weight";

/// Fractional household weight produced by the preliminary balancer.
pub const PRELIMINARY_BALANCED_WEIGHT: &str = "preliminary_balanced_weight";

/// Integer household weight written by seed integerization.
pub const INTEGER_WEIGHT: &str = "integer_weight";

/// Name of the control table for `geography`, used in diagnostics.
pub fn control_table_name(geography: &str) -> String {
    format!("{}_controls", geography)
}

/// Name of the weight table for `geography`, used in diagnostics.
pub fn weight_table_name(geography: &str) -> String {
    format!("{}_weights", geography)
}

#[cfg(test)]
mod tests;
