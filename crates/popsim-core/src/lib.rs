//! PopSim Core - Core types for hierarchical control factoring and integerization
//!
//! This crate provides the data model shared by the synthesis steps:
//! - Zone identifiers and the control specification
//! - Control, incidence and weight tables
//! - The table store accessor used to persist step results
//! - The score type used to rank integer weight assignments

pub mod error;
pub mod score;
pub mod spec;
pub mod table;
pub mod zone;

pub use error::TableError;
pub use score::IntegerizeScore;
pub use spec::{ControlSpec, ControlSpecRow};
pub use table::{
    ControlTable, InMemoryTables, IncidenceTable, TableStore, WeightTable, BALANCED_WEIGHT,
    INTEGER_WEIGHT, PRELIMINARY_BALANCED_WEIGHT,
};
pub use zone::ZoneId;
