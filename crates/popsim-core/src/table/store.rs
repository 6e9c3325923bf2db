//! Table store accessor.

use std::collections::BTreeMap;

use super::{ControlTable, IncidenceTable, WeightTable};
use crate::error::{Result, TableError};

/// Keyed access to the tables a synthesis run reads and writes.
///
/// Steps never hold a store; they receive tables and return new ones.
/// Whoever drives the steps decides what to persist through this trait.
pub trait TableStore {
    /// Control table for `geography`.
    fn control_table(&self, geography: &str) -> Result<&ControlTable>;

    /// Replaces the control table of the table's geography.
    fn replace_control_table(&mut self, table: ControlTable);

    /// Weight table for `geography`.
    fn weight_table(&self, geography: &str) -> Result<&WeightTable>;

    /// Appends an integer column to the weight table of `geography`.
    fn add_weight_column(&mut self, geography: &str, name: &str, values: Vec<u64>) -> Result<()>;

    /// The household incidence table.
    fn incidence_table(&self) -> &IncidenceTable;
}

/// [`TableStore`] backed by owned maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    incidence: IncidenceTable,
    control_tables: BTreeMap<String, ControlTable>,
    weight_tables: BTreeMap<String, WeightTable>,
}

impl InMemoryTables {
    pub fn new(incidence: IncidenceTable) -> Self {
        Self {
            incidence,
            control_tables: BTreeMap::new(),
            weight_tables: BTreeMap::new(),
        }
    }

    pub fn with_control_table(mut self, table: ControlTable) -> Self {
        self.replace_control_table(table);
        self
    }

    pub fn with_weight_table(mut self, table: WeightTable) -> Self {
        self.weight_tables
            .insert(table.geography().to_string(), table);
        self
    }
}

impl TableStore for InMemoryTables {
    fn control_table(&self, geography: &str) -> Result<&ControlTable> {
        self.control_tables
            .get(geography)
            .ok_or_else(|| TableError::MissingTable {
                kind: "control".to_string(),
                geography: geography.to_string(),
            })
    }

    fn replace_control_table(&mut self, table: ControlTable) {
        self.control_tables
            .insert(table.geography().to_string(), table);
    }

    fn weight_table(&self, geography: &str) -> Result<&WeightTable> {
        self.weight_tables
            .get(geography)
            .ok_or_else(|| TableError::MissingTable {
                kind: "weight".to_string(),
                geography: geography.to_string(),
            })
    }

    fn add_weight_column(&mut self, geography: &str, name: &str, values: Vec<u64>) -> Result<()> {
        let table =
            self.weight_tables
                .get_mut(geography)
                .ok_or_else(|| TableError::MissingTable {
                    kind: "weight".to_string(),
                    geography: geography.to_string(),
                })?;
        table.add_integer_column(name, values)
    }

    fn incidence_table(&self) -> &IncidenceTable {
        &self.incidence
    }
}
