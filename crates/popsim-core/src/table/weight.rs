//! Household weight table.

use super::weight_table_name;
use crate::error::{Result, TableError};
use crate::zone::ZoneId;

/// Household weights at one geography, rows aligned with the incidence table.
///
/// Float columns come from the balancer and are never modified here.
/// Integer columns are appended by integerization.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightTable {
    geography: String,
    zones: Vec<ZoneId>,
    float_columns: Vec<(String, Vec<f64>)>,
    integer_columns: Vec<(String, Vec<u64>)>,
}

impl WeightTable {
    /// Creates a table whose rows belong to `zones` of `geography`.
    pub fn new(geography: impl Into<String>, zones: Vec<ZoneId>) -> Self {
        Self {
            geography: geography.into(),
            zones,
            float_columns: Vec::new(),
            integer_columns: Vec::new(),
        }
    }

    pub fn with_float_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.float_columns.retain(|(n, _)| *n != name);
        self.float_columns.push((name, values));
        Ok(self)
    }

    /// Appends (or replaces) an integer column.
    pub fn add_integer_column(&mut self, name: impl Into<String>, values: Vec<u64>) -> Result<()> {
        let name = name.into();
        self.check_len(&name, values.len())?;
        self.integer_columns.retain(|(n, _)| *n != name);
        self.integer_columns.push((name, values));
        Ok(())
    }

    fn check_len(&self, column: &str, actual: usize) -> Result<()> {
        if actual != self.zones.len() {
            return Err(TableError::LengthMismatch {
                context: format!("{} column '{}'", self.name(), column),
                expected: self.zones.len(),
                actual,
            });
        }
        Ok(())
    }

    pub fn geography(&self) -> &str {
        &self.geography
    }

    pub fn name(&self) -> String {
        weight_table_name(&self.geography)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone of each row at this table's geography.
    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }

    pub fn float_column(&self, name: &str) -> Result<&[f64]> {
        self.float_columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| self.missing(name))
    }

    pub fn integer_column(&self, name: &str) -> Result<&[u64]> {
        self.integer_columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .ok_or_else(|| self.missing(name))
    }

    fn missing(&self, column: &str) -> TableError {
        TableError::MissingColumn {
            table: self.name(),
            column: column.to_string(),
        }
    }
}
