//! Zone-indexed control totals.

use std::collections::btree_map::{self, BTreeMap};

use super::control_table_name;
use crate::error::{Result, TableError};
use crate::zone::ZoneId;

/// Control totals for every zone of one geography.
///
/// Columns are ordered; values are `f64` and may be NaN on input. Zones are
/// kept in ascending id order.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlTable {
    geography: String,
    columns: Vec<String>,
    rows: BTreeMap<ZoneId, Vec<f64>>,
}

impl ControlTable {
    /// Creates an empty table with the given columns.
    pub fn new(geography: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            geography: geography.into(),
            columns,
            rows: BTreeMap::new(),
        }
    }

    /// Adds one zone's control values, in column order.
    pub fn insert_zone(&mut self, zone: ZoneId, values: Vec<f64>) -> Result<()> {
        if values.len() != self.columns.len() {
            return Err(TableError::LengthMismatch {
                context: format!("{} zone {}", self.name(), zone),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        match self.rows.entry(zone) {
            btree_map::Entry::Occupied(_) => Err(TableError::DuplicateZone {
                geography: self.geography.clone(),
                zone,
            }),
            btree_map::Entry::Vacant(slot) => {
                slot.insert(values);
                Ok(())
            }
        }
    }

    /// Builder form of [`insert_zone`](Self::insert_zone).
    pub fn with_zone(mut self, zone: ZoneId, values: Vec<f64>) -> Result<Self> {
        self.insert_zone(zone, values)?;
        Ok(self)
    }

    pub fn geography(&self) -> &str {
        &self.geography
    }

    /// Table name used in diagnostics.
    pub fn name(&self) -> String {
        control_table_name(&self.geography)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Zones in ascending order.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.rows.keys().copied()
    }

    pub fn zone_count(&self) -> usize {
        self.rows.len()
    }

    pub fn contains_zone(&self, zone: ZoneId) -> bool {
        self.rows.contains_key(&zone)
    }

    /// Position of `target` among the columns.
    pub fn column_index(&self, target: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == target)
            .ok_or_else(|| TableError::MissingControlTarget {
                table: self.name(),
                target: target.to_string(),
            })
    }

    /// All values of one zone, in column order.
    pub fn row(&self, zone: ZoneId) -> Result<&[f64]> {
        self.rows
            .get(&zone)
            .map(Vec::as_slice)
            .ok_or_else(|| TableError::MissingZone {
                table: self.name(),
                geography: self.geography.clone(),
                zone,
            })
    }

    pub fn get(&self, zone: ZoneId, target: &str) -> Result<f64> {
        let idx = self.column_index(target)?;
        Ok(self.row(zone)?[idx])
    }

    /// One column as `(zone, value)` pairs in zone order.
    pub fn column(&self, target: &str) -> Result<Vec<(ZoneId, f64)>> {
        let idx = self.column_index(target)?;
        Ok(self
            .rows
            .iter()
            .map(|(zone, values)| (*zone, values[idx]))
            .collect())
    }

    /// Returns true if the columns are exactly `targets`, in order.
    pub fn has_columns(&self, targets: &[String]) -> bool {
        self.columns.as_slice() == targets
    }

    /// Concatenates `other`'s columns after this table's columns.
    ///
    /// Both tables must cover the same zones.
    pub fn append_columns(&self, other: &ControlTable) -> Result<ControlTable> {
        if !self.rows.keys().eq(other.rows.keys()) {
            return Err(TableError::ZoneSetMismatch {
                geography: self.geography.clone(),
                detail: format!(
                    "{} has {} zones, appended columns cover {}",
                    self.name(),
                    self.rows.len(),
                    other.rows.len()
                ),
            });
        }

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let rows = self
            .rows
            .iter()
            .zip(other.rows.values())
            .map(|((zone, left), right)| {
                let mut values = left.clone();
                values.extend_from_slice(right);
                (*zone, values)
            })
            .collect();

        Ok(ControlTable {
            geography: self.geography.clone(),
            columns,
            rows,
        })
    }

    /// Projects and reorders the table to exactly `targets`.
    pub fn select(&self, targets: &[String]) -> Result<ControlTable> {
        let indices = targets
            .iter()
            .map(|t| self.column_index(t))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|(zone, values)| (*zone, indices.iter().map(|&i| values[i]).collect()))
            .collect();

        Ok(ControlTable {
            geography: self.geography.clone(),
            columns: targets.to_vec(),
            rows,
        })
    }

    /// Number of NaN values in each column, for columns that have any.
    pub fn nan_counts(&self) -> Vec<(String, usize)> {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                let count = self.rows.values().filter(|v| v[idx].is_nan()).count();
                (count > 0).then(|| (name.clone(), count))
            })
            .collect()
    }
}
