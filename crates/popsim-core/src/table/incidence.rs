//! Household incidence table.

use std::collections::BTreeMap;

use crate::error::{Result, TableError};
use crate::zone::ZoneId;

const TABLE_NAME: &str = "incidence_table";

/// One row per household: the zone it belongs to at each geography, and its
/// incidence (0/1 or a person count) for each control target.
///
/// Stored column-major. Read-only for both synthesis steps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IncidenceTable {
    len: usize,
    zone_columns: Vec<(String, Vec<ZoneId>)>,
    targets: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl IncidenceTable {
    /// Creates an empty table for `len` households.
    pub fn new(len: usize) -> Self {
        Self {
            len,
            ..Self::default()
        }
    }

    /// Adds the zone-id column for `geography`.
    pub fn with_zone_column(
        mut self,
        geography: impl Into<String>,
        zones: Vec<ZoneId>,
    ) -> Result<Self> {
        let geography = geography.into();
        self.check_len(&geography, zones.len())?;
        self.zone_columns.retain(|(g, _)| *g != geography);
        self.zone_columns.push((geography, zones));
        Ok(self)
    }

    /// Adds the incidence column for `target`.
    pub fn with_incidence(mut self, target: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let target = target.into();
        self.check_len(&target, values.len())?;
        if let Some(idx) = self.targets.iter().position(|t| *t == target) {
            self.values[idx] = values;
        } else {
            self.targets.push(target);
            self.values.push(values);
        }
        Ok(self)
    }

    fn check_len(&self, column: &str, actual: usize) -> Result<()> {
        if actual != self.len {
            return Err(TableError::LengthMismatch {
                context: format!("{} column '{}'", TABLE_NAME, column),
                expected: self.len,
                actual,
            });
        }
        Ok(())
    }

    /// Number of household rows.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn zone_column(&self, geography: &str) -> Result<&[ZoneId]> {
        self.zone_columns
            .iter()
            .find(|(g, _)| g == geography)
            .map(|(_, zones)| zones.as_slice())
            .ok_or_else(|| TableError::MissingColumn {
                table: TABLE_NAME.to_string(),
                column: geography.to_string(),
            })
    }

    pub fn incidence(&self, target: &str) -> Result<&[f64]> {
        self.targets
            .iter()
            .position(|t| t == target)
            .map(|idx| self.values[idx].as_slice())
            .ok_or_else(|| TableError::MissingControlTarget {
                table: TABLE_NAME.to_string(),
                target: target.to_string(),
            })
    }

    /// Distinct zones of `geography`, ascending.
    pub fn zones(&self, geography: &str) -> Result<Vec<ZoneId>> {
        let mut zones = self.zone_column(geography)?.to_vec();
        zones.sort_unstable();
        zones.dedup();
        Ok(zones)
    }

    /// Row indices of each zone of `geography`, in original row order.
    pub fn rows_by_zone(&self, geography: &str) -> Result<BTreeMap<ZoneId, Vec<usize>>> {
        let mut groups: BTreeMap<ZoneId, Vec<usize>> = BTreeMap::new();
        for (row, zone) in self.zone_column(geography)?.iter().enumerate() {
            groups.entry(*zone).or_default().push(row);
        }
        Ok(groups)
    }

    /// Row-major incidence matrix for `rows`, one value per target.
    pub fn slice_rows(&self, rows: &[usize], targets: &[String]) -> Result<Vec<Vec<f64>>> {
        let columns = targets
            .iter()
            .map(|t| self.incidence(t))
            .collect::<Result<Vec<_>>>()?;

        rows.iter()
            .map(|&row| {
                if row >= self.len {
                    return Err(TableError::LengthMismatch {
                        context: format!("{} row {}", TABLE_NAME, row),
                        expected: self.len,
                        actual: row + 1,
                    });
                }
                Ok(columns.iter().map(|col| col[row]).collect())
            })
            .collect()
    }
}
