//! Control specification.
//!
//! The control spec is the ordered list of control targets a synthesis run
//! must satisfy. Its target order is authoritative: every control table at
//! the seed level ends up with exactly these columns, in this order.

use std::collections::HashSet;

use crate::error::{Result, TableError};

/// Importance used when a spec row does not set one.
pub const DEFAULT_IMPORTANCE: f64 = 1.0;

/// One row of the control spec.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlSpecRow {
    /// Control name, also the column name in control and incidence tables.
    pub target: String,
    /// Geography the control totals are defined at.
    pub geography: String,
    /// Predicate resolved upstream into the incidence table.
    #[cfg_attr(feature = "serde", serde(default))]
    pub expression: String,
    /// Relative weight of this control's deviation during integerization.
    #[cfg_attr(feature = "serde", serde(default = "default_importance"))]
    pub importance: f64,
    /// Seed table the expression is evaluated against (households/persons).
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed_table: Option<String>,
}

#[cfg(feature = "serde")]
fn default_importance() -> f64 {
    DEFAULT_IMPORTANCE
}

impl ControlSpecRow {
    pub fn new(target: impl Into<String>, geography: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            geography: geography.into(),
            expression: String::new(),
            importance: DEFAULT_IMPORTANCE,
            seed_table: None,
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }

    pub fn with_seed_table(mut self, seed_table: impl Into<String>) -> Self {
        self.seed_table = Some(seed_table.into());
        self
    }
}

/// Ordered, duplicate-free list of control targets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlSpec {
    rows: Vec<ControlSpecRow>,
}

impl ControlSpec {
    /// Builds a control spec, rejecting duplicate target names.
    pub fn new(rows: Vec<ControlSpecRow>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.target.as_str()) {
                return Err(TableError::DuplicateTarget(row.target.clone()));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[ControlSpecRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All targets in spec order.
    pub fn targets(&self) -> Vec<String> {
        self.rows.iter().map(|r| r.target.clone()).collect()
    }

    /// Targets defined at `geography`, in spec order.
    pub fn targets_for(&self, geography: &str) -> Vec<String> {
        self.rows
            .iter()
            .filter(|r| r.geography == geography)
            .map(|r| r.target.clone())
            .collect()
    }

    /// Returns true if any control is defined at `geography`.
    pub fn has_geography(&self, geography: &str) -> bool {
        self.rows.iter().any(|r| r.geography == geography)
    }

    pub fn row(&self, target: &str) -> Option<&ControlSpecRow> {
        self.rows.iter().find(|r| r.target == target)
    }

    /// Importance of `target`, or the default when the target is unknown.
    pub fn importance(&self, target: &str) -> f64 {
        self.row(target)
            .map(|r| r.importance)
            .unwrap_or(DEFAULT_IMPORTANCE)
    }

    /// Position of `target` in spec order.
    pub fn position(&self, target: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.target == target)
    }
}
