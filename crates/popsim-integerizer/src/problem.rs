//! Per-zone integerization problem.

use crate::error::IntegerizerError;

/// One control the integer weights should reproduce.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlTarget {
    pub name: String,
    /// Desired weighted incidence total (already cleaned of NaN).
    pub value: f64,
    /// Relative weight of a miss on this control.
    pub importance: f64,
}

impl ControlTarget {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            importance: 1.0,
        }
    }

    pub fn with_importance(mut self, importance: f64) -> Self {
        self.importance = importance;
        self
    }
}

/// Everything needed to integerize the households of one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerizeProblem {
    /// Trace label, e.g. `PUMA_11301`.
    pub label: String,
    pub targets: Vec<ControlTarget>,
    /// Row-major incidence, one row per household, one value per target.
    pub incidence: Vec<Vec<f64>>,
    pub float_weights: Vec<f64>,
    /// Index into `targets` of the total-household control.
    pub total_hh_index: usize,
}

impl IntegerizeProblem {
    pub fn household_count(&self) -> usize {
        self.float_weights.len()
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// The total-household control.
    pub fn total_hh(&self) -> &ControlTarget {
        &self.targets[self.total_hh_index]
    }

    /// Rejects input that would make rounding meaningless.
    pub fn validate(&self) -> Result<(), IntegerizerError> {
        if self.incidence.len() != self.float_weights.len() {
            return Err(IntegerizerError::LengthMismatch {
                context: format!("{} incidence rows vs float weights", self.label),
                expected: self.float_weights.len(),
                actual: self.incidence.len(),
            });
        }

        if self.total_hh_index >= self.targets.len() {
            return Err(IntegerizerError::InvalidTotal {
                target: format!("#{}", self.total_hh_index),
                reason: format!("index out of range for {} targets", self.targets.len()),
            });
        }

        for target in &self.targets {
            if !target.value.is_finite() {
                return Err(IntegerizerError::NonFiniteControl {
                    target: target.name.clone(),
                    value: target.value,
                });
            }
        }

        let total = self.total_hh();
        if total.value < 0.0 {
            return Err(IntegerizerError::InvalidTotal {
                target: total.name.clone(),
                reason: format!("negative total {}", total.value),
            });
        }

        for (row, &weight) in self.float_weights.iter().enumerate() {
            if !weight.is_finite() {
                return Err(IntegerizerError::NonFiniteWeight { row, value: weight });
            }
            if weight < 0.0 {
                return Err(IntegerizerError::NegativeWeight { row, value: weight });
            }
        }

        for (row, values) in self.incidence.iter().enumerate() {
            if values.len() != self.targets.len() {
                return Err(IntegerizerError::LengthMismatch {
                    context: format!("{} incidence row {}", self.label, row),
                    expected: self.targets.len(),
                    actual: values.len(),
                });
            }
            for (target, &value) in self.targets.iter().zip(values) {
                if !value.is_finite() || value < 0.0 {
                    return Err(IntegerizerError::InvalidIncidence {
                        row,
                        target: target.name.clone(),
                        value,
                    });
                }
            }
        }

        Ok(())
    }
}
