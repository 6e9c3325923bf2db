//! Meta-control factoring.
//!
//! Meta-level control totals are redistributed to the seed zones inside each
//! meta zone in proportion to the seed's share of the meta zone's weighted
//! incidence, and appended to the seed control table as pseudo-controls.

use std::collections::BTreeMap;
use std::time::Instant;

use popsim_config::Settings;
use popsim_core::{
    ControlSpec, ControlTable, IncidenceTable, WeightTable, ZoneId, PRELIMINARY_BALANCED_WEIGHT,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StepError};

/// Why a meta zone has no well-defined scaling factor for a control.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UndefinedFactor {
    /// No household in the meta zone carries weighted incidence for the control.
    #[error("factored meta weight is zero (meta control {meta_control})")]
    ZeroWeight { meta_control: f64 },

    /// The meta control or the factored weight is NaN or infinite.
    #[error("meta control {meta_control} over factored weight {factored_weight} is not finite")]
    NonFinite {
        meta_control: f64,
        factored_weight: f64,
    },
}

/// `meta_control / factored_weight`, or why it is undefined.
pub fn scaling_factor(
    meta_control: f64,
    factored_weight: f64,
) -> std::result::Result<f64, UndefinedFactor> {
    if !meta_control.is_finite() || !factored_weight.is_finite() {
        return Err(UndefinedFactor::NonFinite {
            meta_control,
            factored_weight,
        });
    }
    if factored_weight == 0.0 {
        return Err(UndefinedFactor::ZeroWeight { meta_control });
    }
    Ok(meta_control / factored_weight)
}

/// A recoverable anomaly met while factoring.
#[derive(Debug, Clone, PartialEq)]
pub enum FactoringDiagnostic {
    /// The factor was defined as 0 because the meta zone has no weighted
    /// incidence for `target`.
    ZeroWeight {
        meta_zone: ZoneId,
        target: String,
        meta_control: f64,
    },
    /// A meta zone in the control table has no households.
    UnrepresentedZone { meta_zone: ZoneId },
}

impl FactoringDiagnostic {
    /// True when a positive meta control can never be met by the sample.
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, FactoringDiagnostic::ZeroWeight { meta_control, .. } if *meta_control > 0.0)
    }
}

/// Result of [`meta_control_factoring`].
#[derive(Debug, Clone, PartialEq)]
pub struct FactoringOutcome {
    /// Seed controls with the factored meta columns, in control spec order.
    pub seed_controls: ControlTable,
    /// The factored meta columns alone.
    pub seed_meta_controls: ControlTable,
    pub diagnostics: Vec<FactoringDiagnostic>,
}

// Weighted incidence of one seed zone for every meta target.
struct FactoredSeed {
    zone: ZoneId,
    weights: Vec<f64>,
}

/// Factors meta-level controls down to seed zones.
///
/// Does not write anything back; the caller decides whether to replace the
/// seed control table with `seed_controls`.
///
/// # Errors
///
/// - [`StepError::RowMismatch`] when weights and incidence differ in length.
/// - [`StepError::GeographyNotNested`] when a seed spans two meta zones.
/// - `TableError::MissingZone` when a meta zone with households has no controls.
/// - [`StepError::NonIntegerCast`] when a factored control is NaN or infinite.
/// - [`StepError::ColumnMismatch`] when the result does not match the spec targets.
pub fn meta_control_factoring(
    settings: &Settings,
    control_spec: &ControlSpec,
    meta_controls: &ControlTable,
    seed_controls: &ControlTable,
    incidence: &IncidenceTable,
    seed_weights: &WeightTable,
) -> Result<FactoringOutcome> {
    let start = Instant::now();
    let seed_geography = settings.seed_geography.as_str();
    let targets = control_spec.targets();

    let meta_geography = match settings.meta_geography() {
        Some(meta) if meta != seed_geography && control_spec.has_geography(meta) => meta,
        _ => {
            warn!(
                event = "no_meta_controls",
                step = "meta_control_factoring",
                seed_geography = seed_geography,
            );
            return Ok(FactoringOutcome {
                seed_controls: seed_controls.select(&targets)?,
                seed_meta_controls: ControlTable::new(seed_geography, Vec::new()),
                diagnostics: Vec::new(),
            });
        }
    };
    let meta_targets = control_spec.targets_for(meta_geography);

    info!(
        event = "step_start",
        step = "meta_control_factoring",
        meta_geography = meta_geography,
        seed_geography = seed_geography,
        meta_targets = meta_targets.len(),
    );

    let weights = seed_weights.float_column(PRELIMINARY_BALANCED_WEIGHT)?;
    if weights.len() != incidence.len() {
        return Err(StepError::RowMismatch {
            context: format!("{} {}", seed_weights.name(), PRELIMINARY_BALANCED_WEIGHT),
            incidence_rows: incidence.len(),
            weight_rows: weights.len(),
        });
    }

    let by_meta = factor_seeds(
        incidence,
        weights,
        seed_geography,
        meta_geography,
        &meta_targets,
    )?;
    let meta_table = meta_controls.select(&meta_targets)?;

    let mut diagnostics = Vec::new();
    for meta_zone in meta_table.zones().filter(|z| !by_meta.contains_key(z)) {
        warn!(
            event = "unrepresented_zone",
            geography = meta_geography,
            zone = %meta_zone,
        );
        diagnostics.push(FactoringDiagnostic::UnrepresentedZone { meta_zone });
    }

    let mut seed_meta = ControlTable::new(seed_geography, meta_targets.clone());
    for (&meta_zone, seeds) in &by_meta {
        let meta_row = meta_table.row(meta_zone)?;

        let mut factors = Vec::with_capacity(meta_targets.len());
        for (t, target) in meta_targets.iter().enumerate() {
            let factored_meta: f64 = seeds.iter().map(|s| s.weights[t]).sum();
            let factor = match scaling_factor(meta_row[t], factored_meta) {
                Ok(factor) => Some(factor),
                Err(UndefinedFactor::ZeroWeight { meta_control }) => {
                    warn!(
                        event = "zero_factored_weight",
                        zone = %meta_zone,
                        target = %target,
                        meta_control = meta_control,
                        unsatisfiable = meta_control > 0.0,
                    );
                    diagnostics.push(FactoringDiagnostic::ZeroWeight {
                        meta_zone,
                        target: target.clone(),
                        meta_control,
                    });
                    Some(0.0)
                }
                Err(undefined @ UndefinedFactor::NonFinite { .. }) => {
                    error!(
                        event = "undefined_scaling_factor",
                        zone = %meta_zone,
                        target = %target,
                        reason = %undefined,
                    );
                    None
                }
            };
            factors.push(factor);
        }

        let single_seed = seeds.len() == 1;
        for seed in seeds {
            let mut values = Vec::with_capacity(meta_targets.len());
            for (t, target) in meta_targets.iter().enumerate() {
                let value = match factors[t] {
                    Some(factor) if factor != 0.0 && single_seed => meta_row[t],
                    Some(factor) => seed.weights[t] * factor,
                    None => f64::NAN,
                };
                let rounded = round_control(value).ok_or_else(|| {
                    let err = StepError::NonIntegerCast {
                        target: target.clone(),
                        zone: seed.zone,
                        value,
                        factored_seed_weight: seed.weights[t],
                        scaling_factor: factors[t].unwrap_or(f64::NAN),
                        meta_control: meta_row[t],
                    };
                    error!(event = "non_integer_cast", error = %err);
                    err
                })?;
                values.push(rounded);
            }
            seed_meta.insert_zone(seed.zone, values)?;
        }

        debug!(
            event = "meta_zone_factored",
            zone = %meta_zone,
            seeds = seeds.len(),
        );
    }

    let seed_controls = combine(seed_controls, &seed_meta, &meta_targets, &targets)?;

    info!(
        event = "step_end",
        step = "meta_control_factoring",
        seed_zones = seed_controls.zone_count(),
        diagnostics = diagnostics.len(),
        duration_ms = start.elapsed().as_millis() as u64,
    );

    Ok(FactoringOutcome {
        seed_controls,
        seed_meta_controls: seed_meta,
        diagnostics,
    })
}

/// Rounds a control to the nearest integer, ties to even.
pub fn round_control(value: f64) -> Option<f64> {
    value.is_finite().then(|| value.round_ties_even())
}

// Sums incidence × weight per seed zone and groups the seeds by meta zone.
fn factor_seeds(
    incidence: &IncidenceTable,
    weights: &[f64],
    seed_geography: &str,
    meta_geography: &str,
    meta_targets: &[String],
) -> Result<BTreeMap<ZoneId, Vec<FactoredSeed>>> {
    let meta_column = incidence.zone_column(meta_geography)?;
    let columns = meta_targets
        .iter()
        .map(|t| incidence.incidence(t))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut by_meta: BTreeMap<ZoneId, Vec<FactoredSeed>> = BTreeMap::new();
    for (seed, rows) in incidence.rows_by_zone(seed_geography)? {
        let meta = meta_column[rows[0]];
        if let Some(&row) = rows.iter().find(|&&r| meta_column[r] != meta) {
            return Err(StepError::GeographyNotNested {
                seed_geography: seed_geography.to_string(),
                seed,
                meta_geography: meta_geography.to_string(),
                first: meta,
                second: meta_column[row],
            });
        }

        let factored = columns
            .iter()
            .map(|column| rows.iter().map(|&r| column[r] * weights[r]).sum())
            .collect();
        by_meta.entry(meta).or_default().push(FactoredSeed {
            zone: seed,
            weights: factored,
        });
    }
    Ok(by_meta)
}

// Replaces any earlier meta columns, appends the new ones and reorders to the
// spec targets.
fn combine(
    seed_controls: &ControlTable,
    seed_meta: &ControlTable,
    meta_targets: &[String],
    targets: &[String],
) -> Result<ControlTable> {
    let base_columns: Vec<String> = seed_controls
        .columns()
        .iter()
        .filter(|c| !meta_targets.contains(c))
        .cloned()
        .collect();
    let combined = seed_controls
        .select(&base_columns)?
        .append_columns(seed_meta)?;

    if combined.columns().len() != targets.len()
        || combined.columns().iter().any(|c| !targets.contains(c))
    {
        return Err(StepError::ColumnMismatch {
            table: combined.name(),
            expected: targets.to_vec(),
            actual: combined.columns().to_vec(),
        });
    }
    Ok(combined.select(targets)?)
}

#[cfg(test)]
#[path = "factoring_tests.rs"]
mod tests;
