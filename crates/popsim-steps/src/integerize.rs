//! Final seed integerization.
//!
//! Every seed zone's balanced weights are rounded independently and the
//! per-zone integer weights are scattered back into one `integer_weight`
//! column aligned with the incidence table.

use std::time::Instant;

use popsim_config::{FailurePolicy, Settings};
use popsim_core::{
    ControlSpec, ControlTable, IncidenceTable, TableError, WeightTable, BALANCED_WEIGHT,
    INTEGER_WEIGHT,
};
use popsim_integerizer::{Integerized, IntegerizerError};
use tracing::{error, info, warn};

use crate::dispatch::solve_zones;
use crate::error::{Result, StepError};
use crate::report::{IntegerizationReport, ZoneOutcome, ZoneReport};
use crate::work::{slice_zones, ZoneWork};

/// Result of [`integerize_final_seed_weights`].
#[derive(Debug, Clone, PartialEq)]
pub enum IntegerizationOutcome {
    /// Integerization is switched off in the settings.
    Skipped,
    /// Every zone was integerized; `weights` carries the new column.
    Complete {
        weights: WeightTable,
        report: IntegerizationReport,
    },
    /// Some zones failed under [`FailurePolicy::Report`]; no column was built.
    Partial { report: IntegerizationReport },
}

impl IntegerizationOutcome {
    pub fn report(&self) -> Option<&IntegerizationReport> {
        match self {
            IntegerizationOutcome::Skipped => None,
            IntegerizationOutcome::Complete { report, .. }
            | IntegerizationOutcome::Partial { report } => Some(report),
        }
    }
}

/// Integerizes the balanced weights of every seed zone.
///
/// `seed_controls` must be the factored seed control table, with columns
/// equal to the control spec targets.
///
/// # Errors
///
/// Structural mismatches between the tables are always fatal. Under
/// [`FailurePolicy::Abort`] the first failing zone, in zone order, is
/// returned as [`StepError::ZoneSolver`].
pub fn integerize_final_seed_weights(
    settings: &Settings,
    control_spec: &ControlSpec,
    seed_controls: &ControlTable,
    incidence: &IncidenceTable,
    seed_weights: &WeightTable,
) -> Result<IntegerizationOutcome> {
    if settings.no_integerization_ever {
        warn!(
            event = "integerization_skipped",
            step = "integerize_final_seed_weights",
        );
        return Ok(IntegerizationOutcome::Skipped);
    }

    let start = Instant::now();
    let seed_geography = settings.seed_geography.as_str();
    let targets = control_spec.targets();

    info!(
        event = "step_start",
        step = "integerize_final_seed_weights",
        seed_geography = seed_geography,
        targets = targets.len(),
        households = incidence.len(),
    );

    if !seed_controls.has_columns(&targets) {
        return Err(StepError::ColumnMismatch {
            table: seed_controls.name(),
            expected: targets,
            actual: seed_controls.columns().to_vec(),
        });
    }
    let total_hh_index = targets
        .iter()
        .position(|t| *t == settings.total_hh_control)
        .ok_or_else(|| TableError::MissingControlTarget {
            table: seed_controls.name(),
            target: settings.total_hh_control.clone(),
        })?;

    let balanced = seed_weights.float_column(BALANCED_WEIGHT)?;
    check_alignment(incidence, seed_weights, balanced, seed_geography)?;

    let work = slice_zones(
        settings,
        control_spec,
        seed_controls,
        incidence,
        balanced,
        total_hh_index,
    )?;
    let results = solve_zones(&work, &settings.integerizer)?;

    let mut integer_weights = vec![0u64; incidence.len()];
    let mut zones = Vec::with_capacity(work.len());
    for (zone_work, result) in work.iter().zip(results) {
        let outcome = match result {
            Ok(integerized) => {
                scatter(&mut integer_weights, zone_work, &integerized);
                ZoneOutcome::Integerized {
                    status: integerized.status,
                    score: integerized.score,
                    duration: integerized.statistics.duration,
                    total: integerized.total(),
                }
            }
            Err(source) => {
                error!(
                    event = "zone_failed",
                    zone = %zone_work.zone,
                    households = zone_work.household_count(),
                    balanced_weight_sum = zone_work.balanced_weight_sum,
                    anomalous_controls = ?zone_work.anomalous_controls,
                    error = %source,
                );
                if settings.integerizer.failure_policy == FailurePolicy::Abort {
                    return Err(zone_failure(zone_work, source));
                }
                ZoneOutcome::Failed {
                    message: source.to_string(),
                }
            }
        };
        zones.push(ZoneReport {
            zone: zone_work.zone,
            households: zone_work.household_count(),
            balanced_weight_sum: zone_work.balanced_weight_sum,
            cleaned_controls: zone_work.cleaned_controls.clone(),
            outcome,
        });
    }

    let report = IntegerizationReport::new(zones);
    let outcome = if report.is_complete() {
        let mut weights = seed_weights.clone();
        weights.add_integer_column(INTEGER_WEIGHT, integer_weights)?;
        IntegerizationOutcome::Complete { weights, report }
    } else {
        warn!(
            event = "integerization_partial",
            failed = report.failed().count(),
            succeeded = report.succeeded().count(),
        );
        IntegerizationOutcome::Partial { report }
    };

    if let Some(report) = outcome.report() {
        info!(
            event = "step_end",
            step = "integerize_final_seed_weights",
            zones = report.zones().len(),
            failed = report.failed().count(),
            timed_out = report.timed_out().count(),
            integer_total = report.integer_total(),
            duration_ms = start.elapsed().as_millis() as u64,
        );
    }
    Ok(outcome)
}

// The weight table must have one row per incidence row, in the same zones.
fn check_alignment(
    incidence: &IncidenceTable,
    seed_weights: &WeightTable,
    balanced: &[f64],
    seed_geography: &str,
) -> Result<()> {
    if balanced.len() != incidence.len() {
        return Err(StepError::RowMismatch {
            context: format!("{} {}", seed_weights.name(), BALANCED_WEIGHT),
            incidence_rows: incidence.len(),
            weight_rows: balanced.len(),
        });
    }

    let incidence_zones = incidence.zone_column(seed_geography)?;
    if let Some((row, (&incidence_zone, &weight_zone))) = incidence_zones
        .iter()
        .zip(seed_weights.zones())
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        return Err(StepError::MisalignedRow {
            row,
            incidence_zone,
            weight_zone,
        });
    }
    Ok(())
}

fn scatter(integer_weights: &mut [u64], work: &ZoneWork, integerized: &Integerized) {
    for (&row, &weight) in work.rows.iter().zip(&integerized.weights) {
        integer_weights[row] = weight;
    }
}

fn zone_failure(work: &ZoneWork, source: IntegerizerError) -> StepError {
    StepError::ZoneSolver {
        zone: work.zone,
        household_count: work.household_count(),
        balanced_weight_sum: work.balanced_weight_sum,
        anomalous_controls: work.anomalous_controls.clone(),
        source,
    }
}

#[cfg(test)]
#[path = "integerize_tests.rs"]
mod tests;
