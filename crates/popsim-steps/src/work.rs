//! Per-zone work items.
//!
//! Each seed zone is sliced out of the global tables into an owned
//! [`ZoneWork`], so zones can be solved independently and in any order.

use popsim_config::Settings;
use popsim_core::{ControlSpec, ControlTable, IncidenceTable, ZoneId};
use popsim_integerizer::{ControlTarget, IntegerizeProblem};
use tracing::{debug, warn};

use crate::clean::{clean_controls, CleanedControl};
use crate::error::{Result, StepError};

/// Everything needed to integerize one seed zone.
#[derive(Debug, Clone)]
pub struct ZoneWork {
    pub zone: ZoneId,
    /// Incidence-table rows of the zone's households, in original order.
    pub rows: Vec<usize>,
    pub problem: IntegerizeProblem,
    pub cleaned_controls: Vec<CleanedControl>,
    /// Control values that are NaN, infinite or fractional before cleaning.
    pub anomalous_controls: Vec<(String, f64)>,
    pub balanced_weight_sum: f64,
}

impl ZoneWork {
    pub fn household_count(&self) -> usize {
        self.rows.len()
    }
}

/// Slices the seed tables into one [`ZoneWork`] per seed zone with
/// households, in ascending zone order.
///
/// `balanced` must already be checked to have one weight per incidence row.
pub fn slice_zones(
    settings: &Settings,
    control_spec: &ControlSpec,
    seed_controls: &ControlTable,
    incidence: &IncidenceTable,
    balanced: &[f64],
    total_hh_index: usize,
) -> Result<Vec<ZoneWork>> {
    let seed_geography = settings.seed_geography.as_str();
    let targets = seed_controls.columns();
    let rows_by_zone = incidence.rows_by_zone(seed_geography)?;

    for zone in seed_controls.zones().filter(|z| !rows_by_zone.contains_key(z)) {
        warn!(
            event = "unrepresented_zone",
            geography = seed_geography,
            zone = %zone,
        );
    }

    let mut work = Vec::with_capacity(rows_by_zone.len());
    for (zone, rows) in rows_by_zone {
        let raw_controls = seed_controls.row(zone)?;
        let zone_incidence = incidence.slice_rows(&rows, targets)?;
        let float_weights: Vec<f64> = rows.iter().map(|&r| balanced[r]).collect();
        if zone_incidence.len() != float_weights.len() {
            return Err(StepError::RowMismatch {
                context: format!("{} zone {}", seed_geography, zone),
                incidence_rows: zone_incidence.len(),
                weight_rows: float_weights.len(),
            });
        }

        let anomalous_controls = targets
            .iter()
            .zip(raw_controls)
            .filter(|(_, v)| !v.is_finite() || v.fract() != 0.0)
            .map(|(t, &v)| (t.clone(), v))
            .collect();
        let (controls, cleaned_controls) = clean_controls(
            zone,
            targets,
            raw_controls,
            &zone_incidence,
            settings.integerizer.strict_control_cleaning,
        )?;

        let balanced_weight_sum = float_weights.iter().sum();
        debug!(
            event = "zone_sliced",
            zone = %zone,
            households = rows.len(),
            balanced_weight_sum = balanced_weight_sum,
        );

        let problem = IntegerizeProblem {
            label: format!("{}_{}", seed_geography, zone),
            targets: targets
                .iter()
                .zip(controls)
                .map(|(t, v)| {
                    ControlTarget::new(t.clone(), v).with_importance(control_spec.importance(t))
                })
                .collect(),
            incidence: zone_incidence,
            float_weights,
            total_hh_index,
        };

        work.push(ZoneWork {
            zone,
            rows,
            problem,
            cleaned_controls,
            anomalous_controls,
            balanced_weight_sum,
        });
    }
    Ok(work)
}
