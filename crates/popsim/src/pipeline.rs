//! Runs both synthesis steps against a table store.

use std::path::Path;
use std::time::Instant;

use popsim_config::{ConfigError, Settings};
use popsim_core::{ControlSpec, ControlTable, TableStore, INTEGER_WEIGHT};
use popsim_steps::{
    integerize_final_seed_weights, meta_control_factoring, FactoringDiagnostic,
    IntegerizationOutcome, IntegerizationReport, StepError,
};
use tracing::info;

/// What a [`Pipeline`] run did.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub diagnostics: Vec<FactoringDiagnostic>,
    /// `None` when integerization is switched off.
    pub integerization: Option<IntegerizationReport>,
    /// Whether `integer_weight` was written to the seed weight table.
    pub integer_weights_written: bool,
}

impl PipelineReport {
    /// Returns true if every seed zone received integer weights.
    pub fn is_complete(&self) -> bool {
        self.integer_weights_written
    }
}

/// Meta-control factoring followed by final seed integerization.
///
/// # Example
///
/// ```
/// use popsim::prelude::*;
///
/// let settings = Settings::new(vec!["COUNTY".into(), "PUMA".into()], "PUMA", "num_hh");
/// let spec = ControlSpec::new(vec![
///     ControlSpecRow::new("num_hh", "PUMA"),
///     ControlSpecRow::new("county_hh", "COUNTY"),
/// ])
/// .unwrap();
///
/// let pipeline = Pipeline::new(settings, spec);
/// assert_eq!(pipeline.settings().seed_geography, "PUMA");
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: Settings,
    control_spec: ControlSpec,
}

impl Pipeline {
    pub fn new(settings: Settings, control_spec: ControlSpec) -> Self {
        Self {
            settings,
            control_spec,
        }
    }

    /// Loads settings from a YAML or TOML file.
    pub fn load(path: impl AsRef<Path>, control_spec: ControlSpec) -> Result<Self, ConfigError> {
        Ok(Self::new(Settings::load(path)?, control_spec))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn control_spec(&self) -> &ControlSpec {
        &self.control_spec
    }

    /// Runs both steps.
    ///
    /// The factored seed control table replaces the stored one. The
    /// `integer_weight` column is added to the seed weight table only when
    /// every zone was integerized.
    pub fn run<S: TableStore>(&self, store: &mut S) -> Result<PipelineReport, StepError> {
        let start = Instant::now();
        self.settings.validate()?;
        let seed_geography = self.settings.seed_geography.as_str();

        info!(
            event = "pipeline_start",
            seed_geography = seed_geography,
            targets = self.control_spec.len(),
            households = store.incidence_table().len(),
        );

        let factoring = {
            // Without meta targets factoring never reads the meta table.
            let no_meta;
            let meta_controls = match self.settings.meta_geography() {
                Some(meta)
                    if self.settings.has_meta_level() && self.control_spec.has_geography(meta) =>
                {
                    store.control_table(meta)?
                }
                _ => {
                    no_meta = ControlTable::new(seed_geography, Vec::new());
                    &no_meta
                }
            };
            meta_control_factoring(
                &self.settings,
                &self.control_spec,
                meta_controls,
                store.control_table(seed_geography)?,
                store.incidence_table(),
                store.weight_table(seed_geography)?,
            )?
        };
        store.replace_control_table(factoring.seed_controls);

        let outcome = integerize_final_seed_weights(
            &self.settings,
            &self.control_spec,
            store.control_table(seed_geography)?,
            store.incidence_table(),
            store.weight_table(seed_geography)?,
        )?;

        let (integerization, integer_weights_written) = match outcome {
            IntegerizationOutcome::Skipped => (None, false),
            IntegerizationOutcome::Complete { weights, report } => {
                let integer = weights.integer_column(INTEGER_WEIGHT)?.to_vec();
                store.add_weight_column(seed_geography, INTEGER_WEIGHT, integer)?;
                (Some(report), true)
            }
            IntegerizationOutcome::Partial { report } => (Some(report), false),
        };

        info!(
            event = "pipeline_end",
            diagnostics = factoring.diagnostics.len(),
            integerized = integerization.is_some(),
            complete = integer_weights_written,
            integer_total = integerization.as_ref().map_or(0, |r| r.integer_total()),
            duration_ms = start.elapsed().as_millis() as u64,
        );

        Ok(PipelineReport {
            diagnostics: factoring.diagnostics,
            integerization,
            integer_weights_written,
        })
    }
}
