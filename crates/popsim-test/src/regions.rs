//! Hand-built regions.
//!
//! # Example
//!
//! ```
//! use popsim_test::regions::RegionBuilder;
//!
//! let region = RegionBuilder::new(&["num_hh"], &["county_hh"])
//!     .household(1, 100, 2.0, &[1.0, 1.0])
//!     .household(1, 100, 3.0, &[1.0, 1.0])
//!     .seed_control(100, &[5.0])
//!     .meta_control(1, &[5.0])
//!     .build();
//! assert_eq!(region.incidence.len(), 2);
//! ```

use std::collections::BTreeMap;

use popsim_config::Settings;
use popsim_core::{
    ControlSpec, ControlSpecRow, ControlTable, InMemoryTables, IncidenceTable, WeightTable, ZoneId,
    BALANCED_WEIGHT, PRELIMINARY_BALANCED_WEIGHT,
};

/// Meta geography of every fixture region.
pub const META: &str = "COUNTY";

/// Seed geography of every fixture region.
pub const SEED: &str = "PUMA";

/// Total-household control of every fixture region.
pub const TOTAL_HH: &str = "num_hh";

/// All inputs of both synthesis steps for one region.
#[derive(Debug, Clone)]
pub struct Region {
    pub settings: Settings,
    pub control_spec: ControlSpec,
    pub meta_controls: ControlTable,
    pub seed_controls: ControlTable,
    pub incidence: IncidenceTable,
    pub seed_weights: WeightTable,
}

impl Region {
    /// Moves the tables into a store.
    pub fn into_store(self) -> InMemoryTables {
        InMemoryTables::new(self.incidence)
            .with_control_table(self.meta_controls)
            .with_control_table(self.seed_controls)
            .with_weight_table(self.seed_weights)
    }
}

#[derive(Debug, Clone)]
struct HouseholdRow {
    meta: u64,
    seed: u64,
    preliminary: f64,
    balanced: f64,
    incidence: Vec<f64>,
}

/// Builds a [`Region`] household by household.
///
/// Incidence values are given seed targets first, then meta targets.
#[derive(Debug, Clone)]
pub struct RegionBuilder {
    seed_targets: Vec<String>,
    meta_targets: Vec<String>,
    spec_order: Option<Vec<String>>,
    households: Vec<HouseholdRow>,
    seed_controls: BTreeMap<u64, Vec<f64>>,
    meta_controls: BTreeMap<u64, Vec<f64>>,
    settings: Settings,
}

impl RegionBuilder {
    pub fn new(seed_targets: &[&str], meta_targets: &[&str]) -> Self {
        Self {
            seed_targets: seed_targets.iter().map(|t| t.to_string()).collect(),
            meta_targets: meta_targets.iter().map(|t| t.to_string()).collect(),
            spec_order: None,
            households: Vec::new(),
            seed_controls: BTreeMap::new(),
            meta_controls: BTreeMap::new(),
            settings: Settings::new(vec![META.to_string(), SEED.to_string()], SEED, TOTAL_HH),
        }
    }

    /// Adds a household whose preliminary and balanced weights are equal.
    pub fn household(self, meta: u64, seed: u64, weight: f64, incidence: &[f64]) -> Self {
        self.household_with_weights(meta, seed, weight, weight, incidence)
    }

    pub fn household_with_weights(
        mut self,
        meta: u64,
        seed: u64,
        preliminary: f64,
        balanced: f64,
        incidence: &[f64],
    ) -> Self {
        assert_eq!(
            incidence.len(),
            self.seed_targets.len() + self.meta_targets.len(),
            "one incidence value per target"
        );
        self.households.push(HouseholdRow {
            meta,
            seed,
            preliminary,
            balanced,
            incidence: incidence.to_vec(),
        });
        self
    }

    pub fn seed_control(mut self, seed: u64, values: &[f64]) -> Self {
        self.seed_controls.insert(seed, values.to_vec());
        self
    }

    pub fn meta_control(mut self, meta: u64, values: &[f64]) -> Self {
        self.meta_controls.insert(meta, values.to_vec());
        self
    }

    /// Orders the control spec rows; defaults to seed targets then meta targets.
    pub fn spec_order(mut self, targets: &[&str]) -> Self {
        self.spec_order = Some(targets.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> Region {
        let all_targets: Vec<String> = self
            .seed_targets
            .iter()
            .chain(&self.meta_targets)
            .cloned()
            .collect();
        let order = self.spec_order.clone().unwrap_or_else(|| all_targets.clone());

        let rows = order
            .iter()
            .map(|target| {
                let geography = if self.meta_targets.contains(target) {
                    META
                } else {
                    SEED
                };
                ControlSpecRow::new(target.clone(), geography)
            })
            .collect();
        let control_spec = ControlSpec::new(rows).expect("fixture control spec");

        let mut meta_controls = ControlTable::new(META, self.meta_targets.clone());
        for (zone, values) in &self.meta_controls {
            meta_controls
                .insert_zone(ZoneId(*zone), values.clone())
                .expect("fixture meta control row");
        }
        let mut seed_controls = ControlTable::new(SEED, self.seed_targets.clone());
        for (zone, values) in &self.seed_controls {
            seed_controls
                .insert_zone(ZoneId(*zone), values.clone())
                .expect("fixture seed control row");
        }

        let len = self.households.len();
        let seed_zones: Vec<ZoneId> = self.households.iter().map(|h| ZoneId(h.seed)).collect();
        let meta_zones: Vec<ZoneId> = self.households.iter().map(|h| ZoneId(h.meta)).collect();

        let mut incidence = IncidenceTable::new(len)
            .with_zone_column(META, meta_zones)
            .and_then(|t| t.with_zone_column(SEED, seed_zones.clone()))
            .expect("fixture zone columns");
        for (idx, target) in all_targets.iter().enumerate() {
            let values = self.households.iter().map(|h| h.incidence[idx]).collect();
            incidence = incidence
                .with_incidence(target.clone(), values)
                .expect("fixture incidence column");
        }

        let seed_weights = WeightTable::new(SEED, seed_zones)
            .with_float_column(
                PRELIMINARY_BALANCED_WEIGHT,
                self.households.iter().map(|h| h.preliminary).collect(),
            )
            .and_then(|t| {
                t.with_float_column(
                    BALANCED_WEIGHT,
                    self.households.iter().map(|h| h.balanced).collect(),
                )
            })
            .expect("fixture weight columns");

        Region {
            settings: self.settings,
            control_spec,
            meta_controls,
            seed_controls,
            incidence,
            seed_weights,
        }
    }
}

/// Two seeds under one meta zone: seed 100 holds weights [2, 3, 5], seed
/// 200 holds [4, 6], and the meta control `county_hh` asks for 20.
///
/// Factoring gives each seed 10.
pub fn end_to_end_region() -> Region {
    RegionBuilder::new(&[TOTAL_HH], &["county_hh"])
        .household(1, 100, 2.0, &[1.0, 1.0])
        .household(1, 100, 3.0, &[1.0, 1.0])
        .household(1, 100, 5.0, &[1.0, 1.0])
        .household(1, 200, 4.0, &[1.0, 1.0])
        .household(1, 200, 6.0, &[1.0, 1.0])
        .seed_control(100, &[10.0])
        .seed_control(200, &[10.0])
        .meta_control(1, &[20.0])
        .build()
}

/// Two meta zones; nobody in meta zone 2 is military, and its military
/// control is 0.
pub fn degenerate_region() -> Region {
    RegionBuilder::new(&[TOTAL_HH], &["military"])
        .household(1, 100, 2.0, &[1.0, 1.0])
        .household(1, 100, 2.0, &[1.0, 0.0])
        .household(1, 200, 4.0, &[1.0, 1.0])
        .household(2, 300, 3.0, &[1.0, 0.0])
        .household(2, 400, 5.0, &[1.0, 0.0])
        .seed_control(100, &[4.0])
        .seed_control(200, &[4.0])
        .seed_control(300, &[3.0])
        .seed_control(400, &[5.0])
        .meta_control(1, &[9.0])
        .meta_control(2, &[0.0])
        .build()
}

/// Meta zone 1 holds seed 100 alone, with a meta target of 11 against a
/// weighted incidence of 7.
pub fn single_seed_region() -> Region {
    RegionBuilder::new(&[TOTAL_HH], &["county_hh"])
        .household(1, 100, 1.5, &[1.0, 1.0])
        .household(1, 100, 2.5, &[1.0, 1.0])
        .household(1, 100, 3.0, &[1.0, 1.0])
        .household(2, 200, 2.0, &[1.0, 1.0])
        .household(2, 200, 2.0, &[1.0, 1.0])
        .household(2, 300, 4.0, &[1.0, 1.0])
        .seed_control(100, &[7.0])
        .seed_control(200, &[4.0])
        .seed_control(300, &[4.0])
        .meta_control(1, &[11.0])
        .meta_control(2, &[8.0])
        .build()
}

/// Households with fractional balanced weights spread across two seeds,
/// with a seed-level `kids` control and a meta-level `workers` control.
pub fn fractional_region() -> Region {
    RegionBuilder::new(&[TOTAL_HH, "kids"], &["workers"])
        .household(1, 100, 1.4, &[1.0, 1.0, 1.0])
        .household(1, 100, 1.6, &[1.0, 0.0, 2.0])
        .household(1, 100, 0.5, &[1.0, 1.0, 0.0])
        .household(1, 100, 0.5, &[1.0, 0.0, 1.0])
        .household(1, 200, 2.25, &[1.0, 0.0, 1.0])
        .household(1, 200, 0.75, &[1.0, 1.0, 1.0])
        .household(1, 200, 1.0, &[1.0, 0.0, 0.0])
        .seed_control(100, &[4.0, 2.0])
        .seed_control(200, &[4.0, 1.0])
        .meta_control(1, &[10.0])
        .build()
}
