//! Per-zone integerization report.

use std::time::Duration;

use popsim_core::{IntegerizeScore, ZoneId};
use popsim_integerizer::IntegerizeStatus;

use crate::clean::CleanedControl;

/// How one zone ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneOutcome {
    Integerized {
        status: IntegerizeStatus,
        score: IntegerizeScore,
        duration: Duration,
        /// Sum of the zone's integer weights.
        total: u64,
    },
    Failed {
        message: String,
    },
}

/// One seed zone's entry in an [`IntegerizationReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneReport {
    pub zone: ZoneId,
    pub households: usize,
    pub balanced_weight_sum: f64,
    /// NaN controls that were replaced with 0 before solving.
    pub cleaned_controls: Vec<CleanedControl>,
    pub outcome: ZoneOutcome,
}

impl ZoneReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ZoneOutcome::Integerized { .. })
    }
}

/// Which zones were integerized and which failed, in zone order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegerizationReport {
    zones: Vec<ZoneReport>,
}

impl IntegerizationReport {
    pub fn new(mut zones: Vec<ZoneReport>) -> Self {
        zones.sort_by_key(|z| z.zone);
        Self { zones }
    }

    pub fn zones(&self) -> &[ZoneReport] {
        &self.zones
    }

    pub fn zone(&self, zone: ZoneId) -> Option<&ZoneReport> {
        self.zones.iter().find(|z| z.zone == zone)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &ZoneReport> {
        self.zones.iter().filter(|z| z.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ZoneReport> {
        self.zones.iter().filter(|z| !z.is_success())
    }

    /// Returns true if every zone was integerized.
    pub fn is_complete(&self) -> bool {
        self.zones.iter().all(ZoneReport::is_success)
    }

    /// Zones that stopped on the time limit before meeting every control.
    pub fn timed_out(&self) -> impl Iterator<Item = &ZoneReport> {
        self.zones.iter().filter(|z| {
            matches!(
                z.outcome,
                ZoneOutcome::Integerized {
                    status: IntegerizeStatus::TimeLimitReached,
                    ..
                }
            )
        })
    }

    /// Total integer households over the successful zones.
    pub fn integer_total(&self) -> u64 {
        self.zones
            .iter()
            .map(|z| match z.outcome {
                ZoneOutcome::Integerized { total, .. } => total,
                ZoneOutcome::Failed { .. } => 0,
            })
            .sum()
    }
}
