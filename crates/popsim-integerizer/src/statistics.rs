//! Per-zone integerization statistics.

use std::time::Duration;

use popsim_core::IntegerizeScore;

use crate::termination::TerminationReason;

/// Counters collected while integerizing one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerizeStatistics {
    /// Time spent on the zone, construction included.
    pub duration: Duration,
    /// Local search steps taken.
    pub step_count: u64,
    /// Candidate moves scored.
    pub moves_evaluated: u64,
    /// Moves applied to the working solution.
    pub moves_accepted: u64,
    /// Households rounded up by the construction.
    pub constructed_round_ups: usize,
    /// Score right after construction.
    pub starting_score: Option<IntegerizeScore>,
    /// Best score found.
    pub ending_score: Option<IntegerizeScore>,
    pub termination: Option<TerminationReason>,
}

impl IntegerizeStatistics {
    pub fn new() -> Self {
        Self {
            duration: Duration::ZERO,
            step_count: 0,
            moves_evaluated: 0,
            moves_accepted: 0,
            constructed_round_ups: 0,
            starting_score: None,
            ending_score: None,
            termination: None,
        }
    }

    /// Returns the acceptance rate (accepted / evaluated).
    pub fn acceptance_rate(&self) -> f64 {
        if self.moves_evaluated == 0 {
            0.0
        } else {
            self.moves_accepted as f64 / self.moves_evaluated as f64
        }
    }

    /// Moves evaluated per second.
    pub fn moves_per_second(&self) -> u64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 {
            (self.moves_evaluated as f64 / secs) as u64
        } else {
            0
        }
    }
}

impl Default for IntegerizeStatistics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acceptance_rate() {
        let mut stats = IntegerizeStatistics::new();
        assert_eq!(stats.acceptance_rate(), 0.0);

        stats.moves_evaluated = 200;
        stats.moves_accepted = 50;
        assert!((stats.acceptance_rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_moves_per_second() {
        let mut stats = IntegerizeStatistics::new();
        assert_eq!(stats.moves_per_second(), 0);

        stats.duration = Duration::from_secs(2);
        stats.moves_evaluated = 1000;
        assert_eq!(stats.moves_per_second(), 500);
    }
}
