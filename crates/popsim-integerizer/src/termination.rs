//! Termination conditions for a zone's local search.

use std::fmt;
use std::time::{Duration, Instant};

use popsim_config::TerminationConfig;

/// Why a zone's search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// Every control is met exactly.
    PerfectScore,
    /// The per-zone time limit elapsed.
    TimeLimit,
    /// The step limit was reached.
    StepLimit,
    /// Too many steps passed without a new best score.
    UnimprovedStepLimit,
    /// No household has a fractional weight, or no move exists.
    NothingToMove,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TerminationReason::PerfectScore => "perfect_score",
            TerminationReason::TimeLimit => "time_limit",
            TerminationReason::StepLimit => "step_limit",
            TerminationReason::UnimprovedStepLimit => "unimproved_step_limit",
            TerminationReason::NothingToMove => "nothing_to_move",
        };
        f.write_str(name)
    }
}

/// Progress counters a termination is checked against.
#[derive(Debug, Clone)]
pub struct SearchScope {
    start: Instant,
    step_count: u64,
    unimproved_step_count: u64,
}

impl SearchScope {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            step_count: 0,
            unimproved_step_count: 0,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn unimproved_step_count(&self) -> u64 {
        self.unimproved_step_count
    }

    /// Records a finished step.
    pub fn step_ended(&mut self, improved_best: bool) {
        self.step_count += 1;
        if improved_best {
            self.unimproved_step_count = 0;
        } else {
            self.unimproved_step_count += 1;
        }
    }
}

/// Composite OR of time, step and unimproved-step limits.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use popsim_integerizer::termination::ZoneTermination;
///
/// let term = ZoneTermination::new()
///     .with_time_limit(Duration::from_secs(30))
///     .with_step_limit(10_000);
/// assert_eq!(term.time_limit(), Some(Duration::from_secs(30)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ZoneTermination {
    time_limit: Option<Duration>,
    step_limit: Option<u64>,
    unimproved_step_limit: Option<u64>,
}

impl ZoneTermination {
    /// A termination that never fires on its own.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &TerminationConfig) -> Self {
        Self {
            time_limit: config.time_limit(),
            step_limit: config.step_count_limit,
            unimproved_step_limit: config.unimproved_step_count_limit,
        }
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_step_limit(mut self, steps: u64) -> Self {
        self.step_limit = Some(steps);
        self
    }

    pub fn with_unimproved_step_limit(mut self, steps: u64) -> Self {
        self.unimproved_step_limit = Some(steps);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Returns the first limit reached, if any.
    pub fn check(&self, scope: &SearchScope) -> Option<TerminationReason> {
        if self
            .step_limit
            .is_some_and(|limit| scope.step_count() >= limit)
        {
            return Some(TerminationReason::StepLimit);
        }
        if self
            .unimproved_step_limit
            .is_some_and(|limit| scope.unimproved_step_count() >= limit)
        {
            return Some(TerminationReason::UnimprovedStepLimit);
        }
        if self
            .time_limit
            .is_some_and(|limit| scope.elapsed() >= limit)
        {
            return Some(TerminationReason::TimeLimit);
        }
        None
    }
}
