//! Integerizer entry point: construction followed by local search.

use std::fmt;
use std::time::Instant;

use popsim_config::IntegerizerConfig;
use popsim_core::IntegerizeScore;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::construction::smart_round;
use crate::director::RoundingDirector;
use crate::error::IntegerizerError;
use crate::localsearch::LateAcceptanceSearch;
use crate::problem::IntegerizeProblem;
use crate::statistics::IntegerizeStatistics;
use crate::termination::{TerminationReason, ZoneTermination};

/// How a zone's integerization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerizeStatus {
    /// Every float weight was already whole.
    AlreadyInteger,
    /// All controls are met exactly.
    Optimal,
    /// Search stopped on a step limit with some controls missed.
    Converged,
    /// The time limit stopped the search before every control was met.
    TimeLimitReached,
}

impl fmt::Display for IntegerizeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntegerizeStatus::AlreadyInteger => "already_integer",
            IntegerizeStatus::Optimal => "optimal",
            IntegerizeStatus::Converged => "converged",
            IntegerizeStatus::TimeLimitReached => "time_limit_reached",
        };
        f.write_str(name)
    }
}

/// Integer weights for one zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Integerized {
    /// One weight per household, each the floor or ceiling of its float weight.
    pub weights: Vec<u64>,
    pub status: IntegerizeStatus,
    pub score: IntegerizeScore,
    pub statistics: IntegerizeStatistics,
}

impl Integerized {
    pub fn total(&self) -> u64 {
        self.weights.iter().sum()
    }
}

/// Rounds float household weights to integers that reproduce the controls.
#[derive(Debug, Clone)]
pub struct Integerizer {
    search: LateAcceptanceSearch,
    seed: u64,
}

impl Integerizer {
    pub fn new(config: &IntegerizerConfig) -> Self {
        Self {
            search: LateAcceptanceSearch::new(
                config.late_acceptance_size,
                config.move_sample_size,
                ZoneTermination::from_config(&config.termination),
            ),
            seed: config.random_seed,
        }
    }

    /// Replaces the random seed. Zones are usually seeded with
    /// `random_seed + zone id` so results do not depend on scheduling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_termination(mut self, termination: ZoneTermination) -> Self {
        self.search = self.search.with_termination(termination);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn solve(&self, problem: &IntegerizeProblem) -> Result<Integerized, IntegerizerError> {
        let start = Instant::now();
        problem.validate()?;

        let mut director = RoundingDirector::new(problem);
        let mut statistics = IntegerizeStatistics::new();

        if director.movable().is_empty() {
            let score = director.score();
            statistics.starting_score = Some(score);
            statistics.ending_score = Some(score);
            statistics.termination = Some(TerminationReason::NothingToMove);
            statistics.duration = start.elapsed();
            return Ok(Integerized {
                weights: director.weights(),
                status: IntegerizeStatus::AlreadyInteger,
                score,
                statistics,
            });
        }

        statistics.constructed_round_ups = smart_round(&mut director);
        let constructed = director.score();
        statistics.starting_score = Some(constructed);
        debug!(
            event = "construction_end",
            zone = %problem.label,
            households = problem.household_count(),
            round_ups = statistics.constructed_round_ups,
            score = %constructed,
        );

        let mut rng = StdRng::seed_from_u64(self.seed);
        let result = self.search.run(&mut director, &mut rng, &mut statistics);

        let status = match result.termination {
            _ if result.score.is_perfect() => IntegerizeStatus::Optimal,
            TerminationReason::TimeLimit => IntegerizeStatus::TimeLimitReached,
            _ => IntegerizeStatus::Converged,
        };

        statistics.ending_score = Some(result.score);
        statistics.termination = Some(result.termination);
        statistics.duration = start.elapsed();

        debug!(
            event = "search_end",
            zone = %problem.label,
            status = %status,
            termination = %result.termination,
            steps = statistics.step_count,
            speed = statistics.moves_per_second(),
            score = %result.score,
        );

        Ok(Integerized {
            weights: result.weights,
            status,
            score: result.score,
            statistics,
        })
    }
}

/// Integerizes `problem` with `config`.
pub fn integerize(
    problem: &IntegerizeProblem,
    config: &IntegerizerConfig,
) -> Result<Integerized, IntegerizerError> {
    Integerizer::new(config).solve(problem)
}
