//! Late-acceptance search over floor/ceiling roundings.

use std::time::Instant;

use popsim_core::IntegerizeScore;
use rand::rngs::StdRng;
use rand::Rng;
use tracing::{debug, trace};

use crate::director::{RoundingDirector, RoundingMove};
use crate::statistics::IntegerizeStatistics;
use crate::termination::{SearchScope, TerminationReason, ZoneTermination};

/// Probability of sampling a single flip instead of a swap.
const FLIP_PROBABILITY: f64 = 0.1;

/// Tries to find a swap partner in the opposite rounding state.
const PARTNER_ATTEMPTS: usize = 8;

/// Best rounding found by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub weights: Vec<u64>,
    pub score: IntegerizeScore,
    pub termination: TerminationReason,
}

/// Late acceptance local search.
///
/// Each step scores a sample of moves, picks the best, and applies it if it
/// is no worse than the current score or the score from
/// `late_acceptance_size` steps ago.
#[derive(Debug, Clone)]
pub struct LateAcceptanceSearch {
    late_acceptance_size: usize,
    move_sample_size: usize,
    termination: ZoneTermination,
}

impl LateAcceptanceSearch {
    pub fn new(
        late_acceptance_size: usize,
        move_sample_size: usize,
        termination: ZoneTermination,
    ) -> Self {
        Self {
            late_acceptance_size: late_acceptance_size.max(1),
            move_sample_size: move_sample_size.max(1),
            termination,
        }
    }

    pub fn with_termination(mut self, termination: ZoneTermination) -> Self {
        self.termination = termination;
        self
    }

    pub fn termination(&self) -> &ZoneTermination {
        &self.termination
    }

    pub fn run(
        &self,
        director: &mut RoundingDirector<'_>,
        rng: &mut StdRng,
        stats: &mut IntegerizeStatistics,
    ) -> SearchResult {
        let movable = director.movable();
        let initial = director.score();
        let mut best = SearchResult {
            weights: director.weights(),
            score: initial,
            termination: TerminationReason::NothingToMove,
        };

        if initial.is_perfect() {
            best.termination = TerminationReason::PerfectScore;
            return best;
        }
        if movable.is_empty() {
            return best;
        }

        let label = &director.problem().label;
        let mut current = initial;
        let mut late_scores = vec![initial; self.late_acceptance_size];
        let mut scope = SearchScope::start();
        let mut last_progress_time = Instant::now();
        let mut last_progress_moves = stats.moves_evaluated;

        best.termination = loop {
            if best.score.is_perfect() {
                break TerminationReason::PerfectScore;
            }
            if let Some(reason) = self.termination.check(&scope) {
                break reason;
            }

            let mut candidate: Option<(RoundingMove, IntegerizeScore)> = None;
            for _ in 0..self.move_sample_size {
                let mv = sample_move(director, &movable, rng);
                let score = director.score_after(mv);
                stats.moves_evaluated += 1;
                if candidate.map_or(true, |(_, s)| score > s) {
                    candidate = Some((mv, score));
                }
            }

            let late_idx = (scope.step_count() as usize) % self.late_acceptance_size;
            let mut improved = false;
            if let Some((mv, score)) = candidate {
                let accepted = score >= current || score >= late_scores[late_idx];
                trace!(
                    event = "step",
                    zone = %label,
                    step = scope.step_count(),
                    score = %score,
                    accepted = accepted,
                );
                if accepted {
                    director.apply(mv);
                    current = score;
                    stats.moves_accepted += 1;
                    if score > best.score {
                        best.score = score;
                        best.weights = director.weights();
                        improved = true;
                    }
                }
            }
            late_scores[late_idx] = current;
            scope.step_ended(improved);

            let now = Instant::now();
            if now.duration_since(last_progress_time).as_secs() >= 1 {
                let moves_delta = stats.moves_evaluated - last_progress_moves;
                let elapsed_secs = now.duration_since(last_progress_time).as_secs_f64();
                debug!(
                    event = "progress",
                    zone = %label,
                    steps = scope.step_count(),
                    speed = (moves_delta as f64 / elapsed_secs) as u64,
                    score = %best.score,
                );
                last_progress_time = now;
                last_progress_moves = stats.moves_evaluated;
            }
        };

        stats.step_count += scope.step_count();
        best
    }
}

fn sample_move(
    director: &RoundingDirector<'_>,
    movable: &[usize],
    rng: &mut StdRng,
) -> RoundingMove {
    let first = movable[rng.random_range(0..movable.len())];
    if movable.len() < 2 || rng.random_bool(FLIP_PROBABILITY) {
        return RoundingMove::Flip(first);
    }

    let first_up = director.is_rounded_up(first);
    for _ in 0..PARTNER_ATTEMPTS {
        let other = movable[rng.random_range(0..movable.len())];
        if director.is_rounded_up(other) != first_up {
            return if first_up {
                RoundingMove::Swap {
                    down: first,
                    up: other,
                }
            } else {
                RoundingMove::Swap {
                    down: other,
                    up: first,
                }
            };
        }
    }
    RoundingMove::Flip(first)
}
