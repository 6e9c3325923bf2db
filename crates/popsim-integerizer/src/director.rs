//! Incremental score state for one zone's rounding.
//!
//! Every household weight is either its floor or its floor plus one. The
//! director tracks which households are rounded up, the weighted incidence
//! each control currently achieves, and the total rounding distance, so that
//! a candidate move is scored in O(controls) without touching other
//! households.

use popsim_core::IntegerizeScore;

use crate::problem::IntegerizeProblem;

/// A change to the rounding of one or two households.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingMove {
    /// Toggle one household between floor and ceiling.
    Flip(usize),
    /// Round `down` to its floor and `up` to its ceiling.
    Swap { down: usize, up: usize },
}

/// Working state of a zone's integer weights.
#[derive(Debug, Clone)]
pub struct RoundingDirector<'a> {
    problem: &'a IntegerizeProblem,
    floors: Vec<u64>,
    residuals: Vec<f64>,
    rounded_up: Vec<bool>,
    achieved: Vec<f64>,
    rounding_distance: f64,
}

impl<'a> RoundingDirector<'a> {
    /// Starts with every household at its floor.
    pub fn new(problem: &'a IntegerizeProblem) -> Self {
        let floors: Vec<u64> = problem
            .float_weights
            .iter()
            .map(|w| w.floor() as u64)
            .collect();
        let residuals: Vec<f64> = problem.float_weights.iter().map(|w| w - w.floor()).collect();

        let mut achieved = vec![0.0; problem.target_count()];
        for (row, &floor) in problem.incidence.iter().zip(&floors) {
            for (total, &inc) in achieved.iter_mut().zip(row) {
                *total += inc * floor as f64;
            }
        }
        let rounding_distance = residuals.iter().sum();

        Self {
            problem,
            rounded_up: vec![false; floors.len()],
            floors,
            residuals,
            achieved,
            rounding_distance,
        }
    }

    pub fn problem(&self) -> &'a IntegerizeProblem {
        self.problem
    }

    pub fn residual(&self, household: usize) -> f64 {
        self.residuals[household]
    }

    pub fn is_rounded_up(&self, household: usize) -> bool {
        self.rounded_up[household]
    }

    /// Households whose weight is fractional and can therefore move.
    pub fn movable(&self) -> Vec<usize> {
        (0..self.residuals.len())
            .filter(|&h| self.residuals[h] > 0.0)
            .collect()
    }

    /// Weighted incidence currently achieved per control.
    pub fn achieved(&self) -> &[f64] {
        &self.achieved
    }

    /// Current integer weights.
    pub fn weights(&self) -> Vec<u64> {
        self.floors
            .iter()
            .zip(&self.rounded_up)
            .map(|(&floor, &up)| floor + u64::from(up))
            .collect()
    }

    /// Households currently counted by the total-household control.
    pub fn household_total(&self) -> f64 {
        self.achieved[self.problem.total_hh_index]
    }

    /// Score of the current rounding.
    pub fn score(&self) -> IntegerizeScore {
        self.score_with(|_| 0.0, 0.0)
    }

    /// Score the rounding would have after `mv`, without applying it.
    pub fn score_after(&self, mv: RoundingMove) -> IntegerizeScore {
        let (delta_distance, changes) = self.changes(mv);
        let incidence = &self.problem.incidence;
        self.score_with(
            |c| {
                changes
                    .iter()
                    .flatten()
                    .map(|&(h, sign)| sign * incidence[h][c])
                    .sum()
            },
            delta_distance,
        )
    }

    /// Applies `mv`.
    pub fn apply(&mut self, mv: RoundingMove) {
        let (delta_distance, changes) = self.changes(mv);
        for &(household, sign) in changes.iter().flatten() {
            for (total, &inc) in self
                .achieved
                .iter_mut()
                .zip(&self.problem.incidence[household])
            {
                *total += sign * inc;
            }
            self.rounded_up[household] = sign > 0.0;
        }
        self.rounding_distance += delta_distance;
    }

    /// Rounds up exactly `households`, all of which must currently be down.
    pub fn round_up_all(&mut self, households: &[usize]) {
        for &household in households {
            if !self.rounded_up[household] {
                self.apply(RoundingMove::Flip(household));
            }
        }
    }

    // Households touched by `mv` with +1/-1 weight change, and the change in
    // rounding distance.
    fn changes(&self, mv: RoundingMove) -> (f64, [Option<(usize, f64)>; 2]) {
        match mv {
            RoundingMove::Flip(h) => {
                let sign = if self.rounded_up[h] { -1.0 } else { 1.0 };
                (self.flip_distance(h), [Some((h, sign)), None])
            }
            RoundingMove::Swap { down, up } => (
                self.flip_distance(down) + self.flip_distance(up),
                [Some((down, -1.0)), Some((up, 1.0))],
            ),
        }
    }

    // Change in |w - float| when toggling household `h`.
    fn flip_distance(&self, h: usize) -> f64 {
        let r = self.residuals[h];
        if self.rounded_up[h] {
            r - (1.0 - r)
        } else {
            (1.0 - r) - r
        }
    }

    fn score_with(&self, delta: impl Fn(usize) -> f64, delta_distance: f64) -> IntegerizeScore {
        let total_idx = self.problem.total_hh_index;
        let mut household_miss = 0.0;
        let mut control_penalty = 0.0;

        for (c, target) in self.problem.targets.iter().enumerate() {
            let miss = (self.achieved[c] + delta(c) - target.value).abs();
            if c == total_idx {
                household_miss = miss;
            } else {
                control_penalty += target.importance * miss;
            }
        }

        IntegerizeScore::from_penalties(
            household_miss,
            control_penalty,
            self.rounding_distance + delta_distance,
        )
    }
}
