//! Largest-remainder construction.
//!
//! Starting from every household at its floor, rounds up the households with
//! the largest fractional residuals until the total-household control is met.

use crate::director::RoundingDirector;

/// Rounds up enough households to meet the total-household control.
///
/// Only households counted by the total control and holding a fractional
/// weight are candidates. The shortfall is clipped to the number of
/// candidates, so an unreachable total leaves a hard miss for the search to
/// report rather than rounding anything below its floor. Ties are broken by
/// row order.
///
/// Returns the number of households rounded up.
pub fn smart_round(director: &mut RoundingDirector<'_>) -> usize {
    let problem = director.problem();
    let total_idx = problem.total_hh_index;
    let target = problem.total_hh().value.round();

    let mut candidates: Vec<usize> = director
        .movable()
        .into_iter()
        .filter(|&h| problem.incidence[h][total_idx] > 0.0)
        .collect();

    let shortfall = (target - director.household_total()).round();
    let count = if shortfall > 0.0 {
        (shortfall as usize).min(candidates.len())
    } else {
        0
    };

    candidates.sort_by(|&a, &b| {
        director
            .residual(b)
            .total_cmp(&director.residual(a))
            .then(a.cmp(&b))
    });
    director.round_up_all(&candidates[..count]);
    count
}
