//! Tests for the integerizer.

use std::time::Duration;

use popsim_config::IntegerizerConfig;
use proptest::prelude::*;

use crate::error::IntegerizerError;
use crate::problem::{ControlTarget, IntegerizeProblem};
use crate::solver::{integerize, IntegerizeStatus, Integerizer};
use crate::termination::{TerminationReason, ZoneTermination};

fn config() -> IntegerizerConfig {
    IntegerizerConfig::default().with_step_count_limit(10_000)
}

fn problem(
    weights: Vec<f64>,
    targets: Vec<ControlTarget>,
    incidence: Vec<Vec<f64>>,
) -> IntegerizeProblem {
    IntegerizeProblem {
        label: "PUMA_1".into(),
        targets,
        incidence,
        float_weights: weights,
        total_hh_index: 0,
    }
}

/// Four half-weight households, two of them with kids, and a zero kids control.
fn kids_problem(kids_target: f64) -> IntegerizeProblem {
    problem(
        vec![0.5; 4],
        vec![
            ControlTarget::new("num_hh", 2.0),
            ControlTarget::new("hh_with_kids", kids_target),
        ],
        vec![
            vec![1.0, 1.0],
            vec![1.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
        ],
    )
}

// ============================================================================
// Solving
// ============================================================================

#[test]
fn test_rounds_to_total() {
    let problem = problem(
        vec![1.4, 1.6],
        vec![ControlTarget::new("num_hh", 3.0)],
        vec![vec![1.0], vec![1.0]],
    );

    let result = integerize(&problem, &config()).unwrap();
    assert_eq!(result.weights, vec![1, 2]);
    assert_eq!(result.total(), 3);
    assert_eq!(result.status, IntegerizeStatus::Optimal);
    assert!(result.score.is_perfect());
}

#[test]
fn test_search_swaps_to_meet_secondary_control() {
    let problem = kids_problem(0.0);

    let result = integerize(&problem, &config()).unwrap();
    assert_eq!(result.weights, vec![0, 0, 1, 1]);
    assert_eq!(result.status, IntegerizeStatus::Optimal);
    assert_eq!(
        result.statistics.termination,
        Some(TerminationReason::PerfectScore)
    );
    assert_eq!(result.statistics.constructed_round_ups, 2);
}

#[test]
fn test_importance_decides_conflicting_controls() {
    let problem = problem(
        vec![0.5, 0.5],
        vec![
            ControlTarget::new("num_hh", 1.0),
            ControlTarget::new("renters", 1.0),
            ControlTarget::new("owners", 1.0).with_importance(10.0),
        ],
        vec![vec![1.0, 1.0, 0.0], vec![1.0, 0.0, 1.0]],
    );
    let config = IntegerizerConfig::default().with_step_count_limit(200);

    let result = integerize(&problem, &config).unwrap();
    assert_eq!(result.weights, vec![0, 1]);
    assert_eq!(result.status, IntegerizeStatus::Converged);
    assert_eq!(result.score.hard(), 0);
    assert_eq!(result.score.medium(), -1000);
}

#[test]
fn test_already_integer() {
    let problem = problem(
        vec![2.0, 3.0],
        vec![ControlTarget::new("num_hh", 5.0)],
        vec![vec![1.0], vec![1.0]],
    );

    let result = integerize(&problem, &config()).unwrap();
    assert_eq!(result.weights, vec![2, 3]);
    assert_eq!(result.status, IntegerizeStatus::AlreadyInteger);
    assert_eq!(result.statistics.step_count, 0);
}

#[test]
fn test_empty_zone() {
    let problem = problem(vec![], vec![ControlTarget::new("num_hh", 0.0)], vec![]);

    let result = integerize(&problem, &config()).unwrap();
    assert!(result.weights.is_empty());
    assert_eq!(result.status, IntegerizeStatus::AlreadyInteger);
}

#[test]
fn test_time_limit_reached() {
    let problem = kids_problem(0.5);
    let integerizer = Integerizer::new(&config())
        .with_termination(ZoneTermination::new().with_time_limit(Duration::ZERO));

    let result = integerizer.solve(&problem).unwrap();
    assert_eq!(result.status, IntegerizeStatus::TimeLimitReached);
    assert_eq!(result.total(), 2);
    assert_eq!(result.statistics.step_count, 0);
}

#[test]
fn test_step_limit_converges() {
    let problem = kids_problem(0.5);
    let integerizer =
        Integerizer::new(&config()).with_termination(ZoneTermination::new().with_step_limit(50));

    let result = integerizer.solve(&problem).unwrap();
    assert_eq!(result.status, IntegerizeStatus::Converged);
    assert_eq!(result.statistics.step_count, 50);
    assert_eq!(
        result.statistics.termination,
        Some(TerminationReason::StepLimit)
    );
}

#[test]
fn test_same_seed_same_weights() {
    let problem = problem(
        vec![0.3, 0.7, 0.5, 0.2, 0.9, 0.4],
        vec![
            ControlTarget::new("num_hh", 3.0),
            ControlTarget::new("seniors", 1.0),
        ],
        vec![
            vec![1.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
        ],
    );
    let config = config().with_random_seed(42);

    let first = integerize(&problem, &config).unwrap();
    let second = integerize(&problem, &config).unwrap();
    assert_eq!(first.weights, second.weights);
    assert_eq!(first.score, second.score);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_rejects_nan_weight() {
    let problem = problem(
        vec![1.0, f64::NAN],
        vec![ControlTarget::new("num_hh", 2.0)],
        vec![vec![1.0], vec![1.0]],
    );

    let err = integerize(&problem, &config()).unwrap_err();
    assert!(matches!(err, IntegerizerError::NonFiniteWeight { row: 1, .. }));
}

#[test]
fn test_rejects_negative_weight() {
    let problem = problem(
        vec![-0.5],
        vec![ControlTarget::new("num_hh", 0.0)],
        vec![vec![1.0]],
    );

    let err = integerize(&problem, &config()).unwrap_err();
    assert!(matches!(err, IntegerizerError::NegativeWeight { row: 0, .. }));
}

#[test]
fn test_rejects_ragged_incidence() {
    let problem = problem(
        vec![0.5, 0.5],
        vec![
            ControlTarget::new("num_hh", 1.0),
            ControlTarget::new("workers", 1.0),
        ],
        vec![vec![1.0, 0.0], vec![1.0]],
    );

    let err = integerize(&problem, &config()).unwrap_err();
    assert!(matches!(err, IntegerizerError::LengthMismatch { .. }));
}

#[test]
fn test_rejects_non_finite_control() {
    let problem = problem(
        vec![0.5],
        vec![ControlTarget::new("num_hh", f64::INFINITY)],
        vec![vec![1.0]],
    );

    let err = integerize(&problem, &config()).unwrap_err();
    assert!(matches!(err, IntegerizerError::NonFiniteControl { .. }));
}

#[test]
fn test_rejects_total_index_out_of_range() {
    let mut problem = kids_problem(0.0);
    problem.total_hh_index = 5;

    let err = integerize(&problem, &config()).unwrap_err();
    assert!(matches!(err, IntegerizerError::InvalidTotal { .. }));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_weights_are_floor_or_ceiling_and_meet_total(
        weights in prop::collection::vec(0.0f64..5.0, 1..30),
    ) {
        let total = weights.iter().sum::<f64>().round();
        let problem = problem(
            weights.clone(),
            vec![ControlTarget::new("num_hh", total)],
            vec![vec![1.0]; weights.len()],
        );
        let config = IntegerizerConfig::default().with_step_count_limit(100);

        let result = integerize(&problem, &config).unwrap();

        for (&int, &float) in result.weights.iter().zip(&weights) {
            prop_assert!(int as f64 == float.floor() || int as f64 == float.ceil());
        }
        prop_assert_eq!(result.total() as f64, total);
        prop_assert_eq!(result.score.hard(), 0);
    }
}
