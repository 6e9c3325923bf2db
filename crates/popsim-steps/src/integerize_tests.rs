//! Tests for final seed integerization.

use popsim_config::ThreadCount;
use popsim_core::{ZoneId, PRELIMINARY_BALANCED_WEIGHT};
use popsim_integerizer::IntegerizeStatus;
use popsim_test::regions::{
    end_to_end_region, fractional_region, Region, RegionBuilder, SEED, TOTAL_HH,
};

use super::*;
use crate::clean::NanControlCause;
use crate::factoring::meta_control_factoring;

fn factored(region: &Region) -> ControlTable {
    meta_control_factoring(
        &region.settings,
        &region.control_spec,
        &region.meta_controls,
        &region.seed_controls,
        &region.incidence,
        &region.seed_weights,
    )
    .unwrap()
    .seed_controls
}

fn integerize(region: &Region, seed_controls: &ControlTable) -> Result<IntegerizationOutcome> {
    integerize_final_seed_weights(
        &region.settings,
        &region.control_spec,
        seed_controls,
        &region.incidence,
        &region.seed_weights,
    )
}

fn complete(outcome: IntegerizationOutcome) -> (WeightTable, IntegerizationReport) {
    match outcome {
        IntegerizationOutcome::Complete { weights, report } => (weights, report),
        other => panic!("expected complete integerization, got {other:?}"),
    }
}

/// Two seeds without meta controls; seed 200's balanced weight is negative.
fn broken_region() -> Region {
    RegionBuilder::new(&[TOTAL_HH], &[])
        .household(1, 100, 1.5, &[1.0])
        .household(1, 100, 1.5, &[1.0])
        .household_with_weights(1, 200, 1.0, -1.0, &[1.0])
        .seed_control(100, &[3.0])
        .seed_control(200, &[1.0])
        .build()
}

// ============================================================================
// Integerization
// ============================================================================

#[test]
fn test_skipped_when_disabled() {
    let mut region = end_to_end_region();
    region.settings = region.settings.clone().with_no_integerization();
    let seed_controls = factored(&region);

    let outcome = integerize(&region, &seed_controls).unwrap();
    assert_eq!(outcome, IntegerizationOutcome::Skipped);
    assert!(outcome.report().is_none());
}

#[test]
fn test_integer_weights_pass_through() {
    let region = end_to_end_region();
    let seed_controls = factored(&region);

    let (weights, report) = complete(integerize(&region, &seed_controls).unwrap());
    assert_eq!(weights.integer_column(INTEGER_WEIGHT).unwrap(), [2, 3, 5, 4, 6]);
    assert_eq!(
        weights.float_column(BALANCED_WEIGHT).unwrap(),
        region.seed_weights.float_column(BALANCED_WEIGHT).unwrap()
    );
    assert_eq!(report.zones().len(), 2);
    for zone in report.zones() {
        assert!(matches!(
            zone.outcome,
            ZoneOutcome::Integerized {
                status: IntegerizeStatus::AlreadyInteger,
                total: 10,
                ..
            }
        ));
    }
}

#[test]
fn test_fractional_weights_meet_household_totals() {
    let region = fractional_region();
    let seed_controls = factored(&region);

    let (weights, report) = complete(integerize(&region, &seed_controls).unwrap());
    let integer = weights.integer_column(INTEGER_WEIGHT).unwrap();
    let balanced = weights.float_column(BALANCED_WEIGHT).unwrap();

    assert_eq!(integer.len(), region.incidence.len());
    for (&int, &float) in integer.iter().zip(balanced) {
        assert!(int as f64 == float.floor() || int as f64 == float.ceil());
    }

    assert_eq!(integer[..4].iter().sum::<u64>(), 4);
    assert_eq!(integer[4..].iter().sum::<u64>(), 4);
    assert_eq!(report.integer_total(), 8);
    assert!(report.is_complete());

    // Seed 100 can meet kids and workers exactly.
    assert_eq!(&integer[..4], [2, 2, 0, 0]);
    let seed_100 = report.zone(ZoneId(100)).unwrap();
    assert!(matches!(
        seed_100.outcome,
        ZoneOutcome::Integerized {
            status: IntegerizeStatus::Optimal,
            ..
        }
    ));
}

#[test]
fn test_rounding_sanity() {
    let region = RegionBuilder::new(&[TOTAL_HH], &[])
        .household(1, 100, 1.4, &[1.0])
        .household(1, 100, 1.6, &[1.0])
        .seed_control(100, &[3.0])
        .build();

    let (weights, _) = complete(integerize(&region, &region.seed_controls).unwrap());
    assert_eq!(weights.integer_column(INTEGER_WEIGHT).unwrap(), [1, 2]);
}

#[test]
fn test_rows_keep_incidence_order() {
    let region = RegionBuilder::new(&[TOTAL_HH], &[])
        .household(1, 200, 1.0, &[1.0])
        .household(1, 100, 2.0, &[1.0])
        .household(1, 200, 3.0, &[1.0])
        .household(1, 100, 4.0, &[1.0])
        .seed_control(100, &[6.0])
        .seed_control(200, &[4.0])
        .build();

    let (weights, _) = complete(integerize(&region, &region.seed_controls).unwrap());
    assert_eq!(weights.integer_column(INTEGER_WEIGHT).unwrap(), [1, 2, 3, 4]);
}

#[test]
fn test_thread_count_does_not_change_weights() {
    let mut region = fractional_region();
    let seed_controls = factored(&region);

    region.settings.integerizer = region
        .settings
        .integerizer
        .clone()
        .with_thread_count(ThreadCount::Count(1));
    let (single, _) = complete(integerize(&region, &seed_controls).unwrap());

    region.settings.integerizer = region
        .settings
        .integerizer
        .clone()
        .with_thread_count(ThreadCount::Count(4));
    let (multi, _) = complete(integerize(&region, &seed_controls).unwrap());

    assert_eq!(
        single.integer_column(INTEGER_WEIGHT).unwrap(),
        multi.integer_column(INTEGER_WEIGHT).unwrap()
    );
}

// ============================================================================
// Cleaning
// ============================================================================

#[test]
fn test_nan_control_is_cleaned_and_reported() {
    let region = RegionBuilder::new(&[TOTAL_HH, "military"], &[])
        .household(1, 100, 1.0, &[1.0, 0.0])
        .household(1, 100, 1.0, &[1.0, 0.0])
        .seed_control(100, &[2.0, f64::NAN])
        .build();

    let (weights, report) = complete(integerize(&region, &region.seed_controls).unwrap());
    assert_eq!(weights.integer_column(INTEGER_WEIGHT).unwrap(), [1, 1]);

    let zone = report.zone(ZoneId(100)).unwrap();
    assert_eq!(zone.cleaned_controls.len(), 1);
    assert_eq!(
        zone.cleaned_controls[0].cause,
        NanControlCause::NoSampledHouseholds
    );
}

#[test]
fn test_strict_cleaning_rejects_unexplained_nan() {
    let mut region = RegionBuilder::new(&[TOTAL_HH, "kids"], &[])
        .household(1, 100, 1.0, &[1.0, 1.0])
        .household(1, 100, 1.0, &[1.0, 0.0])
        .seed_control(100, &[2.0, f64::NAN])
        .build();
    region.settings.integerizer.strict_control_cleaning = true;

    let err = integerize(&region, &region.seed_controls).unwrap_err();
    assert!(matches!(
        err,
        StepError::UnexplainedNanControl { zone: ZoneId(100), .. }
    ));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_zone_failure_aborts_run() {
    let region = broken_region();

    let err = integerize(&region, &region.seed_controls).unwrap_err();
    match err {
        StepError::ZoneSolver {
            zone,
            household_count,
            balanced_weight_sum,
            source,
            ..
        } => {
            assert_eq!(zone, ZoneId(200));
            assert_eq!(household_count, 1);
            assert_eq!(balanced_weight_sum, -1.0);
            assert!(matches!(source, IntegerizerError::NegativeWeight { .. }));
        }
        other => panic!("expected ZoneSolver, got {other:?}"),
    }
}

#[test]
fn test_report_policy_lists_failed_zones() {
    let mut region = broken_region();
    region.settings.integerizer = region
        .settings
        .integerizer
        .clone()
        .with_failure_policy(FailurePolicy::Report);

    let outcome = integerize(&region, &region.seed_controls).unwrap();
    let IntegerizationOutcome::Partial { report } = outcome else {
        panic!("expected partial integerization, got {outcome:?}");
    };

    assert!(!report.is_complete());
    let failed: Vec<_> = report.failed().map(|z| z.zone).collect();
    let succeeded: Vec<_> = report.succeeded().map(|z| z.zone).collect();
    assert_eq!(failed, vec![ZoneId(200)]);
    assert_eq!(succeeded, vec![ZoneId(100)]);
    assert_eq!(report.integer_total(), 3);
}

#[test]
fn test_unfactored_controls_are_rejected() {
    let region = end_to_end_region();

    let err = integerize(&region, &region.seed_controls).unwrap_err();
    assert!(matches!(err, StepError::ColumnMismatch { .. }));
}

#[test]
fn test_missing_total_control() {
    let mut region = end_to_end_region();
    region.settings.total_hh_control = "households".into();
    let seed_controls = factored(&region);

    let err = integerize(&region, &seed_controls).unwrap_err();
    assert!(matches!(
        err,
        StepError::Table(TableError::MissingControlTarget { ref target, .. }) if target == "households"
    ));
}

#[test]
fn test_zone_without_controls() {
    let region = RegionBuilder::new(&[TOTAL_HH], &[])
        .household(1, 100, 1.0, &[1.0])
        .household(1, 200, 1.0, &[1.0])
        .seed_control(100, &[1.0])
        .build();

    let err = integerize(&region, &region.seed_controls).unwrap_err();
    assert!(matches!(
        err,
        StepError::Table(TableError::MissingZone { zone: ZoneId(200), .. })
    ));
}

#[test]
fn test_weight_rows_must_follow_incidence_zones() {
    let mut region = RegionBuilder::new(&[TOTAL_HH], &[])
        .household(1, 100, 1.0, &[1.0])
        .household(1, 200, 1.0, &[1.0])
        .seed_control(100, &[1.0])
        .seed_control(200, &[1.0])
        .build();
    region.seed_weights = WeightTable::new(SEED, vec![ZoneId(200), ZoneId(100)])
        .with_float_column(BALANCED_WEIGHT, vec![1.0, 1.0])
        .and_then(|t| t.with_float_column(PRELIMINARY_BALANCED_WEIGHT, vec![1.0, 1.0]))
        .unwrap();

    let err = integerize(&region, &region.seed_controls).unwrap_err();
    assert!(matches!(
        err,
        StepError::MisalignedRow {
            row: 0,
            incidence_zone: ZoneId(100),
            weight_zone: ZoneId(200),
        }
    ));
}

#[test]
fn test_weight_rows_must_match_incidence_length() {
    let mut region = end_to_end_region();
    let seed_controls = factored(&region);
    region.seed_weights = WeightTable::new(SEED, vec![ZoneId(100)])
        .with_float_column(BALANCED_WEIGHT, vec![1.0])
        .unwrap();

    let err = integerize(&region, &seed_controls).unwrap_err();
    assert!(matches!(err, StepError::RowMismatch { .. }));
}
