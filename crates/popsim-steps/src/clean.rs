//! Control cleaning ahead of integerization.

use std::fmt;

use popsim_core::ZoneId;
use tracing::warn;

use crate::error::{Result, StepError};

/// Why a zone's control value was NaN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NanControlCause {
    /// No household in the zone has incidence for the control, so zero is the
    /// only value the weights could reach anyway.
    NoSampledHouseholds,
    /// The zone has households with incidence; the NaN came from upstream.
    Unexplained,
}

impl fmt::Display for NanControlCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NanControlCause::NoSampledHouseholds => f.write_str("no_sampled_households"),
            NanControlCause::Unexplained => f.write_str("unexplained"),
        }
    }
}

/// A NaN control replaced with 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedControl {
    pub target: String,
    pub cause: NanControlCause,
}

/// Replaces NaN control values with 0.
///
/// `incidence` is the zone's row-major incidence, one value per target. Every
/// replacement is logged and returned; with `strict` set an unexplained NaN
/// is an error instead.
pub fn clean_controls(
    zone: ZoneId,
    targets: &[String],
    controls: &[f64],
    incidence: &[Vec<f64>],
    strict: bool,
) -> Result<(Vec<f64>, Vec<CleanedControl>)> {
    let mut cleaned = Vec::new();
    let values = controls
        .iter()
        .zip(targets)
        .enumerate()
        .map(|(t, (&value, target))| {
            if !value.is_nan() {
                return Ok(value);
            }

            let incidence_sum: f64 = incidence.iter().map(|row| row[t]).sum();
            let cause = if incidence_sum == 0.0 {
                NanControlCause::NoSampledHouseholds
            } else {
                NanControlCause::Unexplained
            };
            warn!(
                event = "nan_control_cleaned",
                zone = %zone,
                target = %target,
                cause = %cause,
                incidence_sum = incidence_sum,
            );
            if strict && cause == NanControlCause::Unexplained {
                return Err(StepError::UnexplainedNanControl {
                    zone,
                    target: target.clone(),
                });
            }
            cleaned.push(CleanedControl {
                target: target.clone(),
                cause,
            });
            Ok(0.0)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok((values, cleaned))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<String> {
        vec!["num_hh".into(), "military".into(), "kids".into()]
    }

    fn incidence() -> Vec<Vec<f64>> {
        vec![vec![1.0, 0.0, 1.0], vec![1.0, 0.0, 0.0]]
    }

    #[test]
    fn test_clean_values_pass_through() {
        let (values, cleaned) =
            clean_controls(ZoneId(1), &targets(), &[2.0, 0.0, 1.0], &incidence(), true).unwrap();
        assert_eq!(values, vec![2.0, 0.0, 1.0]);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn test_nan_is_classified() {
        let (values, cleaned) = clean_controls(
            ZoneId(1),
            &targets(),
            &[2.0, f64::NAN, f64::NAN],
            &incidence(),
            false,
        )
        .unwrap();

        assert_eq!(values, vec![2.0, 0.0, 0.0]);
        assert_eq!(
            cleaned,
            vec![
                CleanedControl {
                    target: "military".into(),
                    cause: NanControlCause::NoSampledHouseholds,
                },
                CleanedControl {
                    target: "kids".into(),
                    cause: NanControlCause::Unexplained,
                },
            ]
        );
    }

    #[test]
    fn test_strict_rejects_unexplained_nan() {
        let err = clean_controls(
            ZoneId(7),
            &targets(),
            &[2.0, 0.0, f64::NAN],
            &incidence(),
            true,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            StepError::UnexplainedNanControl { zone: ZoneId(7), ref target } if target == "kids"
        ));
    }

    #[test]
    fn test_strict_allows_explained_nan() {
        let (values, cleaned) = clean_controls(
            ZoneId(7),
            &targets(),
            &[2.0, f64::NAN, 1.0],
            &incidence(),
            true,
        )
        .unwrap();
        assert_eq!(values, vec![2.0, 0.0, 1.0]);
        assert_eq!(cleaned.len(), 1);
    }
}
