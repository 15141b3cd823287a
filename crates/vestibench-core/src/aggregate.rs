//! Per-program admission score: the weighted harmonic mean.
//!
//! `AC = Σ weight_i / Σ (weight_i / score_i)` over the program's weighted
//! subjects. Pure and stateless: one call per (candidate, program) pair,
//! safe to run in any order or in parallel.

use crate::model::{ProgramWeights, Subject, NEUTRAL_SCORE};
use crate::statistics::StandardizedScores;

/// Compute the admission score for one program.
///
/// A weighted subject with no standardized score contributes the neutral
/// score, keeping the program's weight set fully accounted for. Any
/// contributing score at or below zero cannot be inverted and collapses the
/// whole program to `0.0`, as does an empty weight set.
pub fn admission_score(scores: &StandardizedScores, weights: &ProgramWeights) -> f64 {
    let mut weight_sum = 0.0;
    let mut inverse_sum = 0.0;

    for (&subject, &weight) in &weights.weights {
        let score = scores.weight_score(subject).unwrap_or_else(|| {
            tracing::warn!(%subject, "no standardized score for weighted subject, using neutral");
            NEUTRAL_SCORE
        });
        if score <= 0.0 {
            return 0.0;
        }
        weight_sum += weight;
        inverse_sum += weight / score;
    }

    if inverse_sum > 0.0 {
        weight_sum / inverse_sum
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn scores(entries: &[(Subject, f64)], combined: f64) -> StandardizedScores {
        StandardizedScores {
            subjects: entries.iter().copied().collect(),
            essay: combined,
            language_combined: combined,
        }
    }

    fn weights(entries: &[(Subject, f64)]) -> ProgramWeights {
        ProgramWeights {
            weights: entries.iter().copied().collect(),
        }
    }

    #[test]
    fn weighted_harmonic_mean() {
        let scores = scores(&[(Subject::Mathematics, 600.0)], 500.0);
        let weights = weights(&[(Subject::Mathematics, 2.0), (Subject::Portuguese, 1.0)]);
        let ac = admission_score(&scores, &weights);
        // 3 / (2/600 + 1/500) = 562.5
        assert!((ac - 562.5).abs() < 1e-9, "got {ac}");
    }

    #[test]
    fn invariant_under_weight_scaling() {
        let scores = scores(
            &[(Subject::Mathematics, 620.0), (Subject::Physics, 540.0)],
            580.0,
        );
        let base = weights(&[
            (Subject::Mathematics, 3.0),
            (Subject::Physics, 2.0),
            (Subject::Portuguese, 1.0),
        ]);
        let scaled = ProgramWeights {
            weights: base
                .weights
                .iter()
                .map(|(&s, &w)| (s, w * 7.5))
                .collect::<BTreeMap<_, _>>(),
        };
        let a = admission_score(&scores, &base);
        let b = admission_score(&scores, &scaled);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn missing_subject_uses_neutral_score() {
        let scores = scores(&[], 500.0);
        let weights = weights(&[(Subject::Biology, 2.0), (Subject::Chemistry, 1.0)]);
        // Both subjects fall back to 500, so the mean is 500 as well.
        assert!((admission_score(&scores, &weights) - 500.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_score_collapses_to_zero() {
        let scores = scores(&[(Subject::Mathematics, 0.0)], 500.0);
        let weights = weights(&[(Subject::Mathematics, 2.0), (Subject::Portuguese, 1.0)]);
        assert_eq!(admission_score(&scores, &weights), 0.0);

        let negative = self::scores(&[(Subject::Mathematics, -12.0)], 500.0);
        assert_eq!(admission_score(&negative, &weights), 0.0);
    }

    #[test]
    fn empty_weight_set_is_zero() {
        let scores = scores(&[(Subject::Mathematics, 600.0)], 500.0);
        assert_eq!(admission_score(&scores, &weights(&[])), 0.0);
    }

    #[test]
    fn zero_weights_are_zero() {
        let scores = scores(&[(Subject::Mathematics, 600.0)], 500.0);
        let weights = weights(&[(Subject::Mathematics, 0.0)]);
        assert_eq!(admission_score(&scores, &weights), 0.0);
    }
}
