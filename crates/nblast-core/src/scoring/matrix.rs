//! Score-matrix derivation: matched and random histograms into a log2
//! likelihood-ratio lookup table over the same bin grid.

use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::types::{CountMatrix, Sample, ScoreMatrix};

/// Normalize counts to probabilities with additive smoothing.
///
/// `p[i][j] = (count + ε) / (total + ε·bins)`, so no bin is ever exactly
/// zero and the matrix still sums to 1. Fails with
/// [`ValidationError::ZeroTotalCount`] when the histogram is empty overall.
pub fn smoothed_probability(
    counts: &CountMatrix,
    sample_id: Uuid,
    smoothing: f64,
) -> Result<ScoreMatrix> {
    let total = counts.total();
    if total == 0 {
        return Err(ValidationError::ZeroTotalCount(sample_id).into());
    }
    let (rows, cols) = counts.shape();
    let bins = (rows * cols) as f64;
    let denominator = total as f64 + smoothing * bins;
    let data = counts
        .as_slice()
        .iter()
        .map(|&c| (c as f64 + smoothing) / denominator)
        .collect();
    ScoreMatrix::from_vec(rows, cols, data)
}

/// Plain normalization without smoothing, for the persisted per-sample
/// probability matrix.
pub fn raw_probability(counts: &CountMatrix, sample_id: Uuid) -> Result<ScoreMatrix> {
    let total = counts.total();
    if total == 0 {
        return Err(ValidationError::ZeroTotalCount(sample_id).into());
    }
    let (rows, cols) = counts.shape();
    let data = counts
        .as_slice()
        .iter()
        .map(|&c| c as f64 / total as f64)
        .collect();
    ScoreMatrix::from_vec(rows, cols, data)
}

/// Build the log-likelihood-ratio score matrix from a matched and a random
/// sample.
///
/// Both samples must be `Complete` and share the bin grid. Each bin scores
/// `log2(p_match / p_random)` after smoothing, so a correspondence that is
/// more probable under the matched model than under the random model scores
/// positive.
pub fn build_score_matrix(matched: &Sample, random: &Sample, smoothing: f64) -> Result<ScoreMatrix> {
    let matched_counts = matched.require_complete()?;
    let random_counts = random.require_complete()?;
    if matched_counts.shape() != random_counts.shape() {
        return Err(ValidationError::ShapeMismatch {
            expected: matched_counts.shape(),
            actual: random_counts.shape(),
        }
        .into());
    }

    let p_match = smoothed_probability(matched_counts, matched.id, smoothing)?;
    let p_random = smoothed_probability(random_counts, random.id, smoothing)?;

    let (rows, cols) = matched_counts.shape();
    let data = p_match
        .as_slice()
        .iter()
        .zip(p_random.as_slice())
        .map(|(&m, &r)| (m / r).log2())
        .collect();
    ScoreMatrix::from_vec(rows, cols, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;
    use crate::types::ObjectRef;

    /// A sample forced into `Complete` with the given counts.
    fn complete_sample(rows: &[Vec<u64>]) -> Sample {
        let mut sample = Sample::new(None, &[(ObjectRef::skeleton(1), ObjectRef::skeleton(2))]);
        sample.histogram = Some(CountMatrix::from_rows(rows).unwrap());
        let token = Uuid::new_v4();
        let mut job = JobState::queued();
        job.claim(token).unwrap();
        job.complete(token).unwrap();
        sample.job = job;
        sample
    }

    #[test]
    fn zero_total_count_is_rejected() {
        let empty = complete_sample(&[vec![0, 0], vec![0, 0]]);
        let err = smoothed_probability(empty.histogram.as_ref().unwrap(), empty.id, 0.01)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Validation(ValidationError::ZeroTotalCount(id))
                if id == empty.id
        ));
    }

    #[test]
    fn mismatched_grids_are_rejected() {
        let matched = complete_sample(&[vec![1, 1], vec![1, 1]]);
        let random = complete_sample(&[vec![1, 1, 1], vec![1, 1, 1]]);
        let err = build_score_matrix(&matched, &random, 0.01).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Validation(ValidationError::ShapeMismatch {
                expected: (2, 2),
                actual: (2, 3),
            })
        ));
    }

    #[test]
    fn incomplete_sample_is_a_precondition_failure() {
        let matched = complete_sample(&[vec![1]]);
        let random = Sample::new(None, &[]);
        let err = build_score_matrix(&matched, &random, 0.01).unwrap_err();
        assert!(matches!(err, crate::error::NblastError::Precondition(_)));
    }

    #[test]
    fn smoothed_probability_sums_to_one() {
        let sample = complete_sample(&[vec![3, 0], vec![0, 1]]);
        let p = smoothed_probability(sample.histogram.as_ref().unwrap(), sample.id, 0.01).unwrap();
        let sum: f64 = p.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        // Smoothing keeps empty bins strictly positive.
        assert!(p.get(0, 1) > 0.0);
    }

    #[test]
    fn log_ratio_signs_match_the_models() {
        // Matched mass concentrated on the diagonal, random spread uniformly.
        let matched = complete_sample(&[vec![2, 0], vec![0, 2], vec![0, 0]]);
        let random = complete_sample(&[vec![1, 1], vec![1, 1], vec![1, 1]]);
        let scores = build_score_matrix(&matched, &random, 0.01).unwrap();

        assert_eq!(scores.shape(), (3, 2));
        // Diagonal bins: strongly positive.
        assert!(scores.get(0, 0) > 1.0, "got {}", scores.get(0, 0));
        assert!(scores.get(1, 1) > 1.0, "got {}", scores.get(1, 1));
        // Everything else: strongly negative.
        for (r, c) in [(0, 1), (1, 0), (2, 0), (2, 1)] {
            assert!(scores.get(r, c) < -1.0, "bin ({}, {}) = {}", r, c, scores.get(r, c));
        }
    }
}
