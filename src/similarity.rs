//! Cosine similarity over embedding vectors.
//!
//! Scores are bounded to `[0.0, 1.0]`: cosine's native `[-1, 1]` range is
//! deliberately collapsed, so negative correlation ranks the same as zero
//! correlation.

use crate::embeddings::EmbeddingOutcome;
use crate::{Error, Result};

/// Magnitudes below this are treated as the zero vector.
const ZERO_TOLERANCE: f32 = 1e-8;

pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity clamped into `[0.0, 1.0]`.
///
/// Either vector zero-length returns 0.0. Mismatched dimensions fail with
/// [`Error::DimensionMismatch`]. Either vector numerically all-zero returns
/// 0.0 (cosine is undefined there; this is the defined fallback, not an
/// error). The clamp also absorbs floating-point overshoot past 1.0.
pub fn similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() || b.is_empty() {
        return Ok(0.0);
    }
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    let mag_a = magnitude(a);
    let mag_b = magnitude(b);
    if mag_a < ZERO_TOLERANCE || mag_b < ZERO_TOLERANCE {
        return Ok(0.0);
    }
    let dot = dot_product(a, b)?;
    Ok((dot / (mag_a * mag_b)).clamp(0.0, 1.0))
}

/// One score per candidate, in input order.
///
/// A [`EmbeddingOutcome::Failed`] candidate scores 0.0 rather than
/// propagating an error, so one missing embedding never aborts ranking of
/// the rest. An empty reference fails with [`Error::EmptyReference`]; a
/// dimension mismatch inside an embedded candidate still escalates, since it
/// signals mismatched pipeline wiring.
pub fn similarity_all(reference: &[f32], candidates: &[EmbeddingOutcome]) -> Result<Vec<f32>> {
    if reference.is_empty() {
        return Err(Error::EmptyReference);
    }
    let mut scores = Vec::with_capacity(candidates.len());
    for outcome in candidates {
        let score = match outcome.vector() {
            Some(vector) => similarity(reference, vector)?,
            None => 0.0,
        };
        scores.push(score);
    }
    Ok(scores)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(approx_eq(similarity(&v, &v).unwrap(), 1.0));
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(approx_eq(similarity(&a, &b).unwrap(), 0.0));
    }

    #[test]
    fn opposite_vectors_clamp_to_zero() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, -2.0, -3.0];
        assert_eq!(similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn zero_vector_scores_exactly_zero() {
        let v = vec![1.0, 1.0];
        let zero = vec![0.0, 0.0];
        assert_eq!(similarity(&v, &zero).unwrap(), 0.0);
        assert_eq!(similarity(&zero, &v).unwrap(), 0.0);
    }

    #[test]
    fn near_zero_vector_is_treated_as_zero() {
        let v = vec![1.0, 1.0];
        let tiny = vec![1e-12, -1e-12];
        assert_eq!(similarity(&v, &tiny).unwrap(), 0.0);
    }

    #[test]
    fn empty_vectors_score_zero() {
        assert_eq!(similarity(&[], &[]).unwrap(), 0.0);
        assert_eq!(similarity(&[], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn mismatched_dimensions_fail() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 2.0];
        match similarity(&a, &b) {
            Err(Error::DimensionMismatch { left, right }) => {
                assert_eq!(left, 3);
                assert_eq!(right, 2);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn scores_never_leave_the_unit_interval() {
        let a = vec![0.3, 0.7, 0.1];
        let candidates = [
            vec![0.3, 0.7, 0.1],
            vec![-0.3, -0.7, -0.1],
            vec![1000.0, 0.0, 0.0],
        ];
        for c in &candidates {
            let s = similarity(&a, c).unwrap();
            assert!((0.0..=1.0).contains(&s), "score {s} out of range");
        }
    }

    #[test]
    fn similarity_all_scores_in_input_order() {
        let reference = vec![1.0, 0.0];
        let candidates = vec![
            EmbeddingOutcome::Embedded(vec![1.0, 0.0]),
            EmbeddingOutcome::Embedded(vec![0.0, 1.0]),
        ];
        let scores = similarity_all(&reference, &candidates).unwrap();
        assert!(approx_eq(scores[0], 1.0));
        assert!(approx_eq(scores[1], 0.0));
    }

    #[test]
    fn failed_candidate_scores_zero() {
        let reference = vec![1.0, 0.0];
        let candidates = vec![
            EmbeddingOutcome::Failed,
            EmbeddingOutcome::Embedded(vec![1.0, 0.0]),
        ];
        let scores = similarity_all(&reference, &candidates).unwrap();
        assert_eq!(scores[0], 0.0);
        assert!(approx_eq(scores[1], 1.0));
    }

    #[test]
    fn empty_reference_fails() {
        let candidates = vec![EmbeddingOutcome::Embedded(vec![1.0, 0.0])];
        assert!(matches!(
            similarity_all(&[], &candidates),
            Err(Error::EmptyReference)
        ));
    }

    #[test]
    fn mismatched_candidate_dimension_escalates() {
        let reference = vec![1.0, 0.0];
        let candidates = vec![EmbeddingOutcome::Embedded(vec![1.0, 0.0, 0.0])];
        assert!(matches!(
            similarity_all(&reference, &candidates),
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
