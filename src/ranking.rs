//! Top-N selection over scored candidates.

use crate::types::{JobPosting, Recommendation};
use crate::{Error, Result};
use std::cmp::Ordering;
use tracing::debug;

/// Pair candidates with their scores, sort descending, keep the best `n`.
///
/// Ties keep original input order (stable sort, first seen wins). If `n`
/// exceeds the number of candidates, all of them are returned. Each result
/// carries the score rounded to 4 decimal digits and a 1-based rank equal to
/// its output position.
pub fn top_n(jobs: &[JobPosting], scores: &[f32], n: usize) -> Result<Vec<Recommendation>> {
    if jobs.len() != scores.len() {
        return Err(Error::LengthMismatch {
            candidates: jobs.len(),
            scores: scores.len(),
        });
    }
    if jobs.is_empty() {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..jobs.len()).collect();
    order.sort_by(|&i, &j| scores[j].partial_cmp(&scores[i]).unwrap_or(Ordering::Equal));
    order.truncate(n);

    let recommendations: Vec<Recommendation> = order
        .into_iter()
        .enumerate()
        .map(|(position, index)| Recommendation {
            rank: position + 1,
            similarity: round4(scores[index]),
            job: jobs[index].clone(),
        })
        .collect();
    debug!(count = recommendations.len(), "recommendations assembled");
    Ok(recommendations)
}

fn round4(score: f32) -> f32 {
    ((f64::from(score) * 10_000.0).round() / 10_000.0) as f32
}
