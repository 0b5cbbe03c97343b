//! Histogram accumulation over object-pair point correspondences.
//!
//! For every pair `(a, b)` and every point in `a`, the nearest neighbor in
//! `b` yields one `(distance, |tangent dot|)` measurement, binned into the
//! joint 2D grid. Accumulation is plain integer addition, so the parallel
//! fold over pairs merges per-worker partial matrices at the join point into
//! a result that is bit-identical for any worker-pool size.

use rayon::prelude::*;

use crate::error::{ComputationError, Result};
use crate::geometry::DotProps;
use crate::job::CancelToken;
use crate::types::{CountMatrix, Point3};

use super::bins::{bin_index, validate_breaks, validate_dot_breaks};

/// Accumulate the joint histogram over all point pairs.
///
/// Pair-source-agnostic: matched vs random is a property of how the caller
/// drew the pairs. A pair with an empty side contributes no counts; every
/// point of a non-empty `a` against a non-empty `b` contributes exactly one
/// count (out-of-range measurements clamp to edge bins).
pub fn accumulate_histogram(
    pairs: &[(DotProps, DotProps)],
    distance_breaks: &[f64],
    dot_breaks: &[f64],
    cancel: &CancelToken,
) -> Result<CountMatrix> {
    validate_breaks("distance_breaks", distance_breaks)?;
    validate_dot_breaks(dot_breaks)?;
    let rows = distance_breaks.len() - 1;
    let cols = dot_breaks.len() - 1;

    let counts = pairs
        .par_iter()
        .try_fold(
            || CountMatrix::zeros(rows, cols),
            |mut local, (a, b)| -> Result<CountMatrix> {
                if !cancel.is_canceled() {
                    accumulate_pair(&mut local, a, b, distance_breaks, dot_breaks);
                }
                Ok(local)
            },
        )
        .try_reduce(
            || CountMatrix::zeros(rows, cols),
            |mut merged, partial| {
                merged.merge(&partial)?;
                Ok(merged)
            },
        )?;

    if cancel.is_canceled() {
        return Err(ComputationError::Canceled.into());
    }
    Ok(counts)
}

fn accumulate_pair(
    counts: &mut CountMatrix,
    a: &DotProps,
    b: &DotProps,
    distance_breaks: &[f64],
    dot_breaks: &[f64],
) {
    if b.is_empty() {
        return;
    }
    for (point, tangent) in a.points.iter().zip(&a.tangents) {
        let (neighbor, dist2) = nearest_neighbor(point, &b.points);
        let distance = dist2.sqrt();
        let alignment = tangent.dot(&b.tangents[neighbor]).abs();
        counts.incr(
            bin_index(distance, distance_breaks),
            bin_index(alignment, dot_breaks),
        );
    }
}

/// Index and squared distance of the nearest neighbor of `point` in `points`.
///
/// Linear scan; ties resolve to the lowest index so results are independent
/// of execution order. Caller guarantees `points` is non-empty.
pub(crate) fn nearest_neighbor(point: &Point3, points: &[Point3]) -> (usize, f64) {
    let mut best = 0;
    let mut best_dist2 = point.dist2(&points[0]);
    for (i, q) in points.iter().enumerate().skip(1) {
        let d2 = point.dist2(q);
        if d2 < best_dist2 {
            best = i;
            best_dist2 = d2;
        }
    }
    (best, best_dist2)
}
