//! Pairwise similarity scoring against a complete Config.
//!
//! Each `(query, target)` pair is scored by summing the score-matrix lookup
//! for every query point's nearest target neighbor, divided by the query
//! point count. Pairs are independent, so they run across the worker pool;
//! within a pair the summation follows the query's original point order, so
//! the result is bit-reproducible for any pool size.

use rayon::prelude::*;

use crate::error::{ComputationError, Result, ValidationError};
use crate::geometry::{build_dotprops, DotProps, ObjectResolver};
use crate::job::CancelToken;
use crate::types::{Config, ErrorMode, ObjectRef, ScoreMatrix, Symmetry};

use super::bins::bin_index;
use super::histogram::nearest_neighbor;

/// Score lookup over a complete Config's bin grid.
#[derive(Debug, Clone, Copy)]
pub struct ScoreLookup<'a> {
    matrix: &'a ScoreMatrix,
    distance_breaks: &'a [f64],
    dot_breaks: &'a [f64],
}

impl<'a> ScoreLookup<'a> {
    /// Borrow the lookup from a complete Config.
    ///
    /// Fails with a precondition error for an incomplete Config, and with
    /// [`ValidationError::ShapeMismatch`] when the persisted matrix does not
    /// match the bin grid implied by the breaks.
    pub fn from_config(config: &'a Config) -> Result<Self> {
        let matrix = config.require_score_matrix()?;
        if matrix.shape() != config.bin_shape() {
            return Err(ValidationError::ShapeMismatch {
                expected: config.bin_shape(),
                actual: matrix.shape(),
            }
            .into());
        }
        Ok(Self {
            matrix,
            distance_breaks: &config.distance_breaks,
            dot_breaks: &config.dot_breaks,
        })
    }

    /// Score a single point correspondence.
    pub fn score(&self, distance: f64, alignment: f64) -> f64 {
        self.matrix.get(
            bin_index(distance, self.distance_breaks),
            bin_index(alignment, self.dot_breaks),
        )
    }
}

/// One-directional mean score `S(q, t)`.
///
/// Caller guarantees both sides are non-empty. Iterates `q`'s points in their
/// original order; the mean makes the score independent of query length.
pub fn one_directional_score(lookup: &ScoreLookup<'_>, query: &DotProps, target: &DotProps) -> f64 {
    let mut sum = 0.0;
    for (point, tangent) in query.points.iter().zip(&query.tangents) {
        let (neighbor, dist2) = nearest_neighbor(point, &target.points);
        let alignment = tangent.dot(&target.tangents[neighbor]).abs();
        sum += lookup.score(dist2.sqrt(), alignment);
    }
    sum / query.len() as f64
}

/// Compute the `|queries| × |targets|` scoring matrix.
///
/// Empty `queries` or `targets` yield a zero-dimension matrix, never an
/// error. Per-pair failures follow `mode`: `FailFast` escalates the first
/// failure (in row-major pair order), `BestEffort` marks the entry `NaN` and
/// keeps going. Cancellation escalates regardless of mode.
pub fn compute_scoring<R: ObjectResolver>(
    resolver: &R,
    config: &Config,
    queries: &[ObjectRef],
    targets: &[ObjectRef],
    mode: ErrorMode,
    symmetry: Symmetry,
    cancel: &CancelToken,
) -> Result<ScoreMatrix> {
    let lookup = ScoreLookup::from_config(config)?;
    let (nq, nt) = (queries.len(), targets.len());
    if nq == 0 || nt == 0 {
        return Ok(ScoreMatrix::zeros(nq, nt));
    }

    let resolved_queries = resolve_all(resolver, config, queries, cancel);
    let resolved_targets = resolve_all(resolver, config, targets, cancel);
    if cancel.is_canceled() {
        return Err(ComputationError::Canceled.into());
    }

    let entries: Vec<std::result::Result<f64, ComputationError>> = (0..nq * nt)
        .into_par_iter()
        .map(|index| {
            if cancel.is_canceled() {
                return Err(ComputationError::Canceled);
            }
            let (qi, ti) = (index / nt, index % nt);
            pair_score(
                &lookup,
                &resolved_queries[qi],
                qi,
                &resolved_targets[ti],
                ti,
                symmetry,
            )
        })
        .collect();

    if cancel.is_canceled() {
        return Err(ComputationError::Canceled.into());
    }

    let mut scoring = ScoreMatrix::zeros(nq, nt);
    for (index, entry) in entries.into_iter().enumerate() {
        let value = match entry {
            Ok(value) => value,
            Err(error) => match mode {
                ErrorMode::FailFast => return Err(error.into()),
                ErrorMode::BestEffort => f64::NAN,
            },
        };
        scoring.set(index / nt, index % nt, value);
    }
    Ok(scoring)
}

/// Resolve every object once, up front; per-object failures are kept so the
/// pair loop can report them under the configured error mode.
fn resolve_all<R: ObjectResolver>(
    resolver: &R,
    config: &Config,
    objects: &[ObjectRef],
    cancel: &CancelToken,
) -> Vec<std::result::Result<DotProps, ComputationError>> {
    objects
        .par_iter()
        .map(|object| {
            if cancel.is_canceled() {
                return Err(ComputationError::Canceled);
            }
            resolver
                .resolve(object)
                .and_then(|resolved| build_dotprops(resolved, &config.tuning))
                .map_err(|source| ComputationError::Resolution {
                    kind: object.kind.as_str(),
                    id: object.id,
                    source: Box::new(source),
                })
        })
        .collect()
}

fn pair_score(
    lookup: &ScoreLookup<'_>,
    query: &std::result::Result<DotProps, ComputationError>,
    query_index: usize,
    target: &std::result::Result<DotProps, ComputationError>,
    target_index: usize,
    symmetry: Symmetry,
) -> std::result::Result<f64, ComputationError> {
    let query = query.as_ref().map_err(Clone::clone)?;
    let target = target.as_ref().map_err(Clone::clone)?;
    if query.is_empty() {
        return Err(ComputationError::EmptyQuery(query_index));
    }
    if target.is_empty() {
        return Err(ComputationError::EmptyTarget(target_index));
    }
    let forward = one_directional_score(lookup, query, target);
    Ok(match symmetry {
        Symmetry::OneDirectional => forward,
        Symmetry::Mean => {
            let backward = one_directional_score(lookup, target, query);
            (forward + backward) / 2.0
        }
    })
}
