//! Engine façade: the three blocking compute calls, each driving its owned
//! entity through the full job lifecycle.
//!
//! Validation failures are returned synchronously, before the entity ever
//! leaves `Queued`. Failures inside the claimed computation are caught here
//! at the job boundary and recorded as the `Error` status with a message; an
//! external executor layering asynchronous semantics on top expects a
//! terminal status, not a propagated fault.

use rayon::prelude::*;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ComputationError, NblastError, Result, ValidationError};
use crate::geometry::{build_dotprops, DotProps, ObjectResolver};
use crate::job::{CancelToken, CANCELED_MESSAGE};
use crate::scoring::bins::{validate_breaks, validate_dot_breaks};
use crate::scoring::{
    accumulate_histogram, build_score_matrix, raw_probability, compute_scoring, ScoreLookup,
};
use crate::types::{
    Config, ConfigTuning, CountMatrix, ErrorMode, ObjectRef, Sample, ScoreMatrix, Similarity,
    Symmetry,
};

/// The similarity engine: pure computational contracts over an external
/// geometry resolver.
///
/// Each call is synchronous and bounded; scheduling across units of work is
/// the external executor's concern.
pub struct NblastEngine<R: ObjectResolver> {
    resolver: R,
}

impl<R: ObjectResolver> NblastEngine<R> {
    /// Create an engine over `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// The underlying resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Build a sample by accumulating the joint histogram over `pairs`.
    ///
    /// Whether the result is a matched or a random sample depends entirely
    /// on how the caller drew the pairs. The returned entity is terminal:
    /// `Complete` with histogram and probability populated, or `Error` with
    /// a recorded message.
    pub fn build_sample(
        &self,
        name: Option<String>,
        pairs: &[(ObjectRef, ObjectRef)],
        distance_breaks: &[f64],
        dot_breaks: &[f64],
        tuning: ConfigTuning,
        cancel: &CancelToken,
    ) -> Result<Sample> {
        validate_breaks("distance_breaks", distance_breaks)?;
        validate_dot_breaks(dot_breaks)?;
        tuning.validate()?;

        let mut sample = Sample::new(name, pairs);
        let token = Uuid::new_v4();
        sample.job.claim(token)?;
        info!(
            sample_id = %sample.id,
            pairs = pairs.len(),
            "accumulating sample histogram"
        );

        let outcome = self.accumulate(&sample, pairs, distance_breaks, dot_breaks, &tuning, cancel);
        match outcome {
            Ok((histogram, probability)) => {
                debug!(sample_id = %sample.id, total = histogram.total(), "sample complete");
                sample.histogram = Some(histogram);
                sample.probability = probability;
                sample.job.complete(token)?;
            }
            Err(error) => {
                warn!(sample_id = %sample.id, %error, "sample failed");
                sample.job.fail(token, job_message(&error))?;
            }
        }
        Ok(sample)
    }

    fn accumulate(
        &self,
        sample: &Sample,
        pairs: &[(ObjectRef, ObjectRef)],
        distance_breaks: &[f64],
        dot_breaks: &[f64],
        tuning: &ConfigTuning,
        cancel: &CancelToken,
    ) -> Result<(CountMatrix, Option<ScoreMatrix>)> {
        let resolved = self.resolve_pairs(pairs, tuning, cancel)?;
        let histogram = accumulate_histogram(&resolved, distance_breaks, dot_breaks, cancel)?;
        let probability = if histogram.total() > 0 {
            Some(raw_probability(&histogram, sample.id)?)
        } else {
            None
        };
        Ok((histogram, probability))
    }

    /// Resolve both sides of every pair up front, in parallel. The first
    /// failure in pair order wins, keeping error reporting deterministic.
    fn resolve_pairs(
        &self,
        pairs: &[(ObjectRef, ObjectRef)],
        tuning: &ConfigTuning,
        cancel: &CancelToken,
    ) -> Result<Vec<(DotProps, DotProps)>> {
        let resolved: Vec<Result<(DotProps, DotProps)>> = pairs
            .par_iter()
            .map(|(a, b)| {
                if cancel.is_canceled() {
                    return Err(ComputationError::Canceled.into());
                }
                Ok((self.resolve_one(a, tuning)?, self.resolve_one(b, tuning)?))
            })
            .collect();
        resolved.into_iter().collect()
    }

    fn resolve_one(&self, object: &ObjectRef, tuning: &ConfigTuning) -> Result<DotProps> {
        self.resolver
            .resolve(object)
            .and_then(|resolved| build_dotprops(resolved, tuning))
            .map_err(|source| {
                ComputationError::Resolution {
                    kind: object.kind.as_str(),
                    id: object.id,
                    source: Box::new(source),
                }
                .into()
            })
    }

    /// Build a config: validate the bin grid against both samples, then
    /// derive the log-likelihood-ratio score matrix.
    ///
    /// All validation (breaks, tuning, sample completeness, grid shape, zero
    /// totals) happens synchronously before the entity is claimed; the
    /// remaining log-ratio arithmetic cannot fail.
    pub fn build_config(
        &self,
        name: impl Into<String>,
        distance_breaks: Vec<f64>,
        dot_breaks: Vec<f64>,
        tuning: ConfigTuning,
        matched: &Sample,
        random: &Sample,
        cancel: &CancelToken,
    ) -> Result<Config> {
        let mut config = Config::new(
            name,
            distance_breaks,
            dot_breaks,
            tuning,
            matched.id,
            random.id,
        )?;
        for sample in [matched, random] {
            let counts = sample.require_complete()?;
            if counts.shape() != config.bin_shape() {
                return Err(ValidationError::ShapeMismatch {
                    expected: config.bin_shape(),
                    actual: counts.shape(),
                }
                .into());
            }
            if counts.total() == 0 {
                return Err(ValidationError::ZeroTotalCount(sample.id).into());
            }
        }

        let token = Uuid::new_v4();
        config.job.claim(token)?;
        info!(config_id = %config.id, shape = ?config.bin_shape(), "building score matrix");

        if cancel.is_canceled() {
            config.job.fail(token, CANCELED_MESSAGE)?;
            return Ok(config);
        }
        match build_score_matrix(matched, random, config.tuning.smoothing) {
            Ok(scoring) => {
                config.scoring = Some(scoring);
                config.job.complete(token)?;
            }
            Err(error) => {
                warn!(config_id = %config.id, %error, "score matrix derivation failed");
                config.job.fail(token, job_message(&error))?;
            }
        }
        Ok(config)
    }

    /// Compute the pairwise query × target scoring matrix under a complete
    /// config.
    ///
    /// Empty query or target lists complete with a zero-dimension matrix.
    /// Per-pair failures follow `mode`; cancellation always fails the job
    /// with the distinguished "canceled" message.
    pub fn compute_similarity(
        &self,
        name: impl Into<String>,
        config: &Config,
        queries: Vec<ObjectRef>,
        targets: Vec<ObjectRef>,
        mode: ErrorMode,
        symmetry: Symmetry,
        cancel: &CancelToken,
    ) -> Result<Similarity> {
        // Precondition check up front, before the entity is created.
        ScoreLookup::from_config(config)?;

        let mut similarity =
            Similarity::new(name, config.id, queries, targets, mode, symmetry);
        let token = Uuid::new_v4();
        similarity.job.claim(token)?;
        info!(
            similarity_id = %similarity.id,
            queries = similarity.query_objects.len(),
            targets = similarity.target_objects.len(),
            ?mode,
            ?symmetry,
            "computing similarity"
        );

        let outcome = compute_scoring(
            &self.resolver,
            config,
            &similarity.query_objects,
            &similarity.target_objects,
            mode,
            symmetry,
            cancel,
        );
        match outcome {
            Ok(scoring) => {
                similarity.scoring = Some(scoring);
                similarity.job.complete(token)?;
            }
            Err(error) => {
                warn!(similarity_id = %similarity.id, %error, "similarity failed");
                similarity.job.fail(token, job_message(&error))?;
            }
        }
        Ok(similarity)
    }
}

/// Message recorded on the entity for a failed job; cancellation gets its
/// distinguished message so executors can tell it from a genuine fault.
fn job_message(error: &NblastError) -> String {
    if error.is_canceled() {
        CANCELED_MESSAGE.to_string()
    } else {
        error.to_string()
    }
}
