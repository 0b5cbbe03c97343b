//! Config entity: bin grid, tuning parameters, sample references and the
//! derived log-likelihood-ratio score matrix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PreconditionError, Result, ValidationError};
use crate::job::{JobState, JobStatus};
use crate::scoring::bins::{validate_breaks, validate_dot_breaks};
use crate::types::ScoreMatrix;

/// Default resampling step along skeleton edges, in project units (nm).
pub const DEFAULT_RESAMPLE_STEP: f64 = 1000.0;

/// Default tangent neighborhood size.
pub const DEFAULT_TANGENT_NEIGHBORS: usize = 20;

/// Default additive smoothing applied before histogram normalization.
pub const DEFAULT_SMOOTHING: f64 = 1e-6;

/// Tuning parameters shared by sampling and similarity computation.
///
/// Passed explicitly on every call and persisted on the Config entity, so
/// behavior is fully determined by persisted fields rather than process-wide
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigTuning {
    /// Spacing of resampled skeleton points along edges. Must be positive.
    pub resample_step: f64,
    /// Nearest neighbors used per point for tangent estimation. Must be ≥ 1.
    pub tangent_neighbors: usize,
    /// Additive smoothing ε applied to every bin before normalizing.
    pub smoothing: f64,
}

impl Default for ConfigTuning {
    fn default() -> Self {
        Self {
            resample_step: DEFAULT_RESAMPLE_STEP,
            tangent_neighbors: DEFAULT_TANGENT_NEIGHBORS,
            smoothing: DEFAULT_SMOOTHING,
        }
    }
}

impl ConfigTuning {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if !(self.resample_step > 0.0) || !self.resample_step.is_finite() {
            return Err(ValidationError::InvalidTuning {
                name: "resample_step",
                reason: format!("must be a positive finite number, got {}", self.resample_step),
            }
            .into());
        }
        if self.tangent_neighbors < 1 {
            return Err(ValidationError::InvalidTuning {
                name: "tangent_neighbors",
                reason: "must be at least 1".into(),
            }
            .into());
        }
        if !(self.smoothing > 0.0) || !self.smoothing.is_finite() {
            return Err(ValidationError::InvalidTuning {
                name: "smoothing",
                reason: format!("must be a positive finite number, got {}", self.smoothing),
            }
            .into());
        }
        Ok(())
    }
}

/// A scoring configuration: bin edges, tuning, matched/random sample
/// references and, once complete, the derived score matrix.
///
/// Immutable once `Complete`; a retry is a fresh Config, never an in-place
/// mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Stable entity id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Strictly increasing distance bin edges (length ≥ 2).
    pub distance_breaks: Vec<f64>,
    /// Strictly increasing dot-alignment bin edges within [-1, 1] (length ≥ 2).
    pub dot_breaks: Vec<f64>,
    /// Tuning parameters.
    pub tuning: ConfigTuning,
    /// Matched sample reference (by id, resolved externally).
    pub match_sample_id: Uuid,
    /// Random sample reference (by id, resolved externally).
    pub random_sample_id: Uuid,
    /// Derived log2 likelihood-ratio scores, present once complete.
    pub scoring: Option<ScoreMatrix>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Job lifecycle state.
    pub job: JobState,
}

impl Config {
    /// Fresh config in `Queued`. Validates breaks and tuning synchronously.
    pub fn new(
        name: impl Into<String>,
        distance_breaks: Vec<f64>,
        dot_breaks: Vec<f64>,
        tuning: ConfigTuning,
        match_sample_id: Uuid,
        random_sample_id: Uuid,
    ) -> Result<Self> {
        validate_breaks("distance_breaks", &distance_breaks)?;
        validate_dot_breaks(&dot_breaks)?;
        tuning.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            distance_breaks,
            dot_breaks,
            tuning,
            match_sample_id,
            random_sample_id,
            scoring: None,
            created_at: Utc::now(),
            job: JobState::queued(),
        })
    }

    /// Bin grid shape implied by the breaks: `(distance_bins, dot_bins)`.
    pub fn bin_shape(&self) -> (usize, usize) {
        (self.distance_breaks.len() - 1, self.dot_breaks.len() - 1)
    }

    /// The score matrix of a complete config.
    ///
    /// Fails with [`PreconditionError`] when the config is not `Complete` or
    /// its derived matrix is missing.
    pub fn require_score_matrix(&self) -> Result<&ScoreMatrix> {
        if self.job.status != JobStatus::Complete {
            return Err(PreconditionError::NotComplete {
                entity: "Config",
                id: self.id,
                status: self.job.status.as_str(),
            }
            .into());
        }
        self.scoring
            .as_ref()
            .ok_or_else(|| PreconditionError::MissingScoreMatrix(self.id).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NblastError;

    fn tuning() -> ConfigTuning {
        ConfigTuning::default()
    }

    #[test]
    fn defaults_match_persisted_column_defaults() {
        let t = ConfigTuning::default();
        assert_eq!(t.resample_step, 1000.0);
        assert_eq!(t.tangent_neighbors, 20);
    }

    #[test]
    fn rejects_non_increasing_breaks() {
        let err = Config::new(
            "c",
            vec![0.0, 1.0, 1.0],
            vec![-1.0, 1.0],
            tuning(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NblastError::Validation(ValidationError::InvalidBreaks {
                name: "distance_breaks",
                ..
            })
        ));
    }

    #[test]
    fn rejects_dot_breaks_outside_unit_interval() {
        let err = Config::new(
            "c",
            vec![0.0, 1.0],
            vec![-1.5, 0.0, 1.0],
            tuning(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NblastError::Validation(ValidationError::InvalidBreaks { name: "dot_breaks", .. })
        ));
    }

    #[test]
    fn rejects_bad_tuning() {
        let bad = ConfigTuning { resample_step: 0.0, ..tuning() };
        assert!(bad.validate().is_err());
        let bad = ConfigTuning { tangent_neighbors: 0, ..tuning() };
        assert!(bad.validate().is_err());
        let bad = ConfigTuning { smoothing: -1.0, ..tuning() };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn incomplete_config_rejects_scoring_access() {
        let config = Config::new(
            "c",
            vec![0.0, 1.0, 2.0],
            vec![-1.0, 0.0, 1.0],
            tuning(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        )
        .unwrap();
        assert_eq!(config.bin_shape(), (2, 2));
        assert!(matches!(
            config.require_score_matrix().unwrap_err(),
            NblastError::Precondition(PreconditionError::NotComplete { entity: "Config", .. })
        ));
    }
}
