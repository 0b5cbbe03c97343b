//! Similarity entity: a pairwise query × target scoring result derived from
//! one complete Config.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::job::JobState;
use crate::types::{ObjectRef, ScoreMatrix};

/// How per-pair computation failures are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// First per-pair failure escalates the whole job to `Error`.
    #[default]
    FailFast,
    /// Failing entries become `NaN`; the job still completes.
    BestEffort,
}

/// Directionality of the reported score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symmetry {
    /// Report `S(q, t)` only.
    #[default]
    OneDirectional,
    /// Report `(S(q, t) + S(t, q)) / 2`, removing nearest-neighbor asymmetry
    /// at twice the per-pair cost.
    Mean,
}

/// Pairwise similarity result over `queries × targets`.
///
/// `scoring[i][j]` is the mean per-point score of query `i` against target
/// `j`; entries are `NaN` where a best-effort per-pair computation failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Stable entity id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// The complete Config this result was computed with (by id).
    pub config_id: Uuid,
    /// Query objects, row order of `scoring`.
    pub query_objects: Vec<ObjectRef>,
    /// Target objects, column order of `scoring`.
    pub target_objects: Vec<ObjectRef>,
    /// Error-reporting mode the computation ran under.
    pub mode: ErrorMode,
    /// Score directionality.
    pub symmetry: Symmetry,
    /// Derived `|queries| × |targets|` matrix, present once complete.
    pub scoring: Option<ScoreMatrix>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Job lifecycle state.
    pub job: JobState,
}

impl Similarity {
    /// Fresh similarity in `Queued`.
    pub fn new(
        name: impl Into<String>,
        config_id: Uuid,
        query_objects: Vec<ObjectRef>,
        target_objects: Vec<ObjectRef>,
        mode: ErrorMode,
        symmetry: Symmetry,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            config_id,
            query_objects,
            target_objects,
            mode,
            symmetry,
            scoring: None,
            created_at: Utc::now(),
            job: JobState::queued(),
        }
    }
}
