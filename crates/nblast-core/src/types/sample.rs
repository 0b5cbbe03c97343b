//! Sample entity: an accumulated histogram over many object-pair point
//! correspondences.
//!
//! Matched and random samples share this structure; the distinction is pure
//! provenance (how the caller selected the pairs), never a structural flag
//! the accumulation algorithm looks at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PreconditionError, Result};
use crate::job::{JobState, JobStatus};
use crate::types::{CountMatrix, ObjectKind, ObjectRef, ScoreMatrix};

/// Accumulation result over object pairs: the joint 2D histogram of
/// (nearest-neighbor distance, tangent alignment) plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Stable entity id.
    pub id: Uuid,
    /// Display name.
    pub name: Option<String>,
    /// Skeleton ids that contributed pairs.
    pub sample_neurons: Vec<u64>,
    /// Point cloud ids that contributed pairs.
    pub sample_pointclouds: Vec<u64>,
    /// Point set ids that contributed pairs.
    pub sample_pointsets: Vec<u64>,
    /// Accumulated counts, present once computed.
    pub histogram: Option<CountMatrix>,
    /// Normalized histogram (sums to 1), derived on completion.
    pub probability: Option<ScoreMatrix>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Job lifecycle state.
    pub job: JobState,
}

impl Sample {
    /// Fresh sample in `Queued`, provenance recorded from the pair list.
    pub fn new(name: Option<String>, pairs: &[(ObjectRef, ObjectRef)]) -> Self {
        let mut sample = Self {
            id: Uuid::new_v4(),
            name,
            sample_neurons: Vec::new(),
            sample_pointclouds: Vec::new(),
            sample_pointsets: Vec::new(),
            histogram: None,
            probability: None,
            created_at: Utc::now(),
            job: JobState::queued(),
        };
        for (a, b) in pairs {
            sample.record_provenance(a);
            sample.record_provenance(b);
        }
        sample
    }

    fn record_provenance(&mut self, object: &ObjectRef) {
        let list = match object.kind {
            ObjectKind::Skeleton => &mut self.sample_neurons,
            ObjectKind::PointCloud => &mut self.sample_pointclouds,
            ObjectKind::PointSet => &mut self.sample_pointsets,
        };
        if !list.contains(&object.id) {
            list.push(object.id);
        }
    }

    /// The histogram of a complete sample.
    ///
    /// Fails with [`PreconditionError::NotComplete`] when the sample has not
    /// finished computing.
    pub fn require_complete(&self) -> Result<&CountMatrix> {
        if self.job.status != JobStatus::Complete {
            return Err(PreconditionError::NotComplete {
                entity: "Sample",
                id: self.id,
                status: self.job.status.as_str(),
            }
            .into());
        }
        // A Complete sample always carries its histogram; the engine populates
        // it before the status transition.
        self.histogram
            .as_ref()
            .ok_or_else(|| {
                PreconditionError::NotComplete {
                    entity: "Sample",
                    id: self.id,
                    status: self.job.status.as_str(),
                }
                .into()
            })
    }
}
