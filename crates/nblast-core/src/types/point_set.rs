//! Point set entity: a named, immutable flat list of 3D coordinates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::types::Point3;

/// A self-contained list of points, stored flattened as `[x, y, z, x, y, z, …]`.
///
/// The flat layout mirrors how the surrounding store persists point sets; the
/// length-divisible-by-3 invariant is enforced at construction and the
/// coordinates never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    /// Stable entity id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last edit timestamp (metadata only; coordinates are immutable).
    pub edited_at: DateTime<Utc>,
    points: Vec<f64>,
}

impl PointSet {
    /// Create a point set from flattened coordinates.
    ///
    /// Fails with [`ValidationError::PointsNotTriples`] when the coordinate
    /// array length is not divisible by 3.
    pub fn new(name: impl Into<String>, points: Vec<f64>) -> Result<Self> {
        if points.len() % 3 != 0 {
            return Err(ValidationError::PointsNotTriples { len: points.len() }.into());
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            created_at: now,
            edited_at: now,
            points,
        })
    }

    /// Attach a description (builder-style, at creation time).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Number of points (coordinate triples).
    pub fn len(&self) -> usize {
        self.points.len() / 3
    }

    /// Whether the set holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The raw flattened coordinates.
    pub fn raw(&self) -> &[f64] {
        &self.points
    }

    /// Coordinates as structured points.
    pub fn points(&self) -> Vec<Point3> {
        self.points
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_triple_length() {
        let err = PointSet::new("bad", vec![1.0, 2.0, 3.0, 4.0]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Validation(ValidationError::PointsNotTriples { len: 4 })
        ));
    }

    #[test]
    fn unflattens_points() {
        let ps = PointSet::new("ok", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(ps.len(), 2);
        assert_eq!(ps.points()[1], Point3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn empty_set_is_valid() {
        let ps = PointSet::new("empty", vec![]).unwrap();
        assert!(ps.is_empty());
        assert_eq!(ps.len(), 0);
    }
}
