//! Object references: the only way query/target members are identified.
//!
//! A reference is a tagged `(kind, id)` pair resolved to geometry by an
//! external [`ObjectResolver`](crate::geometry::ObjectResolver). Adding a new
//! geometry kind means adding a variant and an adapter, not a class hierarchy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of structure an [`ObjectRef`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A traced neuron skeleton (nodes plus connectivity).
    Skeleton,
    /// An arbitrary point cloud.
    PointCloud,
    /// A self-contained flat list of points.
    PointSet,
}

impl ObjectKind {
    /// Stable lowercase name, matching the persisted source-type identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Skeleton => "skeleton",
            ObjectKind::PointCloud => "pointcloud",
            ObjectKind::PointSet => "pointset",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a skeleton, point cloud, or point set by external id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    /// Geometry kind
    pub kind: ObjectKind,
    /// External object id (scoped by the surrounding persistence layer)
    pub id: u64,
}

impl ObjectRef {
    /// Reference a skeleton by id.
    pub fn skeleton(id: u64) -> Self {
        Self { kind: ObjectKind::Skeleton, id }
    }

    /// Reference a point cloud by id.
    pub fn pointcloud(id: u64) -> Self {
        Self { kind: ObjectKind::PointCloud, id }
    }

    /// Reference a point set by id.
    pub fn pointset(id: u64) -> Self {
        Self { kind: ObjectKind::PointSet, id }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}
