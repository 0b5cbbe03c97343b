//! In-memory geometry registry.
//!
//! A stand-in for the surrounding persistence layer in tests and batch runs:
//! it maps external object ids to raw geometry and implements
//! [`ObjectResolver`]. The engine itself never talks to storage; it only
//! accepts a resolver.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{GeometryError, Result};
use crate::geometry::{ObjectResolver, ResolvedObject};
use crate::types::{ObjectKind, ObjectRef, Point3, PointSet};

#[derive(Debug, Clone)]
struct SkeletonGeometry {
    nodes: Vec<Point3>,
    edges: Vec<(usize, usize)>,
}

#[derive(Debug, Clone)]
struct CloudGeometry {
    points: Vec<Point3>,
    tangents: Option<Vec<Point3>>,
}

/// Thread-safe map from external object ids to geometry.
#[derive(Debug, Default)]
pub struct Registry {
    skeletons: RwLock<HashMap<u64, SkeletonGeometry>>,
    pointclouds: RwLock<HashMap<u64, CloudGeometry>>,
    point_sets: RwLock<HashMap<u64, PointSet>>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skeleton's nodes and connectivity under `id`.
    pub fn insert_skeleton(&self, id: u64, nodes: Vec<Point3>, edges: Vec<(usize, usize)>) {
        self.skeletons
            .write()
            .insert(id, SkeletonGeometry { nodes, edges });
    }

    /// Register a point cloud under `id`.
    pub fn insert_pointcloud(&self, id: u64, points: Vec<Point3>) {
        self.pointclouds
            .write()
            .insert(id, CloudGeometry { points, tangents: None });
    }

    /// Register a point cloud with precomputed tangent hints.
    pub fn insert_pointcloud_with_tangents(
        &self,
        id: u64,
        points: Vec<Point3>,
        tangents: Vec<Point3>,
    ) {
        self.pointclouds
            .write()
            .insert(id, CloudGeometry { points, tangents: Some(tangents) });
    }

    /// Register a point set entity under `id`.
    pub fn insert_point_set(&self, id: u64, point_set: PointSet) {
        self.point_sets.write().insert(id, point_set);
    }
}

impl ObjectResolver for Registry {
    fn resolve(&self, object: &ObjectRef) -> Result<ResolvedObject> {
        let unresolvable = || GeometryError::Unresolvable {
            kind: object.kind.as_str(),
            id: object.id,
        };
        match object.kind {
            ObjectKind::Skeleton => {
                let skeletons = self.skeletons.read();
                let skeleton = skeletons.get(&object.id).ok_or_else(unresolvable)?;
                Ok(ResolvedObject::Skeleton {
                    nodes: skeleton.nodes.clone(),
                    edges: skeleton.edges.clone(),
                })
            }
            ObjectKind::PointCloud => {
                let clouds = self.pointclouds.read();
                let cloud = clouds.get(&object.id).ok_or_else(unresolvable)?;
                Ok(ResolvedObject::Points {
                    points: cloud.points.clone(),
                    tangents: cloud.tangents.clone(),
                })
            }
            ObjectKind::PointSet => {
                let sets = self.point_sets.read();
                let set = sets.get(&object.id).ok_or_else(unresolvable)?;
                Ok(ResolvedObject::Points { points: set.points(), tangents: None })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NblastError;

    #[test]
    fn resolves_each_kind() {
        let registry = Registry::new();
        registry.insert_skeleton(
            1,
            vec![Point3::ZERO, Point3::new(1.0, 0.0, 0.0)],
            vec![(0, 1)],
        );
        registry.insert_pointcloud(2, vec![Point3::ZERO]);
        registry.insert_point_set(
            3,
            PointSet::new("s", vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap(),
        );

        assert!(matches!(
            registry.resolve(&ObjectRef::skeleton(1)).unwrap(),
            ResolvedObject::Skeleton { .. }
        ));
        assert!(matches!(
            registry.resolve(&ObjectRef::pointcloud(2)).unwrap(),
            ResolvedObject::Points { .. }
        ));
        match registry.resolve(&ObjectRef::pointset(3)).unwrap() {
            ResolvedObject::Points { points, tangents } => {
                assert_eq!(points.len(), 2);
                assert!(tangents.is_none());
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn missing_objects_are_unresolvable() {
        let registry = Registry::new();
        let err = registry.resolve(&ObjectRef::skeleton(7)).unwrap_err();
        assert!(matches!(
            err,
            NblastError::Geometry(GeometryError::Unresolvable { kind: "skeleton", id: 7 })
        ));
    }
}
