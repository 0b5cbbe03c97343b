//! JSON record formats the CLI reads and writes.
//!
//! The core mandates no wire format; these are the batch driver's own plain
//! records, deserialized with serde and fed to the engine as-is.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use nblast_core::registry::Registry;
use nblast_core::types::{ConfigTuning, ErrorMode, ObjectRef, Point3, PointSet, Symmetry};

use crate::error::CliError;

/// A geometry file: every object the run may reference, keyed by external id.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeometryFile {
    /// Skeletons: nodes plus connectivity edges.
    #[serde(default)]
    pub skeletons: Vec<SkeletonRecord>,
    /// Point clouds, optionally with precomputed tangents.
    #[serde(default)]
    pub pointclouds: Vec<PointCloudRecord>,
    /// Point sets as flat coordinate arrays.
    #[serde(default)]
    pub pointsets: Vec<PointSetRecord>,
}

/// One skeleton.
#[derive(Debug, Serialize, Deserialize)]
pub struct SkeletonRecord {
    /// External id.
    pub id: u64,
    /// Node positions.
    pub nodes: Vec<Point3>,
    /// Edges as node index pairs.
    pub edges: Vec<(usize, usize)>,
}

/// One point cloud.
#[derive(Debug, Serialize, Deserialize)]
pub struct PointCloudRecord {
    /// External id.
    pub id: u64,
    /// Point positions.
    pub points: Vec<Point3>,
    /// Optional per-point tangent hints.
    #[serde(default)]
    pub tangents: Option<Vec<Point3>>,
}

/// One point set, flat `[x, y, z, …]` like the persisted column.
#[derive(Debug, Serialize, Deserialize)]
pub struct PointSetRecord {
    /// External id.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Flattened coordinates, length divisible by 3.
    pub points: Vec<f64>,
}

impl GeometryFile {
    /// Load all records into a fresh in-memory registry.
    pub fn into_registry(self) -> Result<Registry, CliError> {
        let registry = Registry::new();
        for s in self.skeletons {
            registry.insert_skeleton(s.id, s.nodes, s.edges);
        }
        for c in self.pointclouds {
            match c.tangents {
                Some(tangents) => registry.insert_pointcloud_with_tangents(c.id, c.points, tangents),
                None => registry.insert_pointcloud(c.id, c.points),
            }
        }
        for p in self.pointsets {
            let set = PointSet::new(p.name, p.points)?;
            registry.insert_point_set(p.id, set);
        }
        Ok(registry)
    }
}

/// Request record for `nblast sample`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SampleSpec {
    /// Sample name.
    #[serde(default)]
    pub name: Option<String>,
    /// Distance bin edges.
    pub distance_breaks: Vec<f64>,
    /// Dot-alignment bin edges.
    pub dot_breaks: Vec<f64>,
    /// Tuning parameters.
    #[serde(default)]
    pub tuning: ConfigTuning,
    /// Object pairs to accumulate over.
    pub pairs: Vec<(ObjectRef, ObjectRef)>,
}

/// Request record for `nblast config`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigSpec {
    /// Config name.
    pub name: String,
    /// Distance bin edges.
    pub distance_breaks: Vec<f64>,
    /// Dot-alignment bin edges.
    pub dot_breaks: Vec<f64>,
    /// Tuning parameters.
    #[serde(default)]
    pub tuning: ConfigTuning,
}

/// Request record for `nblast similarity`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SimilaritySpec {
    /// Similarity name.
    pub name: String,
    /// Query object references (rows).
    pub queries: Vec<ObjectRef>,
    /// Target object references (columns).
    pub targets: Vec<ObjectRef>,
    /// Error-reporting mode.
    #[serde(default)]
    pub mode: ErrorMode,
    /// Score directionality.
    #[serde(default)]
    pub symmetry: Symmetry,
}

/// Read and parse a JSON record file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a record to a JSON file (pretty-printed).
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
