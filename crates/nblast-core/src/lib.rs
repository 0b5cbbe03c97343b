//! NBLAST-style morphological similarity engine.
//!
//! Compares skeletonized 3D structures (neuron skeletons, point clouds,
//! point sets) by learning an empirical probability model from sampled
//! object pairs and using it to score arbitrary query/target pairs.
//!
//! # Pipeline
//!
//! 1. **Geometry adapter** ([`geometry`]): resolve an object reference to
//!    points, resample skeletons along their connectivity, estimate a unit
//!    tangent per point from its k-nearest-neighbor neighborhood.
//! 2. **Sampler** ([`scoring::accumulate_histogram`]): accumulate the joint
//!    2D histogram of (nearest-neighbor distance, tangent alignment) over
//!    matched and random object pairs.
//! 3. **Score matrix** ([`scoring::build_score_matrix`]): turn the two
//!    histograms into a log2 likelihood-ratio lookup table.
//! 4. **Similarity** ([`scoring::compute_scoring`]): score every
//!    query/target pair by mean per-point lookup.
//!
//! Long-running computations are expressed as the job state machine in
//! [`job`]; the compute calls themselves stay ordinary blocking functions
//! driven by an external executor.
//!
//! # Example
//!
//! ```
//! use nblast_core::engine::NblastEngine;
//! use nblast_core::job::CancelToken;
//! use nblast_core::registry::Registry;
//! use nblast_core::types::{ConfigTuning, ObjectRef, Point3};
//!
//! let registry = Registry::new();
//! for id in 0..2u64 {
//!     let points: Vec<Point3> = (0..20)
//!         .map(|i| Point3::new(i as f64, id as f64, 0.0))
//!         .collect();
//!     registry.insert_pointcloud(id, points);
//! }
//!
//! let engine = NblastEngine::new(registry);
//! let tuning = ConfigTuning { tangent_neighbors: 3, ..Default::default() };
//! let pairs = vec![(ObjectRef::pointcloud(0), ObjectRef::pointcloud(1))];
//! let sample = engine
//!     .build_sample(
//!         Some("demo".into()),
//!         &pairs,
//!         &[0.0, 1.0, 2.0],
//!         &[0.0, 0.5, 1.0],
//!         tuning,
//!         &CancelToken::new(),
//!     )
//!     .unwrap();
//! assert_eq!(sample.histogram.unwrap().total(), 20);
//! ```

pub mod engine;
pub mod error;
pub mod geometry;
pub mod job;
pub mod registry;
pub mod scoring;
pub mod types;

pub use engine::NblastEngine;
pub use error::{
    ComputationError, ConflictError, GeometryError, NblastError, PreconditionError, Result,
    ValidationError,
};
pub use job::{CancelToken, JobState, JobStatus};
pub use types::{
    Config, ConfigTuning, CountMatrix, ErrorMode, ObjectKind, ObjectRef, Point3, PointSet, Sample,
    ScoreMatrix, Similarity, Symmetry,
};
