//! Core domain types: points, object references, matrices and the three
//! asynchronously computed entities (Sample, Config, Similarity).

mod config;
mod matrix;
mod object_ref;
mod point;
mod point_set;
mod sample;
mod similarity;

pub use config::{
    Config, ConfigTuning, DEFAULT_RESAMPLE_STEP, DEFAULT_SMOOTHING, DEFAULT_TANGENT_NEIGHBORS,
};
pub use matrix::{CountMatrix, ScoreMatrix};
pub use object_ref::{ObjectKind, ObjectRef};
pub use point::Point3;
pub use point_set::PointSet;
pub use sample::Sample;
pub use similarity::{ErrorMode, Similarity, Symmetry};
