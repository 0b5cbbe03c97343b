//! Geometry adapter: object resolution, skeleton resampling and tangent
//! estimation.

mod resolver;
mod tangent;

pub use resolver::{build_dotprops, resample_skeleton, DotProps, ObjectResolver, ResolvedObject};
pub use tangent::estimate_tangents;
