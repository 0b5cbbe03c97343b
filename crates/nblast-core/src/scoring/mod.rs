//! Scoring pipeline: binning, histogram accumulation, score-matrix
//! derivation and pairwise similarity computation.

pub mod bins;
mod histogram;
mod matrix;
mod similarity;

pub use histogram::accumulate_histogram;
pub use matrix::{build_score_matrix, raw_probability, smoothed_probability};
pub use similarity::{compute_scoring, one_directional_score, ScoreLookup};
