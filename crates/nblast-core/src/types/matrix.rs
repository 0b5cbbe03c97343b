//! Dense row-major matrices over the 2D bin grid.
//!
//! Two concrete types instead of one generic: [`CountMatrix`] accumulates
//! histogram counts (`u64`, associative merge), [`ScoreMatrix`] holds derived
//! probabilities and log-ratio scores (`f64`). Both carry their shape and
//! check it on every cross-matrix operation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// Accumulated histogram counts over `(distance_bin, dot_bin)`.
///
/// Merging two count matrices is plain integer addition, so parallel
/// accumulation into per-worker buffers reduced at a join point yields the
/// same result for any pool size or scheduling order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountMatrix {
    rows: usize,
    cols: usize,
    data: Vec<u64>,
}

impl CountMatrix {
    /// Create a zeroed `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0; rows * cols] }
    }

    /// Build from explicit row data. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<u64>]) -> Result<Self> {
        let r = rows.len();
        let c = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(r * c);
        for row in rows {
            if row.len() != c {
                return Err(ValidationError::ShapeMismatch {
                    expected: (r, c),
                    actual: (r, row.len()),
                }
                .into());
            }
            data.extend_from_slice(row);
        }
        Ok(Self { rows: r, cols: c, data })
    }

    /// Matrix shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Count at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> u64 {
        self.data[row * self.cols + col]
    }

    /// Increment the count at `(row, col)` by one.
    pub fn incr(&mut self, row: usize, col: usize) {
        self.data[row * self.cols + col] += 1;
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.data.iter().sum()
    }

    /// Add `other` into `self`. Shapes must match.
    pub fn merge(&mut self, other: &CountMatrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(ValidationError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            }
            .into());
        }
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += *b;
        }
        Ok(())
    }

    /// Flat row-major view of the counts.
    pub fn as_slice(&self) -> &[u64] {
        &self.data
    }
}

/// Derived real-valued matrix over the same bin grid (probabilities,
/// log-likelihood-ratio scores) or over `queries × targets` (similarity
/// scoring, where `NaN` marks a best-effort per-pair failure).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ScoreMatrix {
    /// Create a zeroed `rows × cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Build directly from row-major data. `data.len()` must be `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(ValidationError::ShapeMismatch {
                expected: (rows, cols),
                actual: (data.len(), 1),
            }
            .into());
        }
        Ok(Self { rows, cols, data })
    }

    /// Matrix shape as `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Value at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Set the value at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Flat row-major view.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Transposed copy.
    pub fn transposed(&self) -> ScoreMatrix {
        let mut out = ScoreMatrix::zeros(self.cols, self.rows);
        for r in 0..self.rows {
            for c in 0..self.cols {
                out.set(c, r, self.get(r, c));
            }
        }
        out
    }
}
