//! Bin-edge validation and the shared binning rule.
//!
//! Bin `i` covers `[breaks[i], breaks[i+1])` for all but the last bin, which
//! is closed on both ends; out-of-range values clamp to the nearest edge bin.
//! Every measurement lands in exactly one bin, so the histogram total always
//! equals the number of points processed.

use crate::error::{Result, ValidationError};

/// Check that `breaks` is a usable bin-edge array: length ≥ 2, all finite,
/// strictly increasing.
pub fn validate_breaks(name: &'static str, breaks: &[f64]) -> Result<()> {
    if breaks.len() < 2 {
        return Err(ValidationError::InvalidBreaks {
            name,
            reason: format!("needs at least 2 edges, got {}", breaks.len()),
        }
        .into());
    }
    for (i, w) in breaks.windows(2).enumerate() {
        if !w[0].is_finite() || !w[1].is_finite() {
            return Err(ValidationError::InvalidBreaks {
                name,
                reason: format!("edge at index {} is not finite", i),
            }
            .into());
        }
        if w[0] >= w[1] {
            return Err(ValidationError::InvalidBreaks {
                name,
                reason: format!("not strictly increasing at index {} ({} >= {})", i, w[0], w[1]),
            }
            .into());
        }
    }
    Ok(())
}

/// Validate dot-alignment breaks: same rules as [`validate_breaks`], plus the
/// domain restriction to `[-1, 1]` since they bin `|dot|` of unit tangents.
pub fn validate_dot_breaks(breaks: &[f64]) -> Result<()> {
    validate_breaks("dot_breaks", breaks)?;
    let first = breaks[0];
    let last = breaks[breaks.len() - 1];
    if first < -1.0 || last > 1.0 {
        return Err(ValidationError::InvalidBreaks {
            name: "dot_breaks",
            reason: format!("edges [{}, {}] exceed the dot-product domain [-1, 1]", first, last),
        }
        .into());
    }
    Ok(())
}

/// Map `value` to its bin index for validated `breaks`.
///
/// Total by construction: values below the first edge clamp to bin 0, values
/// at or above the last edge clamp to the final bin (which is closed), and a
/// `NaN` (which cannot be ordered) falls into bin 0 rather than being dropped.
pub fn bin_index(value: f64, breaks: &[f64]) -> usize {
    let n = breaks.len();
    debug_assert!(n >= 2);
    if value.is_nan() || value <= breaks[0] {
        return 0;
    }
    if value >= breaks[n - 1] {
        return n - 2;
    }
    // First edge strictly greater than value; its predecessor opens the bin.
    breaks.partition_point(|b| *b <= value) - 1
}
