//! Tangent estimation via local neighborhood analysis.
//!
//! For each point, the k nearest neighbors are gathered and the dominant
//! direction of the neighborhood (principal axis of the offset covariance)
//! becomes the point's tangent. The eigenvector is found by deterministic
//! power iteration, and the sign is fixed by a deterministic convention:
//! dot-product bins are taken over absolute values, so a global flip is
//! harmless, but per-point sign instability would corrupt local bin counts.

use crate::error::{GeometryError, Result};
use crate::types::Point3;

const POWER_ITERATIONS: usize = 48;
const SIGN_EPSILON: f64 = 1e-12;

/// Estimate a unit tangent for every point from its `k` nearest neighbors.
///
/// Fails with [`GeometryError::TooFewPoints`] when fewer than `k + 1` points
/// are available (each point needs `k` distinct neighbors).
pub fn estimate_tangents(points: &[Point3], k: usize) -> Result<Vec<Point3>> {
    if points.len() < k + 1 {
        return Err(GeometryError::TooFewPoints {
            points: points.len(),
            required: k + 1,
        }
        .into());
    }

    let mut tangents = Vec::with_capacity(points.len());
    let mut scratch: Vec<(f64, usize)> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        scratch.clear();
        for (j, q) in points.iter().enumerate() {
            if j != i {
                scratch.push((p.dist2(q), j));
            }
        }
        // Ties broken by index so neighbor selection is deterministic.
        scratch.sort_unstable_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mut neighborhood = Vec::with_capacity(k + 1);
        neighborhood.push(*p);
        neighborhood.extend(scratch[..k].iter().map(|&(_, j)| points[j]));

        tangents.push(neighborhood_tangent(*p, &neighborhood));
    }
    Ok(tangents)
}

/// Principal axis of the neighborhood, oriented deterministically.
fn neighborhood_tangent(point: Point3, neighborhood: &[Point3]) -> Point3 {
    let n = neighborhood.len() as f64;
    let mut centroid = Point3::ZERO;
    for q in neighborhood {
        centroid = centroid.add(q);
    }
    centroid = centroid.scale(1.0 / n);

    let mut cov = [[0.0f64; 3]; 3];
    for q in neighborhood {
        let d = q.sub(&centroid);
        let v = [d.x, d.y, d.z];
        for r in 0..3 {
            for c in 0..3 {
                cov[r][c] += v[r] * v[c];
            }
        }
    }

    let tangent = principal_axis(&cov);
    orient(tangent, &centroid.sub(&point))
}

/// Dominant eigenvector of a symmetric 3×3 matrix by power iteration.
///
/// Runs from each basis vector and keeps the direction with the largest
/// Rayleigh quotient, so a start vector orthogonal to the principal axis
/// cannot silently win. Fully deterministic: fixed starts, fixed iteration
/// count, no randomness.
fn principal_axis(cov: &[[f64; 3]; 3]) -> Point3 {
    let starts = [
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    let mut best = starts[0];
    let mut best_quotient = f64::NEG_INFINITY;
    for start in starts {
        let mut v = start;
        for _ in 0..POWER_ITERATIONS {
            let w = mat_vec(cov, &v);
            match w.normalized() {
                Some(u) => v = u,
                // Start annihilated by the matrix; keep the start itself.
                None => break,
            }
        }
        let quotient = v.dot(&mat_vec(cov, &v));
        if quotient > best_quotient {
            best_quotient = quotient;
            best = v;
        }
    }
    best
}

fn mat_vec(m: &[[f64; 3]; 3], v: &Point3) -> Point3 {
    Point3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

/// Fix the tangent sign: oriented toward the neighbor centroid when that is
/// decisive, otherwise by making the first non-negligible component positive.
fn orient(tangent: Point3, toward: &Point3) -> Point3 {
    let along = tangent.dot(toward);
    if along < -SIGN_EPSILON {
        return tangent.scale(-1.0);
    }
    if along > SIGN_EPSILON {
        return tangent;
    }
    for component in [tangent.x, tangent.y, tangent.z] {
        if component.abs() > SIGN_EPSILON {
            return if component < 0.0 { tangent.scale(-1.0) } else { tangent };
        }
    }
    tangent
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_points(n: usize) -> Vec<Point3> {
        (0..n).map(|i| Point3::new(i as f64, 0.0, 0.0)).collect()
    }

    #[test]
    fn collinear_points_get_axis_tangents() {
        let points = line_points(10);
        let tangents = estimate_tangents(&points, 3).unwrap();
        assert_eq!(tangents.len(), points.len());
        for t in &tangents {
            assert!((t.norm() - 1.0).abs() < 1e-9, "tangent not unit length: {:?}", t);
            assert!(t.x.abs() > 0.999, "expected ±x tangent, got {:?}", t);
            assert!(t.y.abs() < 1e-9 && t.z.abs() < 1e-9);
        }
    }

    #[test]
    fn diagonal_line_tangent_follows_the_line() {
        let points: Vec<Point3> = (0..12)
            .map(|i| Point3::new(i as f64, 2.0 * i as f64, -1.0 * i as f64))
            .collect();
        let tangents = estimate_tangents(&points, 4).unwrap();
        let expected = Point3::new(1.0, 2.0, -1.0).normalized().unwrap();
        for t in &tangents {
            assert!(
                t.dot(&expected).abs() > 0.999,
                "tangent {:?} not aligned with line direction",
                t
            );
        }
    }

    #[test]
    fn too_few_points_is_rejected() {
        let err = estimate_tangents(&line_points(4), 4).unwrap_err();
        assert!(matches!(
            err,
            crate::error::NblastError::Geometry(GeometryError::TooFewPoints {
                points: 4,
                required: 5
            })
        ));
    }

    #[test]
    fn estimation_is_deterministic() {
        let points: Vec<Point3> = (0..30)
            .map(|i| {
                let t = i as f64 * 0.37;
                Point3::new(t.sin() * 5.0, t.cos() * 5.0, t)
            })
            .collect();
        let a = estimate_tangents(&points, 6).unwrap();
        let b = estimate_tangents(&points, 6).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn sign_convention_follows_centroid_then_lexicographic_rule() {
        let points = line_points(8);
        let tangents = estimate_tangents(&points, 2).unwrap();
        // First point: neighbors lie to the right, centroid rule gives +x.
        assert!(tangents[0].x > 0.999);
        // Last point: neighbors lie to the left, centroid rule gives -x.
        assert!(tangents[7].x < -0.999);
        // Interior point: symmetric neighborhood, lexicographic rule gives +x.
        assert!(tangents[3].x > 0.999);
    }
}
