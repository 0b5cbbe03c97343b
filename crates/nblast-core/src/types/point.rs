//! 3D point type and the small amount of vector math the engine needs.

use serde::{Deserialize, Serialize};

/// A point (or direction) in 3D space.
///
/// Doubles as a unit tangent vector; the engine never needs a separate
/// direction type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
    /// Z coordinate
    pub z: f64,
}

impl Point3 {
    /// Construct from components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const ZERO: Point3 = Point3::new(0.0, 0.0, 0.0);

    /// Component-wise difference `self - other`.
    pub fn sub(&self, other: &Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    /// Component-wise sum `self + other`.
    pub fn add(&self, other: &Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    /// Scale all components by `s`.
    pub fn scale(&self, s: f64) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }

    /// Dot product.
    pub fn dot(&self, other: &Point3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared Euclidean distance to `other`.
    ///
    /// Used for nearest-neighbor comparisons where the square root is not
    /// needed until the winning distance is reported.
    pub fn dist2(&self, other: &Point3) -> f64 {
        let d = self.sub(other);
        d.dot(&d)
    }

    /// Euclidean distance to `other`.
    pub fn dist(&self, other: &Point3) -> f64 {
        self.dist2(other).sqrt()
    }

    /// Euclidean length.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` if the vector is (numerically) zero.
    pub fn normalized(&self) -> Option<Point3> {
        let n = self.norm();
        if n <= f64::EPSILON {
            None
        } else {
            Some(self.scale(1.0 / n))
        }
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(v: [f64; 3]) -> Self {
        Point3::new(v[0], v[1], v[2])
    }
}
