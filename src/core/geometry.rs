//! Small 3D vector helpers used by the pose classifiers.

use serde::{Deserialize, Serialize};

/// A point or direction in normalized image space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        dot(*self, *self).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Vector pointing from `a` to `b`.
pub fn vector_between(a: Vec3, b: Vec3) -> Vec3 {
    Vec3::new(b.x - a.x, b.y - a.y, b.z - a.z)
}

/// Unit vector in the direction of `v`, or the zero vector if `v` has no length.
pub fn normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len == 0.0 {
        return Vec3::ZERO;
    }
    Vec3::new(v.x / len, v.y / len, v.z / len)
}

pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// Euclidean distance between two points.
pub fn distance_3d(a: Vec3, b: Vec3) -> f64 {
    vector_between(a, b).length()
}
