//! 2D vector value type used throughout the cell
//!
//! `NVec2` is a plain nalgebra vector: `+`, `-`, `*` and `norm()` already
//! return fresh values, so the only helpers needed here are the two pair
//! quantities the force code asks for

use nalgebra::Vector2;

pub type NVec2 = Vector2<f64>;

/// Component-wise difference `a - b`
#[inline]
pub fn separation(a: &NVec2, b: &NVec2) -> NVec2 {
    a - b
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: &NVec2, b: &NVec2) -> f64 {
    separation(a, b).norm()
}

/// True when both components are finite (no NaN, no infinity)
#[inline]
pub fn is_finite(v: &NVec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
