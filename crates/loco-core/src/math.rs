//! Planar and slope helpers shared by locomotion and navigation.
//!
//! The framework is Z-up: "horizontal" means the XY plane and every "Z-band"
//! check compares world Z only.

use glam::{Quat, Vec3};

/// World-up axis.
pub const UP: Vec3 = Vec3::Z;

/// Drop the vertical component.
#[inline]
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, 0.0)
}

/// Distance between `a` and `b` projected onto the XY plane.
#[inline]
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    flat(b - a).length()
}

/// Angle in radians between `normal` and world-up.
///
/// A flat floor returns `0`; a vertical wall returns `π/2`.
#[inline]
pub fn slope_angle(normal: Vec3) -> f32 {
    normal.normalize_or_zero().dot(UP).clamp(-1.0, 1.0).acos()
}

/// 2-D distance from `p` to the segment `a → b`, all projected onto XY.
pub fn flat_segment_distance(p: Vec3, a: Vec3, b: Vec3) -> f32 {
    let (p, a, b) = (flat(p), flat(a), flat(b));
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Yaw rotation about world-up that faces `direction`.
///
/// Returns `None` when `direction` has no horizontal component.
pub fn yaw_towards(direction: Vec3) -> Option<Quat> {
    let d = flat(direction);
    if d.length_squared() <= 1e-8 {
        return None;
    }
    Some(Quat::from_rotation_z(d.y.atan2(d.x)))
}

/// Unit horizontal direction from `from` to `to`, or zero when they coincide
/// in the XY plane.
#[inline]
pub fn flat_direction(from: Vec3, to: Vec3) -> Vec3 {
    flat(to - from).normalize_or_zero()
}
