//! Small scalar/vector helpers shared by the gait modules.

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// World up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Where `value` sits between `a` and `b`, clamped to `[0, 1]`.
///
/// Returns 0 for a degenerate range.
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `[old_low, old_high]` onto `[new_low, new_high]`, clamping at the ends.
#[inline]
pub fn remap(value: f32, old_low: f32, old_high: f32, new_low: f32, new_high: f32) -> f32 {
    lerp(new_low, new_high, inverse_lerp(old_low, old_high, value))
}

/// Unclamped point interpolation.
#[inline]
pub fn lerp_points(a: &Point3, b: &Point3, t: f32) -> Point3 {
    a + (b - a) * t
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.norm();
    if dist <= max_delta.max(0.0) || dist <= f32::EPSILON {
        return target;
    }
    current + delta / dist * max_delta
}

/// Drop the vertical component of `v`.
#[inline]
pub fn to_planar(v: &Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}
