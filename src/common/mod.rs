//! Common utilities and types shared across the path follower

pub mod circular;
pub mod curve;

/// Common types and utilities used across the codebase
pub mod types {
    use nalgebra::Vector3;

    /// A 3D point or direction in world space
    pub type Vec3 = Vector3<f64>;

    /// World up axis. The ground plane is XZ.
    pub fn world_up() -> Vec3 {
        Vec3::y()
    }

    /// Position and orientation of an agent
    #[derive(Debug, Clone, Copy, PartialEq)]
    pub struct Pose {
        pub position: Vec3,
        pub forward: Vec3,
        pub up: Vec3,
    }
}

use self::types::Vec3;

/// Signed angle in degrees between `from` and `to` around `axis`.
///
/// The magnitude is the unsigned angle between the two vectors, the sign is
/// the sign of `dot(axis, cross(from, to))`. Zero-length inputs give 0.
pub fn signed_angle(from: &Vec3, to: &Vec3, axis: &Vec3) -> f64 {
    let denominator = (from.norm_squared() * to.norm_squared()).sqrt();
    if denominator < 1e-15 {
        return 0.0;
    }

    let cos = (from.dot(to) / denominator).clamp(-1.0, 1.0);
    let unsigned = cos.acos().to_degrees();

    if axis.dot(&from.cross(to)) < 0.0 {
        -unsigned
    } else {
        unsigned
    }
}

/// Linear interpolation with `t` clamped to [0, 1]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t.clamp(0.0, 1.0)
}
