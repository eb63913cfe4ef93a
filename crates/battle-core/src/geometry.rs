//! Vector and frame transforms shared by units, bullets and obstacles.
//!
//! Rotations are counter-clockwise in radians. An unrotated entity faces
//! local +Y, so a rotation of zero points "up" the world.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;

/// Distance below which an aim offset is treated as degenerate.
pub const AIM_EPSILON: f32 = 1e-4;

/// Rotates `v` counter-clockwise by `angle` radians.
#[must_use]
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Maps a point from a local frame (origin + rotation) into world space.
#[must_use]
#[inline]
pub fn local_to_world(origin: Vec2, rotation: f32, local: Vec2) -> Vec2 {
    origin + rotate(local, rotation)
}

/// Maps a world-space point into the local frame at `origin` rotated by `rotation`.
#[must_use]
#[inline]
pub fn world_to_local(origin: Vec2, rotation: f32, world: Vec2) -> Vec2 {
    rotate(world - origin, -rotation)
}

/// Unit forward vector (local +Y) for the given rotation.
#[must_use]
#[inline]
pub fn heading(rotation: f32) -> Vec2 {
    rotate(Vec2::Y, rotation)
}

/// Rotation that makes local +Y point from `from` towards `to`.
///
/// Returns `fallback` when the two points coincide (closer than
/// [`AIM_EPSILON`]), so the result is never NaN.
#[must_use]
pub fn aim_angle(from: Vec2, to: Vec2, fallback: f32) -> f32 {
    let diff = to - from;
    if diff.length() < AIM_EPSILON {
        fallback
    } else {
        diff.y.atan2(diff.x) - FRAC_PI_2
    }
}
