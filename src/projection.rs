//! Perspective projection helpers.
//!
//! Actors live in a right-handed space where `z` is negative-forward: more
//! negative means farther behind the page. These pure functions turn a 3D
//! position into a screen transform and give the depth-scaled frustum bounds
//! the steering controller clamps against.

use glam::{Vec2, Vec3};

/// Uniform scale factor for an actor at depth `z`.
///
/// `focal_length / (focal_length + |z|)`: larger depths shrink toward zero,
/// an actor on the projection plane renders at full size.
///
/// # Examples
/// ```
/// use flotilla::projection::scale_for_depth;
/// assert!((scale_for_depth(0.0, 1000.0) - 1.0).abs() < 1e-6);
/// assert!((scale_for_depth(-1000.0, 1000.0) - 0.5).abs() < 1e-6);
/// ```
#[must_use]
pub fn scale_for_depth(z: f32, focal_length: f32) -> f32 {
    focal_length / (focal_length + z.abs())
}

/// Half-extents of the frustum slice at depth `z`.
///
/// The visible rectangle grows with depth by the inverse of the projection
/// ratio, so an actor clamped to these bounds always projects back inside the
/// viewport.
#[must_use]
pub fn frustum_half_extents(z: f32, half_viewport: Vec2, focal_length: f32) -> Vec2 {
    half_viewport * ((focal_length + z.abs()) / focal_length)
}

/// Projects a world position into screen space.
///
/// Returns the top-left corner of the sprite tile (the projected point sits
/// at the tile centre) together with the uniform scale to apply to it.
#[must_use]
pub fn project(position: Vec3, viewport: Vec2, focal_length: f32, tile_px: f32) -> (Vec2, f32) {
    let scale = scale_for_depth(position.z, focal_length);
    let centre = viewport * 0.5;
    let screen = centre + position.truncate() * scale - Vec2::splat(tile_px * 0.5);
    (screen, scale)
}
