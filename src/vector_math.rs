//! Angle and vector helper functions.
//! Small helpers for wrapping yaw, taking shortest angular paths, and
//! deriving heading angles from velocities.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Wraps an angle into `[0, 2*PI)`.
///
/// # Examples
/// ```
/// use std::f32::consts::{FRAC_PI_2, PI};
/// use flotilla::vector_math::wrap_yaw;
/// let wrapped = wrap_yaw(-FRAC_PI_2);
/// assert!((wrapped - 3.0 * FRAC_PI_2).abs() < 1e-6);
/// assert!((wrap_yaw(PI) - PI).abs() < 1e-6);
/// ```
#[must_use]
pub fn wrap_yaw(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can return TAU itself when the input sits just below zero.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Returns the signed shortest angular step from `from` to `to`, in
/// `(-PI, PI]`.
///
/// Blending yaw through this delta guarantees an actor never visibly spins
/// the long way around.
///
/// # Examples
/// ```
/// use std::f32::consts::TAU;
/// use flotilla::vector_math::shortest_arc;
/// let delta = shortest_arc(0.1, TAU - 0.1);
/// assert!((delta + 0.2).abs() < 1e-5);
/// ```
#[must_use]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let diff = (to - from).rem_euclid(TAU);
    if diff > PI {
        diff - TAU
    } else {
        diff
    }
}

/// Derives `(yaw, pitch)` heading angles from a velocity vector.
///
/// Yaw is measured around the vertical axis (`atan2(vx, vz)`, wrapped into
/// `[0, 2*PI)`); pitch is the polar angle from the `+y` pole in `[0, PI]`.
/// Returns `None` for zero-length or non-finite velocities, so callers can
/// keep the previous heading instead of dividing by zero.
#[must_use]
pub fn heading_angles(velocity: Vec3) -> Option<(f32, f32)> {
    if !velocity.is_finite() {
        return None;
    }
    let magnitude = velocity.length();
    if magnitude <= f32::EPSILON {
        return None;
    }
    let yaw = wrap_yaw(velocity.x.atan2(velocity.z));
    let pitch = (velocity.y / magnitude).clamp(-1.0, 1.0).acos();
    Some((yaw, pitch))
}

/// Returns the unit vector in the direction of `vector`, or zero when the
/// input is the zero vector or non-finite.
///
/// # Examples
/// ```
/// use glam::Vec3;
/// use flotilla::vector_math::normalize_or_zero;
/// assert_eq!(normalize_or_zero(Vec3::ZERO), Vec3::ZERO);
/// let unit = normalize_or_zero(Vec3::new(3.0, 0.0, 4.0));
/// assert!((unit.x - 0.6).abs() < 1e-6);
/// assert!((unit.z - 0.8).abs() < 1e-6);
/// ```
#[must_use]
pub fn normalize_or_zero(vector: Vec3) -> Vec3 {
    if !vector.is_finite() {
        return Vec3::ZERO;
    }
    vector.try_normalize().unwrap_or(Vec3::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn wrap_yaw_handles_many_turns() {
        let wrapped = wrap_yaw(5.0 * TAU + FRAC_PI_2);
        assert!((wrapped - FRAC_PI_2).abs() < 1e-4);
    }

    #[test]
    fn shortest_arc_is_zero_for_equal_angles() {
        assert!(shortest_arc(1.25, 1.25).abs() < 1e-6);
    }

    #[test]
    fn shortest_arc_crosses_the_seam_forwards() {
        let delta = shortest_arc(TAU - 0.1, 0.1);
        assert!((delta - 0.2).abs() < 1e-5);
    }

    #[test]
    fn heading_angles_of_forward_motion() {
        let (yaw, pitch) = heading_angles(Vec3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(yaw.abs() < 1e-6);
        assert!((pitch - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn heading_angles_rejects_degenerate_input() {
        assert!(heading_angles(Vec3::ZERO).is_none());
        assert!(heading_angles(Vec3::new(f32::NAN, 0.0, 0.0)).is_none());
    }

    #[test]
    fn normalize_or_zero_rejects_nan() {
        assert_eq!(normalize_or_zero(Vec3::new(f32::NAN, 1.0, 0.0)), Vec3::ZERO);
    }
}
