//! Steering controller.
//!
//! Runs every render tick: velocities exponentially approach the desired
//! vector the director last wrote, positions integrate from velocity, and the
//! result is confined to the depth-scaled frustum. Orientation smoothing uses
//! the same first-order lag so heading changes read as banking rather than
//! snapping.
//!
//! The pure helpers ([`steer`], [`confine`], [`tick_scale`]) carry the whole
//! integration contract and are exercised directly by the tests; the systems
//! are thin ECS wrappers over them.

use std::f32::consts::PI;

use bevy::prelude::*;
use log::debug;

use crate::components::{DesiredVelocity, Orientation, Position, Velocity};
use crate::config::SimConfig;
use crate::director::CurrentTarget;
use crate::projection::frustum_half_extents;
use crate::vector_math::{heading_angles, shortest_arc, wrap_yaw};
use crate::viewport::Viewport;

/// Rescales a real frame delta into nominal ticks, clamped so a frame hitch
/// cannot teleport actors.
///
/// # Examples
/// ```
/// use flotilla::steering::tick_scale;
/// use flotilla::SimConfig;
/// let config = SimConfig::default();
/// // One 60 Hz frame is exactly one tick.
/// assert!((tick_scale(1.0 / 60.0, &config) - 1.0).abs() < 1e-4);
/// // A one-second stall is clamped, not integrated wholesale.
/// assert!((tick_scale(1.0, &config) - config.max_tick_scale).abs() < 1e-6);
/// ```
#[must_use]
pub fn tick_scale(delta_seconds: f32, config: &SimConfig) -> f32 {
    (delta_seconds * config.tick_rate).min(config.max_tick_scale)
}

/// First-order lag toward a desired value: closes `gain` of the gap.
#[must_use]
pub fn approach(current: f32, desired: f32, gain: f32) -> f32 {
    current + (desired - current) * gain
}

/// One velocity integration step toward the desired vector.
#[must_use]
pub fn steer(velocity: Vec3, desired: Vec3, gain: f32, dt: f32) -> Vec3 {
    velocity + (desired - velocity) * (gain * dt)
}

/// Confines a position to the frustum slice at its own depth.
///
/// On overflow the coordinate snaps to the wall, its velocity component
/// zeroes, and the matching desired-velocity component is flipped to point
/// back inward, so the next integration steps pull the actor on-screen
/// again. Returns whether any wall was hit.
pub fn confine(
    position: &mut Vec3,
    velocity: &mut Vec3,
    desired: &mut Vec3,
    bounds: Vec2,
    z_near: f32,
    z_far: f32,
) -> bool {
    let mut hit = false;

    if position.x < -bounds.x {
        position.x = -bounds.x;
        velocity.x = 0.0;
        desired.x = desired.x.abs();
        hit = true;
    } else if position.x > bounds.x {
        position.x = bounds.x;
        velocity.x = 0.0;
        desired.x = -desired.x.abs();
        hit = true;
    }

    if position.y < -bounds.y {
        position.y = -bounds.y;
        velocity.y = 0.0;
        desired.y = desired.y.abs();
        hit = true;
    } else if position.y > bounds.y {
        position.y = bounds.y;
        velocity.y = 0.0;
        desired.y = -desired.y.abs();
        hit = true;
    }

    if position.z < z_far {
        position.z = z_far;
        velocity.z = 0.0;
        desired.z = desired.z.abs();
        hit = true;
    } else if position.z > z_near {
        position.z = z_near;
        velocity.z = 0.0;
        desired.z = -desired.z.abs();
        hit = true;
    }

    hit
}

/// Integrates velocity and position for every actor and confines the result
/// to the frustum.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn steering_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    current: Res<CurrentTarget>,
    mut actors: Query<(Entity, &mut Position, &mut Velocity, &mut DesiredVelocity)>,
) {
    let Some(half) = viewport.half_extents() else {
        return;
    };
    let dt = tick_scale(time.delta_secs(), &config);
    if dt <= 0.0 {
        return;
    }

    for (entity, mut position, mut velocity, mut desired) in &mut actors {
        let gain = config.gain_for(current.is(entity));
        velocity.0 = steer(velocity.0, desired.0, gain, dt);
        position.0 += velocity.0 * dt;

        let bounds = frustum_half_extents(position.0.z, half, config.focal_length);
        if confine(
            &mut position.0,
            &mut velocity.0,
            &mut desired.0,
            bounds,
            config.z_near,
            config.z_far,
        ) {
            debug!("actor {entity:?} bounced off a frustum wall");
        }
    }
}

/// Smooths each actor's yaw and pitch toward its velocity heading.
///
/// Yaw always takes the shortest angular path; the residual yaw error after
/// smoothing is kept as the banking input. A slow sinusoidal bob is added to
/// the desired pitch so idling actors still drift between pitch bands.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn orientation_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    current: Res<CurrentTarget>,
    mut actors: Query<(Entity, &Velocity, &mut Orientation)>,
) {
    let dt = tick_scale(time.delta_secs(), &config);
    if dt <= 0.0 {
        return;
    }
    let bob = (time.elapsed_secs() * config.bob_rate).sin() * config.bob_amplitude;

    for (entity, velocity, mut orientation) in &mut actors {
        let gain = config.gain_for(current.is(entity)) * dt;

        // Degenerate velocity keeps the previous heading and lets the bank
        // decay back to level flight.
        let Some((desired_yaw, raw_pitch)) = heading_angles(velocity.0) else {
            orientation.bank = approach(orientation.bank, 0.0, gain);
            continue;
        };

        let step = shortest_arc(orientation.yaw, desired_yaw);
        orientation.yaw = wrap_yaw(orientation.yaw + step * gain);
        orientation.bank = shortest_arc(orientation.yaw, desired_yaw);

        let desired_pitch = raw_pitch + bob;
        orientation.pitch = approach(orientation.pitch, desired_pitch, gain)
            .clamp(config.pitch_margin, PI - config.pitch_margin);
    }
}
