//! ECS component types used by the simulation.
//!
//! Components are split along the two-clock ownership partition: the render
//! tick writes [`Position`], [`Velocity`], [`Orientation`], and [`DrawState`];
//! the AI director writes [`DesiredVelocity`], [`Waypoint`], [`AiPhase`], and
//! [`Watchdog`]. No field is written by both clocks (the watchdog hard reset
//! and the boundary sign-flip are the two documented recovery exceptions).

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;

use crate::atlas::SheetCell;

/// Stable identifier for an actor, matching its index in the persisted
/// snapshot.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActorId(pub i64);

/// World-space position; `z` is negative-forward depth.
#[derive(Component, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct Position(pub Vec3);

/// World-space velocity in pixels per tick.
#[derive(Component, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct Velocity(pub Vec3);

/// Smoothed orientation driving sprite-frame selection.
#[derive(Component, Debug, Clone, Copy)]
pub struct Orientation {
    /// Heading around the vertical axis, in `[0, 2*PI)` radians.
    pub yaw: f32,
    /// Polar angle from the `+y` pole, in `[0, PI]` radians.
    pub pitch: f32,
    /// Residual yaw error after smoothing, in radians; feeds banking roll.
    pub bank: f32,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: FRAC_PI_2,
            bank: 0.0,
        }
    }
}

/// Desired velocity handed to the steering controller, in pixels per tick.
///
/// Written by the AI director; the steering controller only ever flips one
/// component's sign when bouncing an actor off a frustum wall.
#[derive(Component, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct DesiredVelocity(pub Vec3);

/// The world-space destination an actor is currently making for.
#[derive(Component, Debug, Clone, Copy, Deref, DerefMut)]
pub struct Waypoint(pub Vec3);

impl Default for Waypoint {
    fn default() -> Self {
        Self(Vec3::new(0.0, 0.0, -5000.0))
    }
}

/// Behavioural phase of a non-hero actor.
///
/// Only the actor currently selected for pursuit leaves [`AiPhase::Wander`];
/// it then loops between fleeing to a corner and buzzing a peer for as long
/// as it stays selected.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiPhase {
    /// Free roaming between waypoints.
    #[default]
    Wander,
    /// Fleeing to the frustum corner diagonally opposite the hero.
    Reset,
    /// Flying by a peer before fleeing again.
    Pass {
        /// The peer currently being buzzed.
        peer: Entity,
    },
}

impl AiPhase {
    /// Transition taken when an actor becomes the pursued target.
    #[must_use]
    pub const fn on_selected(self) -> Self {
        Self::Reset
    }

    /// Transition taken when an actor stops being the pursued target.
    #[must_use]
    pub const fn on_deselected(self) -> Self {
        Self::Wander
    }

    /// Whether this phase is the free-roaming default.
    #[must_use]
    pub const fn is_wander(self) -> bool {
        matches!(self, Self::Wander)
    }
}

/// Seconds spent chasing the current waypoint; reset on every re-plan.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Watchdog(pub f32);

/// Marker for the single hero actor the rest of the fleet reacts to.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hero;

/// Opaque reference to the rendering surface owned by one actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u64);

/// Per-actor draw state published to the presentation layer each tick.
///
/// The core never touches pixels; this is the whole rendering contract.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct DrawState {
    /// Top-left corner of the sprite tile in screen pixels.
    pub screen: Vec2,
    /// Uniform scale factor from perspective projection.
    pub scale: f32,
    /// Selected sprite-sheet cell.
    pub cell: SheetCell,
    /// Screen roll in degrees (base cell roll plus banking).
    pub roll_deg: f32,
    /// Stacking index; larger values draw on top.
    pub layer: usize,
}
