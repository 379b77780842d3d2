//! Tuning configuration for the actor simulation.
//!
//! Every speed, gain, and threshold that shapes actor behaviour lives here as
//! data, so the hero/evader/wanderer variants differ only in which field they
//! read. Defaults reproduce the tuning of the shipped background animation.

use std::time::Duration;

use bevy::prelude::*;

/// Tuning values shared by the steering, director, and projection systems.
///
/// Units are documented per field. "Tick" refers to one nominal 60 Hz render
/// frame; the steering integrator rescales real elapsed time into ticks so
/// the values below stay meaningful at any refresh rate.
#[derive(Resource, Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Distance from the virtual camera to the projection plane, in pixels.
    ///
    /// Shared by every actor so relative depth cues stay consistent.
    pub focal_length: f32,

    /// Fallback sprite tile edge length in pixels, used when a sprite handle
    /// has no registered sheet.
    pub tile_px: f32,

    /// Nearest allowed depth (inclusive). Depth is negative-forward, so this
    /// is the largest permitted `z`.
    pub z_near: f32,

    /// Farthest allowed depth (inclusive); the smallest permitted `z`.
    pub z_far: f32,

    /// Hero cruise speed in pixels per tick.
    pub hero_speed: f32,

    /// Speed of the actor currently being pursued, in pixels per tick.
    /// Faster than the hero so chases stay open-ended.
    pub evader_speed: f32,

    /// Wanderer cruise speed in pixels per tick.
    pub wanderer_speed: f32,

    /// Fraction of the velocity/orientation error closed per tick for
    /// non-pursued actors (first-order lag smoothing factor).
    pub base_gain: f32,

    /// Smoothing factor for the pursued actor; higher, so it turns sharper.
    pub pursuit_gain: f32,

    /// Screen-roll contribution per radian of residual yaw error, in degrees.
    pub banking_gain_deg: f32,

    /// Pitch is clamped to `[pitch_margin, PI - pitch_margin]` radians to
    /// keep actors off the degenerate pole frames during normal flight.
    pub pitch_margin: f32,

    /// Amplitude of the idle pitch bob, in radians.
    pub bob_amplitude: f32,

    /// Angular rate of the idle pitch bob, in radians per second.
    pub bob_rate: f32,

    /// Fraction of the frustum bound beyond which an actor counts as "near
    /// the wall" for waypoint re-planning.
    pub wall_fraction: f32,

    /// Fraction of the frustum bound used when placing flee corners and
    /// wander waypoints, keeping destinations comfortably inside the walls.
    pub flee_fraction: f32,

    /// Distance to a waypoint, in pixels, below which the actor counts as
    /// arrived.
    pub arrival_radius: f32,

    /// Speed magnitude, in pixels per tick, below which a wanderer counts as
    /// stalled and re-plans.
    pub stall_speed: f32,

    /// Probability per AI tick that a wanderer re-rolls its waypoint early.
    pub reroll_chance: f32,

    /// Depth that separates the shallow and deep wander bands; crossing it
    /// flips which band the next waypoint lands in.
    pub depth_split: f32,

    /// Depth band `[min, max]` for waypoints near the viewer.
    pub shallow_band: [f32; 2],

    /// Depth band `[min, max]` for waypoints far from the viewer.
    pub deep_band: [f32; 2],

    /// Half-width of the square actors spawn into, in pixels, when no saved
    /// state is available.
    pub spawn_spread: f32,

    /// Depth band `[min, max]` freshly spawned actors are placed in.
    pub spawn_band: [f32; 2],

    /// Nominal render tick rate in Hz; real elapsed time is rescaled by this
    /// so per-tick speeds and gains are frame-rate independent.
    pub tick_rate: f32,

    /// Upper bound on the rescaled tick delta, in ticks, so a frame hitch
    /// cannot teleport actors.
    pub max_tick_scale: f32,

    /// Wall-clock interval between AI director ticks.
    pub ai_interval: Duration,

    /// Seconds an actor may chase one waypoint before the watchdog hard-resets
    /// its position and destination. Generous: waypoints re-roll long before
    /// this fires in normal operation.
    pub watchdog_budget: f32,

    /// Seed for the simulation RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            focal_length: 1000.0,
            tile_px: 840.0,
            z_near: 0.0,
            z_far: -15_000.0,
            hero_speed: 2.0,
            evader_speed: 3.6,
            wanderer_speed: 1.2,
            base_gain: 0.01,
            pursuit_gain: 0.02,
            banking_gain_deg: 45.0,
            pitch_margin: 0.4,
            bob_amplitude: 0.3,
            bob_rate: 0.2,
            wall_fraction: 0.85,
            flee_fraction: 0.7,
            arrival_radius: 400.0,
            stall_speed: 0.05,
            reroll_chance: 0.02,
            depth_split: -6000.0,
            shallow_band: [-2500.0, -500.0],
            deep_band: [-14_000.0, -8000.0],
            spawn_spread: 200.0,
            spawn_band: [-4000.0, -2000.0],
            tick_rate: 60.0,
            max_tick_scale: 2.0,
            ai_interval: Duration::from_millis(400),
            watchdog_budget: 120.0,
            seed: None,
        }
    }
}

impl SimConfig {
    /// Steering gain for an actor, depending on whether it is the one
    /// currently being pursued.
    #[must_use]
    pub const fn gain_for(&self, pursued: bool) -> f32 {
        if pursued {
            self.pursuit_gain
        } else {
            self.base_gain
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let config = SimConfig::default();
        assert!(config.focal_length > 0.0);
        assert!(config.z_far < config.z_near);
        assert!(config.evader_speed > config.hero_speed);
        assert!(config.pursuit_gain > config.base_gain);
        assert!(config.shallow_band[0] <= config.shallow_band[1]);
        assert!(config.deep_band[0] <= config.deep_band[1]);
        assert!(config.deep_band[1] < config.shallow_band[0]);
        assert!(config.wall_fraction > config.flee_fraction);
    }

    #[test]
    fn gain_selection_prefers_pursuit() {
        let config = SimConfig::default();
        assert!(config.gain_for(true) > config.gain_for(false));
    }
}
