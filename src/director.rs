//! AI director.
//!
//! Runs on its own coarse clock, an order of magnitude slower than the render
//! tick, and only ever writes the AI-owned fields: desired velocities,
//! waypoints, phases, and watchdogs. Target acquisition keeps exactly one
//! pursued actor at a time; the pursued actor loops between fleeing to the
//! corner opposite the hero and buzzing a peer; everyone else sweeps across
//! the field of view between waypoints.

use bevy::prelude::*;
use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::components::{
    AiPhase, DesiredVelocity, Hero, Position, Velocity, Watchdog, Waypoint,
};
use crate::config::SimConfig;
use crate::projection::frustum_half_extents;
use crate::sim::SimRng;
use crate::vector_math::normalize_or_zero;
use crate::viewport::Viewport;

/// The single actor currently selected for hero pursuit, if any.
///
/// Holding this as a resource makes the at-most-one-target invariant
/// structural rather than something to police across components.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CurrentTarget(pub Option<Entity>);

impl CurrentTarget {
    /// Whether `entity` is the currently pursued actor.
    #[must_use]
    pub fn is(&self, entity: Entity) -> bool {
        self.0 == Some(entity)
    }
}

/// Snapshot row used while planning: entity, position, hero flag.
type PlanRow = (Entity, Vec3, bool);

/// Direction from `from` to `to`, scaled to `speed`; zero when the points
/// coincide.
#[must_use]
pub fn toward(from: Vec3, to: Vec3, speed: f32) -> Vec3 {
    normalize_or_zero(to - from) * speed
}

/// Destination in the frustum quadrant diagonally opposite the hero, placed
/// comfortably inside the depth-scaled bounds.
///
/// The depth band flips relative to the fleeing actor's own depth, so the
/// escape also crosses the depth axis.
#[must_use]
pub fn flee_corner(own: Vec3, hero: Vec3, half_viewport: Vec2, config: &SimConfig) -> Vec3 {
    let z = if own.z > config.depth_split {
        (config.deep_band[0] + config.deep_band[1]) * 0.5
    } else {
        (config.shallow_band[0] + config.shallow_band[1]) * 0.5
    };
    let bounds = frustum_half_extents(z, half_viewport, config.focal_length) * config.flee_fraction;
    let side_x = if hero.x >= 0.0 { -1.0 } else { 1.0 };
    let side_y = if hero.y >= 0.0 { -1.0 } else { 1.0 };
    Vec3::new(side_x * bounds.x, side_y * bounds.y, z)
}

/// Picks a fresh wander destination: the opposite horizontal half of the
/// frustum, a random height, and the depth band across the split from the
/// actor's current depth.
pub fn wander_waypoint(
    own: Vec3,
    half_viewport: Vec2,
    config: &SimConfig,
    rng: &mut ChaCha8Rng,
) -> Vec3 {
    let z = if own.z < config.depth_split {
        rng.gen_range(config.shallow_band[0]..=config.shallow_band[1])
    } else {
        rng.gen_range(config.deep_band[0]..=config.deep_band[1])
    };
    let bounds = frustum_half_extents(z, half_viewport, config.focal_length) * config.flee_fraction;
    let side = if own.x > 0.0 { -1.0 } else { 1.0 };
    Vec3::new(
        side * bounds.x,
        (rng.gen::<f32>() - 0.5) * bounds.y,
        z,
    )
}

/// Selects the non-hero actor nearest the hero as the pursuit target.
///
/// Reassignment demotes the previous holder to [`AiPhase::Wander`] and
/// promotes the new one to [`AiPhase::Reset`] in the same tick, so at most
/// one actor is ever outside the wander phase.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn acquire_target_system(
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    mut current: ResMut<CurrentTarget>,
    hero: Query<&Position, With<Hero>>,
    peers: Query<(Entity, &Position), Without<Hero>>,
    mut states: Query<(&mut AiPhase, &mut Waypoint, &mut Watchdog), Without<Hero>>,
) {
    let Ok(hero_position) = hero.single() else {
        return;
    };

    let mut nearest: Option<(Entity, f32)> = None;
    for (entity, position) in &peers {
        let distance = hero_position.0.distance(position.0);
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((entity, distance));
        }
    }
    let next = nearest.map(|(entity, _)| entity);
    if next == current.0 {
        return;
    }

    if let Some(previous) = current.0 {
        if let Ok((mut phase, _, _)) = states.get_mut(previous) {
            let demoted = phase.on_deselected();
            *phase = demoted;
        }
    }
    if let Some(target) = next {
        let own = peers.get(target).map_or(Vec3::ZERO, |(_, p)| p.0);
        if let Ok((mut phase, mut waypoint, mut watchdog)) = states.get_mut(target) {
            let promoted = phase.on_selected();
            *phase = promoted;
            watchdog.0 = 0.0;
            // Seed the escape destination once, on entry. A degenerate
            // viewport seeds the actor's own position, which resolves to an
            // immediate arrival on the next planning pass.
            waypoint.0 = viewport
                .half_extents()
                .map_or(own, |half| flee_corner(own, hero_position.0, half, &config));
        }
        debug!("hero now pursues {target:?}");
    }
    current.0 = next;
}

/// Plans every actor's waypoint and desired velocity for the coming render
/// ticks.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn plan_system(
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    current: Res<CurrentTarget>,
    mut rng: ResMut<SimRng>,
    snapshot: Query<(Entity, &Position, Option<&Hero>)>,
    mut actors: Query<(
        Entity,
        &Position,
        &Velocity,
        Option<&Hero>,
        &mut DesiredVelocity,
        &mut AiPhase,
        &mut Waypoint,
        &mut Watchdog,
    )>,
) {
    let Some(half) = viewport.half_extents() else {
        return;
    };

    // Positions are read through a snapshot so the mutable pass below can
    // still see every peer.
    let rows: Vec<PlanRow> = snapshot
        .iter()
        .map(|(entity, position, hero)| (entity, position.0, hero.is_some()))
        .collect();
    let hero_position = rows
        .iter()
        .find(|(_, _, is_hero)| *is_hero)
        .map(|(_, position, _)| *position)
        .unwrap_or(Vec3::ZERO);

    for (entity, position, velocity, hero, mut desired, mut phase, mut waypoint, mut watchdog) in
        &mut actors
    {
        if hero.is_some() {
            plan_hero(
                &config,
                half,
                &current,
                &rows,
                position.0,
                velocity.0,
                &mut rng.0,
                &mut *desired,
                &mut *waypoint,
                &mut *watchdog,
            );
        } else if current.is(entity) {
            plan_evader(
                &config,
                half,
                entity,
                &rows,
                position.0,
                hero_position,
                &mut rng.0,
                &mut *desired,
                &mut *phase,
                &mut *waypoint,
                &mut *watchdog,
            );
        } else {
            if !phase.is_wander() {
                let demoted = phase.on_deselected();
                *phase = demoted;
            }
            plan_wanderer(
                &config,
                half,
                config.wanderer_speed,
                position.0,
                velocity.0,
                &mut rng.0,
                &mut *desired,
                &mut *waypoint,
                &mut *watchdog,
            );
        }
    }
}

/// Hero planning: chase the pursued actor, or fall back to plain wandering
/// when the fleet has no peers (single-actor builds).
#[expect(
    clippy::too_many_arguments,
    reason = "Planning needs the full per-actor field set; bundling would obscure the ownership split."
)]
fn plan_hero(
    config: &SimConfig,
    half_viewport: Vec2,
    current: &CurrentTarget,
    rows: &[PlanRow],
    position: Vec3,
    velocity: Vec3,
    rng: &mut ChaCha8Rng,
    desired: &mut DesiredVelocity,
    waypoint: &mut Waypoint,
    watchdog: &mut Watchdog,
) {
    if let Some(prey) = current.0.and_then(|target| position_of(rows, target)) {
        waypoint.0 = prey;
        watchdog.0 = 0.0;
        desired.0 = toward(position, prey, config.hero_speed);
    } else {
        plan_wanderer(
            config,
            half_viewport,
            config.hero_speed,
            position,
            velocity,
            rng,
            desired,
            waypoint,
            watchdog,
        );
    }
}

/// Evasion state machine for the pursued actor: flee to the opposite corner,
/// then buzz a peer, forever, while selected.
#[expect(
    clippy::too_many_arguments,
    reason = "Planning needs the full per-actor field set; bundling would obscure the ownership split."
)]
fn plan_evader(
    config: &SimConfig,
    half_viewport: Vec2,
    own_entity: Entity,
    rows: &[PlanRow],
    position: Vec3,
    hero_position: Vec3,
    rng: &mut ChaCha8Rng,
    desired: &mut DesiredVelocity,
    phase: &mut AiPhase,
    waypoint: &mut Waypoint,
    watchdog: &mut Watchdog,
) {
    // A freshly promoted actor that acquisition could not reach starts here.
    if phase.is_wander() {
        *phase = phase.on_selected();
        watchdog.0 = 0.0;
        waypoint.0 = flee_corner(position, hero_position, half_viewport, config);
    }

    match *phase {
        AiPhase::Reset => {
            // The escape destination was fixed on entry; chasing a moving
            // corner would let the hero's own motion flip it forever.
            if position.distance(waypoint.0) < config.arrival_radius {
                if let Some(peer) = pick_flyby_peer(rows, own_entity, rng) {
                    *phase = AiPhase::Pass { peer };
                    watchdog.0 = 0.0;
                    if let Some(peer_position) = position_of(rows, peer) {
                        waypoint.0 = peer_position;
                    }
                    debug!("evader {own_entity:?} passing by {peer:?}");
                }
            }
        }
        AiPhase::Pass { peer } => {
            if let Some(peer_position) = position_of(rows, peer) {
                waypoint.0 = peer_position;
                if position.distance(peer_position) < config.arrival_radius {
                    *phase = AiPhase::Reset;
                    watchdog.0 = 0.0;
                    waypoint.0 = flee_corner(position, hero_position, half_viewport, config);
                }
            } else {
                *phase = AiPhase::Reset;
                watchdog.0 = 0.0;
                waypoint.0 = flee_corner(position, hero_position, half_viewport, config);
            }
        }
        AiPhase::Wander => {}
    }

    desired.0 = toward(position, waypoint.0, config.evader_speed);
}

/// Wander planning shared by wanderers and the peerless hero: re-pick the
/// waypoint near arrival, near a wall, on a stall, or on a small random
/// re-roll, then head for it.
#[expect(
    clippy::too_many_arguments,
    reason = "Planning needs the full per-actor field set; bundling would obscure the ownership split."
)]
fn plan_wanderer(
    config: &SimConfig,
    half_viewport: Vec2,
    speed: f32,
    position: Vec3,
    velocity: Vec3,
    rng: &mut ChaCha8Rng,
    desired: &mut DesiredVelocity,
    waypoint: &mut Waypoint,
    watchdog: &mut Watchdog,
) {
    let bounds = frustum_half_extents(position.z, half_viewport, config.focal_length);
    let near_wall = position.x.abs() > bounds.x * config.wall_fraction
        || position.y.abs() > bounds.y * config.wall_fraction;
    let arrived = position.distance(waypoint.0) < config.arrival_radius;
    let stalled = velocity.length() < config.stall_speed;

    if arrived || near_wall || stalled || rng.gen_bool(f64::from(config.reroll_chance)) {
        waypoint.0 = wander_waypoint(position, half_viewport, config, rng);
        watchdog.0 = 0.0;
    }

    desired.0 = toward(position, waypoint.0, speed);
}

/// Random flyby candidate: any non-hero actor other than the evader itself,
/// falling back to the hero when the fleet has no third actor.
fn pick_flyby_peer(rows: &[PlanRow], own_entity: Entity, rng: &mut ChaCha8Rng) -> Option<Entity> {
    let candidates: Vec<Entity> = rows
        .iter()
        .filter(|(entity, _, is_hero)| !is_hero && *entity != own_entity)
        .map(|(entity, _, _)| *entity)
        .collect();
    candidates.choose(rng).copied().or_else(|| {
        rows.iter()
            .find(|(_, _, is_hero)| *is_hero)
            .map(|(entity, _, _)| *entity)
    })
}

/// Position of `target` in the planning snapshot.
fn position_of(rows: &[PlanRow], target: Entity) -> Option<Vec3> {
    rows.iter()
        .find(|(entity, _, _)| *entity == target)
        .map(|(_, position, _)| *position)
}

/// Liveness backstop: an actor stuck chasing one waypoint past the budget is
/// re-entered from just outside a horizontal edge with a fresh destination.
///
/// This is the one place the AI clock writes render-owned kinematics; it is
/// a rare recovery path, not part of steady-state planning.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn watchdog_system(
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    mut rng: ResMut<SimRng>,
    mut actors: Query<(
        Entity,
        &mut Position,
        &mut Velocity,
        &mut Waypoint,
        &mut Watchdog,
    )>,
) {
    let Some(half) = viewport.half_extents() else {
        return;
    };
    let interval = config.ai_interval.as_secs_f32();

    for (entity, mut position, mut velocity, mut waypoint, mut watchdog) in &mut actors {
        watchdog.0 += interval;
        if watchdog.0 <= config.watchdog_budget {
            continue;
        }
        warn!("actor {entity:?} failed to reach its waypoint in time; hard reset");
        let z = rng
            .0
            .gen_range(config.shallow_band[0]..=config.shallow_band[1]);
        let bounds = frustum_half_extents(z, half, config.focal_length);
        let side = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
        position.0 = Vec3::new(side * bounds.x, (rng.0.gen::<f32>() - 0.5) * bounds.y, z);
        velocity.0 = Vec3::ZERO;
        waypoint.0 = wander_waypoint(position.0, half, &config, &mut rng.0);
        watchdog.0 = 0.0;
    }
}
