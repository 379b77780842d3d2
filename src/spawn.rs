//! Startup spawning of the actor fleet.
//!
//! Actors are created exactly once, from the persisted snapshot when one is
//! present and well-formed, otherwise from randomised defaults inside the
//! visible bounds. The first roster entry is the hero. Actors are never
//! despawned individually; the whole set lives until teardown.

use bevy::prelude::*;
use log::{info, warn};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::components::{
    ActorId, AiPhase, DesiredVelocity, DrawState, Hero, Orientation, Position, SpriteHandle,
    Velocity, Watchdog, Waypoint,
};
use crate::compositor::{SheetSpec, SpriteLibrary};
use crate::config::SimConfig;
use crate::persistence::{decode, SavedActor, StateStoreHandle};
use crate::sim::SimRng;
use crate::viewport::Viewport;

/// Sheet roster handed to the startup system: one surface per actor, hero
/// first.
#[derive(Resource, Debug, Clone)]
pub struct SpawnRoster(pub Vec<SheetSpec>);

/// Loads the persisted snapshot, if the store has a usable one.
fn restore_snapshot(store: &StateStoreHandle) -> Vec<SavedActor> {
    match store.0.load() {
        Ok(Some(blob)) => match decode(&blob) {
            Ok(state) => {
                info!("restored snapshot with {} actors", state.actors.len());
                state.actors
            }
            Err(e) => {
                warn!("discarding saved state: {e}");
                Vec::new()
            }
        },
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!("saved state unavailable: {e}");
            Vec::new()
        }
    }
}

/// Randomised default state for one actor: near the view axis, at a
/// comfortable depth, at rest.
fn random_actor(config: &SimConfig, rng: &mut ChaCha8Rng) -> SavedActor {
    SavedActor {
        x: (rng.gen::<f32>() - 0.5) * 2.0 * config.spawn_spread,
        y: (rng.gen::<f32>() - 0.5) * 2.0 * config.spawn_spread,
        z: rng.gen_range(config.spawn_band[0]..=config.spawn_band[1]),
        vx: 0.0,
        vy: 0.0,
        vz: 0.0,
        yaw: 0.0,
        pitch: std::f32::consts::FRAC_PI_2,
    }
}

/// Spawns the fleet from restored-or-default state and registers each
/// actor's sprite surface.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn spawn_actors_system(
    mut commands: Commands,
    roster: Res<SpawnRoster>,
    store: Res<StateStoreHandle>,
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    mut library: ResMut<SpriteLibrary>,
    mut rng: ResMut<SimRng>,
) {
    let saved = restore_snapshot(&store);
    let half = viewport.half_extents();

    for (index, sheet) in roster.0.iter().enumerate() {
        let state = saved
            .get(index)
            .map_or_else(|| random_actor(&config, &mut rng.0), |s| *s)
            .sanitized(&config, half);

        let id = i64::try_from(index).unwrap_or(i64::MAX);
        let handle = SpriteHandle(u64::try_from(index).unwrap_or(u64::MAX));
        library.register(handle, *sheet);

        let mut actor = commands.spawn((
            ActorId(id),
            Position(Vec3::new(state.x, state.y, state.z)),
            Velocity(Vec3::new(state.vx, state.vy, state.vz)),
            Orientation {
                yaw: state.yaw,
                pitch: state.pitch,
                bank: 0.0,
            },
            DesiredVelocity::default(),
            Waypoint::default(),
            AiPhase::default(),
            Watchdog::default(),
            handle,
            DrawState::default(),
        ));
        if index == 0 {
            actor.insert(Hero);
        }
    }

    info!(
        "spawned {} actors ({} restored)",
        roster.0.len(),
        saved.len().min(roster.0.len())
    );
}
