//! Shared test fixtures and helpers for simulation integration tests.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use flotilla::compositor::SheetSpec;
use flotilla::director::{acquire_target_system, plan_system};
use flotilla::persistence::{encode, SavedActor, SavedState, StateStore, STATE_VERSION};
use flotilla::viewport::FixedViewport;
use flotilla::{
    AiPhase, CurrentTarget, Hero, Position, SimConfig, SimulationParams, SimulationPlugin,
};

/// Frame delta every test tick advances time by.
pub const FRAME: Duration = Duration::from_millis(16);

/// Parameters for a deterministic test simulation: seeded RNG, fixed
/// viewport, caller-supplied store.
pub fn seeded_params(actors: usize, store: Arc<dyn StateStore>) -> SimulationParams {
    let config = SimConfig {
        seed: Some(42),
        ..SimConfig::default()
    };
    SimulationParams {
        config,
        sheets: vec![SheetSpec { tile_px: 840.0 }; actors],
        viewport: Arc::new(FixedViewport(Vec2::new(1280.0, 800.0))),
        store,
        heat: None,
    }
}

/// Serialises a current-version snapshot blob for preloading stores.
pub fn snapshot_blob(actors: Vec<SavedActor>) -> String {
    let state = SavedState {
        version: STATE_VERSION.to_owned(),
        actors,
    };
    encode(&state).expect("snapshot encodes")
}

/// A saved actor at rest at the given position.
pub fn resting_actor(x: f32, y: f32, z: f32) -> SavedActor {
    SavedActor {
        x,
        y,
        z,
        vx: 0.0,
        vy: 0.0,
        vz: 0.0,
        yaw: 0.0,
        pitch: std::f32::consts::FRAC_PI_2,
    }
}

/// Builder for test `App` instances with deterministic time.
pub struct SimTestAppBuilder {
    app: App,
}

impl SimTestAppBuilder {
    /// Creates a test app running the simulation plugin under manual time:
    /// every `tick` advances the clock by exactly [`FRAME`].
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
            .add_plugins(SimulationPlugin { params });
        Self { app }
    }

    /// Runs one update cycle (the first one also spawns the fleet).
    pub fn tick(&mut self) {
        self.app.update();
    }

    /// Runs `count` update cycles.
    pub fn tick_n(&mut self, count: usize) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Runs the director's acquisition and planning passes immediately,
    /// bypassing the AI timer.
    pub fn run_ai(&mut self) {
        self.app
            .world_mut()
            .run_system_once(acquire_target_system)
            .expect("acquire system runs");
        self.app
            .world_mut()
            .run_system_once(plan_system)
            .expect("plan system runs");
    }

    /// The hero entity.
    pub fn hero(&mut self) -> Entity {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<Entity, With<Hero>>();
        query.single(world).expect("exactly one hero")
    }

    /// Every non-hero entity.
    pub fn peers(&mut self) -> Vec<Entity> {
        let world = self.app.world_mut();
        let mut query = world.query_filtered::<Entity, Without<Hero>>();
        query.iter(world).collect()
    }

    /// Position of an entity.
    pub fn position(&mut self, entity: Entity) -> Vec3 {
        self.app
            .world()
            .get::<Position>(entity)
            .expect("entity has a position")
            .0
    }

    /// Moves an entity directly (test-only manipulation).
    pub fn place(&mut self, entity: Entity, position: Vec3) {
        self.app
            .world_mut()
            .get_mut::<Position>(entity)
            .expect("entity has a position")
            .0 = position;
    }

    /// AI phase of an entity.
    pub fn phase(&mut self, entity: Entity) -> AiPhase {
        *self
            .app
            .world()
            .get::<AiPhase>(entity)
            .expect("entity has a phase")
    }

    /// The currently pursued entity, if any.
    pub fn current_target(&mut self) -> Option<Entity> {
        self.app.world().resource::<CurrentTarget>().0
    }

    /// Direct world access.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}

/// Asserts that at most one non-hero actor sits outside the wander phase.
pub fn assert_phase_exclusivity(builder: &mut SimTestAppBuilder) -> Result<()> {
    let peers = builder.peers();
    let active: Vec<Entity> = peers
        .into_iter()
        .filter(|&peer| !builder.phase(peer).is_wander())
        .collect();
    ensure!(
        active.len() <= 1,
        "expected at most one non-wander actor, found {active:?}"
    );
    if let Some(&only) = active.first() {
        let target = builder
            .current_target()
            .context("a non-wander actor requires a current target")?;
        ensure!(
            only == target,
            "non-wander actor {only:?} is not the current target {target:?}"
        );
    }
    Ok(())
}
