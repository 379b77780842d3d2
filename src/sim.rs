//! Simulation wiring.
//!
//! [`SimulationPlugin`] registers every resource and system on a headless
//! bevy `App`: render systems run each `Update`, director systems run behind
//! a wall-clock timer condition. Both chains share one logical thread, so
//! the AI-written fields are trivially visible to the next render tick with
//! no locking. The underlying systems are also exposed for tests.
//!
//! [`ActorSimulation`] wraps the same plugin for hosts that are not bevy
//! apps themselves: construct once, call [`ActorSimulation::tick`] per
//! display frame, read [`ActorSimulation::draw_states`], and call
//! [`ActorSimulation::shutdown`] at the page-unload boundary.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::time::common_conditions::on_timer;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::atlas::SheetCell;
use crate::components::{ActorId, DrawState, SpriteHandle};
use crate::compositor::{compose_draw_system, depth_order_system, SheetSpec, SpriteLibrary};
use crate::config::SimConfig;
use crate::director::{acquire_target_system, plan_system, watchdog_system, CurrentTarget};
use crate::heat::{refresh_heat_system, ExternalHeat, HeatProbe, HeatProbeSource};
use crate::persistence::{save_world_state, StateStore, StateStoreHandle};
use crate::spawn::{spawn_actors_system, SpawnRoster};
use crate::steering::{orientation_system, steering_system};
use crate::viewport::{refresh_viewport_system, Viewport, ViewportProvider, ViewportSource};

/// Simulation random source, seeded for reproducible runs.
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    /// Builds the RNG from the configured seed, falling back to entropy.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(ChaCha8Rng::from_entropy, ChaCha8Rng::seed_from_u64);
        Self(rng)
    }
}

/// Everything needed to construct one simulation instance.
///
/// The viewport query, snapshot store, and heat probe are injected here
/// instead of being reached for ambiently, so hosts and tests can substitute
/// their own.
#[derive(Clone)]
pub struct SimulationParams {
    /// Tuning configuration.
    pub config: SimConfig,
    /// One sprite surface per actor, hero first. Must not be empty.
    pub sheets: Vec<SheetSpec>,
    /// Source of the current viewport size.
    pub viewport: Arc<dyn ViewportProvider>,
    /// Snapshot storage for cross-session persistence.
    pub store: Arc<dyn StateStore>,
    /// Optional external heat signal.
    pub heat: Option<Arc<dyn HeatProbe>>,
}

/// Bevy plugin wiring the whole simulation into an app.
pub struct SimulationPlugin {
    /// Construction parameters, cloned into resources at build time.
    pub params: SimulationParams,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        let params = self.params.clone();
        let ai_interval = params.config.ai_interval;

        app.insert_resource(SimRng::from_config(&params.config))
            .insert_resource(Viewport::new(params.viewport.size()))
            .insert_resource(ViewportSource(params.viewport))
            .insert_resource(StateStoreHandle(params.store))
            .insert_resource(HeatProbeSource(params.heat))
            .insert_resource(ExternalHeat::default())
            .insert_resource(CurrentTarget::default())
            .insert_resource(SpriteLibrary::default())
            .insert_resource(SpawnRoster(params.sheets))
            .insert_resource(params.config);

        app.add_systems(Startup, spawn_actors_system);
        app.add_systems(
            Update,
            (
                (
                    refresh_heat_system,
                    acquire_target_system,
                    plan_system,
                    watchdog_system,
                )
                    .chain()
                    .run_if(on_timer(ai_interval)),
                (
                    refresh_viewport_system,
                    steering_system,
                    orientation_system,
                    compose_draw_system,
                    depth_order_system,
                )
                    .chain(),
            )
                .chain(),
        );
    }
}

/// Draw state for one actor, as handed to a presentation layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorDrawState {
    /// Stable actor identifier.
    pub id: i64,
    /// The actor's sprite surface.
    pub sprite: SpriteHandle,
    /// Top-left corner of the sprite tile in screen pixels.
    pub screen: Vec2,
    /// Uniform perspective scale.
    pub scale: f32,
    /// Selected sheet cell.
    pub cell: SheetCell,
    /// Screen roll in degrees.
    pub roll_deg: f32,
    /// Stacking index; larger draws on top.
    pub layer: usize,
}

/// One simulation instance, owned by the host for the lifetime of the page.
pub struct ActorSimulation {
    app: App,
    halted: bool,
}

impl ActorSimulation {
    /// Builds a simulation from injected parameters. State is restored from
    /// the store on the first tick; nothing is simulated yet.
    #[must_use]
    pub fn new(params: SimulationParams) -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_plugins(SimulationPlugin { params });
        Self { app, halted: false }
    }

    /// Advances the simulation by one render frame. A no-op after
    /// [`ActorSimulation::shutdown`].
    pub fn tick(&mut self) {
        if !self.halted {
            self.app.update();
        }
    }

    /// Current per-actor draw state, ordered farthest first (ascending
    /// layer), ready to composite back to front.
    pub fn draw_states(&mut self) -> Vec<ActorDrawState> {
        let world = self.app.world_mut();
        let mut query = world.query::<(&ActorId, &SpriteHandle, &DrawState)>();
        let mut states: Vec<ActorDrawState> = query
            .iter(world)
            .map(|(id, sprite, draw)| ActorDrawState {
                id: id.0,
                sprite: *sprite,
                screen: draw.screen,
                scale: draw.scale,
                cell: draw.cell,
                roll_deg: draw.roll_deg,
                layer: draw.layer,
            })
            .collect();
        states.sort_by_key(|state| state.layer);
        states
    }

    /// Teardown hook: persists the fleet and halts both scheduled tasks.
    /// Idempotent; later calls (and later `tick`s) do nothing.
    pub fn shutdown(&mut self) {
        if self.halted {
            return;
        }
        save_world_state(self.app.world_mut());
        self.halted = true;
        info!("simulation halted");
    }

    /// Whether the teardown hook has run.
    #[must_use]
    pub const fn is_halted(&self) -> bool {
        self.halted
    }

    /// Direct world access for tests and embedders.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
