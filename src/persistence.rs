//! Cross-session persistence of actor state.
//!
//! One versioned snapshot per simulation instance, produced at teardown and
//! consumed at startup. The blob format is the injected [`StateStore`]'s
//! business; this module owns the schema, version gating, and the
//! sanitisation that turns a stale or corrupt snapshot back into usable
//! state instead of an error.

use std::f32::consts::PI;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use bevy::prelude::*;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::{ActorId, Orientation, Position, Velocity};
use crate::config::SimConfig;
use crate::projection::frustum_half_extents;
use crate::vector_math::wrap_yaw;

/// Schema version written into every snapshot. A snapshot carrying any other
/// value is discarded wholesale.
pub const STATE_VERSION: &str = "flotilla/1";

/// Kinematic and orientation state of one actor, as persisted.
///
/// Targets and AI phases are transient and re-derived on the next AI tick,
/// so they are deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedActor {
    /// Position, pixels.
    pub x: f32,
    /// Position, pixels.
    pub y: f32,
    /// Depth, pixels (negative-forward).
    pub z: f32,
    /// Velocity, pixels per tick.
    pub vx: f32,
    /// Velocity, pixels per tick.
    pub vy: f32,
    /// Velocity, pixels per tick.
    pub vz: f32,
    /// Yaw, radians.
    pub yaw: f32,
    /// Pitch (polar angle), radians.
    pub pitch: f32,
}

/// One snapshot of the whole fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Schema version; see [`STATE_VERSION`].
    pub version: String,
    /// Per-actor state, ordered by actor id.
    pub actors: Vec<SavedActor>,
}

/// Errors from the persistence layer. All of them are recovered locally by
/// falling back to randomised defaults; none is fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage failed.
    #[error("storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    /// The blob did not parse as a snapshot.
    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
    /// The blob parsed but was written by an incompatible engine version.
    #[error("snapshot version {found:?} does not match the engine schema")]
    Version {
        /// Version string found in the snapshot.
        found: String,
    },
}

/// Opaque blob storage for one snapshot.
///
/// Implementations decide where the blob lives; the simulation only promises
/// to call `load` once at startup and `save` once at teardown.
pub trait StateStore: Send + Sync {
    /// Loads the stored blob, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<String>, StoreError>;
    /// Replaces the stored blob.
    fn save(&self, blob: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<String>>,
}

impl MemoryStore {
    /// Creates a store pre-loaded with a blob, as if a previous session had
    /// saved it.
    #[must_use]
    pub fn preloaded(blob: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(blob.into())),
        }
    }
}

impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        Ok(slot.clone())
    }

    fn save(&self, blob: &str) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(blob.to_owned());
        Ok(())
    }
}

/// File-backed store, the headless analogue of per-origin browser storage.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store saving to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, blob: &str) -> Result<(), StoreError> {
        std::fs::write(&self.path, blob)?;
        Ok(())
    }
}

/// Injected handle to the snapshot store.
#[derive(Resource, Clone)]
pub struct StateStoreHandle(pub Arc<dyn StateStore>);

/// Serialises a snapshot to its blob form.
///
/// # Errors
/// Returns [`StoreError::Parse`] if serialisation fails, which only happens
/// for non-finite floats the sanitiser would have rejected anyway.
pub fn encode(state: &SavedState) -> Result<String, StoreError> {
    Ok(serde_json::to_string(state)?)
}

/// Parses and version-gates a snapshot blob.
///
/// # Errors
/// Returns [`StoreError::Parse`] for malformed JSON and
/// [`StoreError::Version`] for a snapshot from an incompatible engine.
pub fn decode(blob: &str) -> Result<SavedState, StoreError> {
    let state: SavedState = serde_json::from_str(blob)?;
    if state.version == STATE_VERSION {
        Ok(state)
    } else {
        Err(StoreError::Version {
            found: state.version,
        })
    }
}

/// Replaces a non-finite value with a fallback.
fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

impl SavedActor {
    /// Returns a copy with every field forced back into valid range.
    ///
    /// Non-finite fields fall back to resting defaults, depth clamps into the
    /// configured range, and position clamps into the depth-scaled frustum
    /// when the viewport size is known. Restored state is therefore always
    /// usable, never rejected outright.
    #[must_use]
    pub fn sanitized(&self, config: &SimConfig, half_viewport: Option<Vec2>) -> Self {
        let z = finite_or(self.z, config.spawn_band[1]).clamp(config.z_far, config.z_near);
        let mut x = finite_or(self.x, 0.0);
        let mut y = finite_or(self.y, 0.0);
        if let Some(half) = half_viewport {
            let bounds = frustum_half_extents(z, half, config.focal_length);
            x = x.clamp(-bounds.x, bounds.x);
            y = y.clamp(-bounds.y, bounds.y);
        }
        Self {
            x,
            y,
            z,
            vx: finite_or(self.vx, 0.0),
            vy: finite_or(self.vy, 0.0),
            vz: finite_or(self.vz, 0.0),
            yaw: wrap_yaw(finite_or(self.yaw, 0.0)),
            pitch: finite_or(self.pitch, PI / 2.0)
                .clamp(config.pitch_margin, PI - config.pitch_margin),
        }
    }
}

/// Snapshots every actor and hands the blob to the injected store.
///
/// Runs exactly once, from the teardown hook; failures are logged and
/// swallowed so shutdown never surfaces an error to the host.
pub fn save_world_state(world: &mut World) {
    let Some(store) = world.get_resource::<StateStoreHandle>().cloned() else {
        warn!("no state store configured; skipping snapshot");
        return;
    };

    let mut query = world.query::<(&ActorId, &Position, &Velocity, &Orientation)>();
    let mut rows: Vec<(i64, SavedActor)> = query
        .iter(world)
        .map(|(id, position, velocity, orientation)| {
            (
                id.0,
                SavedActor {
                    x: position.0.x,
                    y: position.0.y,
                    z: position.0.z,
                    vx: velocity.0.x,
                    vy: velocity.0.y,
                    vz: velocity.0.z,
                    yaw: orientation.yaw,
                    pitch: orientation.pitch,
                },
            )
        })
        .collect();
    rows.sort_by_key(|(id, _)| *id);

    let state = SavedState {
        version: STATE_VERSION.to_owned(),
        actors: rows.into_iter().map(|(_, actor)| actor).collect(),
    };

    match encode(&state).and_then(|blob| store.0.save(&blob)) {
        Ok(()) => info!("persisted {} actors", state.actors.len()),
        Err(e) => warn!("failed to persist actor state: {e}"),
    }
}
