//! Library crate providing the core flotilla simulation.
//!
//! A small fleet of autonomous sprite actors flies through a depth-scaled
//! frustum behind the page: steering physics and orientation smoothing on
//! the render tick, target acquisition and evasion phases on a slower AI
//! tick, pure sprite-sheet and projection mapping, depth-sorted layering,
//! and versioned cross-session persistence. Re-exports the common types and
//! systems for the demo binary and tests.

pub mod atlas;
pub mod components;
pub mod compositor;
pub mod config;
pub mod director;
pub mod heat;
pub mod logging;
pub mod persistence;
pub mod projection;
pub mod sim;
pub mod spawn;
pub mod steering;
pub mod vector_math;
pub mod viewport;

// Re-export commonly used items
pub use atlas::{cell_for_orientation, SheetCell, SHEET_BANDS};
pub use components::{
    ActorId, AiPhase, DesiredVelocity, DrawState, Hero, Orientation, Position, SpriteHandle,
    Velocity, Watchdog, Waypoint,
};
pub use compositor::{SheetSpec, SpriteLibrary};
pub use config::SimConfig;
pub use director::CurrentTarget;
pub use heat::{ExternalHeat, HeatProbe, HeatSample};
pub use logging::init as init_logging;
pub use persistence::{
    FileStore, MemoryStore, SavedActor, SavedState, StateStore, StoreError, STATE_VERSION,
};
pub use projection::{frustum_half_extents, scale_for_depth};
pub use sim::{ActorDrawState, ActorSimulation, SimRng, SimulationParams, SimulationPlugin};
pub use viewport::{FixedViewport, Viewport, ViewportProvider};

pub mod prelude {
    //! Prelude exports used in documentation examples.
    //!
    //! ```rust,no_run
    //! use flotilla::prelude::*;
    //! ```

    pub use crate::atlas::{cell_for_orientation, SheetCell};
    pub use crate::compositor::SheetSpec;
    pub use crate::persistence::{FileStore, MemoryStore};
    pub use crate::sim::{ActorSimulation, SimulationParams, SimulationPlugin};
    pub use crate::viewport::FixedViewport;
    pub use crate::SimConfig;
}
