//! Viewport access for the simulation.
//!
//! The frustum bounds depend on the host page's viewport, which the core does
//! not own. A [`ViewportProvider`] is injected at construction and sampled
//! once per render tick into the [`Viewport`] resource; a resize therefore
//! reclamps actors on the next tick instead of resetting them.

use std::sync::Arc;

use bevy::prelude::*;
use log::debug;

/// Source of the current viewport size in pixels.
///
/// Implementations must tolerate being called every frame; a viewport that
/// has not been laid out yet should report zero size rather than fail.
pub trait ViewportProvider: Send + Sync {
    /// Current viewport `(width, height)` in pixels.
    fn size(&self) -> Vec2;
}

/// A provider that always reports the same size; useful for headless runs
/// and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedViewport(pub Vec2);

impl ViewportProvider for FixedViewport {
    fn size(&self) -> Vec2 {
        self.0
    }
}

/// Injected handle to the host's viewport query.
#[derive(Resource, Clone)]
pub struct ViewportSource(pub Arc<dyn ViewportProvider>);

/// The viewport size sampled for the current tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    size: Vec2,
}

impl Viewport {
    /// Creates a viewport of the given size.
    #[must_use]
    pub const fn new(size: Vec2) -> Self {
        Self { size }
    }

    /// Full viewport size in pixels.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Half-extents of the viewport, or `None` while the viewport is
    /// degenerate (zero-sized or not yet laid out).
    ///
    /// Systems treat `None` as a transient condition and no-op for the tick.
    #[must_use]
    pub fn half_extents(&self) -> Option<Vec2> {
        if self.size.x > 0.0 && self.size.y > 0.0 && self.size.is_finite() {
            Some(self.size * 0.5)
        } else {
            None
        }
    }
}

/// Samples the injected provider into the [`Viewport`] resource.
///
/// Runs first in the render chain so every downstream system sees one
/// consistent size for the whole tick.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn refresh_viewport_system(source: Res<ViewportSource>, mut viewport: ResMut<Viewport>) {
    let sampled = source.0.size();
    if sampled != viewport.size() {
        debug!(
            "viewport changed {}x{} -> {}x{}",
            viewport.size().x,
            viewport.size().y,
            sampled.x,
            sampled.y
        );
        *viewport = Viewport::new(sampled);
    }
}
