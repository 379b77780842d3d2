//! Optional read-only signal from an external heat source.
//!
//! The host page may run a decorative fire the simulation's ambient
//! neighbours react to (snow melting near it, for instance). The core only
//! ever *reads* that state, on the AI clock, and treats an absent probe as
//! the normal case.

use std::sync::Arc;

use bevy::prelude::*;

/// One sample of the external heat source's screen-space footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatSample {
    /// Centre of the heat source in screen pixels.
    pub centre: Vec2,
    /// Effective radius in pixels.
    pub radius: f32,
}

/// Source of the external heat signal. Returning `None` means the source is
/// absent or unlit.
pub trait HeatProbe: Send + Sync {
    /// Current heat footprint, if the source is active.
    fn sample(&self) -> Option<HeatSample>;
}

/// Injected probe handle; `None` when the host wired no heat source at all.
#[derive(Resource, Clone, Default)]
pub struct HeatProbeSource(pub Option<Arc<dyn HeatProbe>>);

/// Latest heat sample, refreshed on the AI clock.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct ExternalHeat {
    sample: Option<HeatSample>,
}

impl ExternalHeat {
    /// The most recent sample, if the source was active when last polled.
    #[must_use]
    pub const fn sample(&self) -> Option<HeatSample> {
        self.sample
    }

    /// Whether a screen point sits inside the active heat footprint.
    #[must_use]
    pub fn melts(&self, point: Vec2) -> bool {
        self.sample
            .is_some_and(|s| point.distance(s.centre) <= s.radius)
    }
}

/// Polls the injected probe into the [`ExternalHeat`] resource.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn refresh_heat_system(probe: Res<HeatProbeSource>, mut heat: ResMut<ExternalHeat>) {
    heat.sample = probe.0.as_ref().and_then(|p| p.sample());
}
