//! Draw-state composition and depth ordering.
//!
//! Each render tick the compositor projects every actor into screen space,
//! picks its sprite-sheet cell, and re-sorts the fleet by depth so nearer
//! actors layer on top. The resulting [`DrawState`](crate::components::DrawState)
//! components are the only rendering contract the core exposes.

use bevy::prelude::*;
use hashbrown::HashMap;
use ordered_float::OrderedFloat;

use crate::atlas::{banking_roll_deg, base_roll_deg, cell_for_orientation};
use crate::components::{DrawState, Orientation, Position, SpriteHandle};
use crate::config::SimConfig;
use crate::projection::project;
use crate::viewport::Viewport;

/// Surface description for one registered sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetSpec {
    /// Edge length of one sheet tile in pixels.
    pub tile_px: f32,
}

/// Registry of sprite surfaces keyed by handle.
///
/// Handles are opaque to the core; the registry only remembers enough about
/// each surface (its tile size) to centre the projection.
#[derive(Resource, Debug, Default)]
pub struct SpriteLibrary {
    sheets: HashMap<u64, SheetSpec>,
}

impl SpriteLibrary {
    /// Registers (or replaces) the surface for a handle.
    pub fn register(&mut self, handle: SpriteHandle, spec: SheetSpec) {
        self.sheets.insert(handle.0, spec);
    }

    /// Tile size for a handle, falling back to `default_px` for surfaces the
    /// host never described.
    #[must_use]
    pub fn tile_px(&self, handle: SpriteHandle, default_px: f32) -> f32 {
        self.sheets.get(&handle.0).map_or(default_px, |s| s.tile_px)
    }

    /// Number of registered surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether no surface has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Projects positions and orientations into per-actor draw state.
#[expect(
    clippy::needless_pass_by_value,
    reason = "Bevy systems require parameters by value, not by reference."
)]
pub fn compose_draw_system(
    config: Res<SimConfig>,
    viewport: Res<Viewport>,
    library: Res<SpriteLibrary>,
    mut actors: Query<(&Position, &Orientation, &SpriteHandle, &mut DrawState)>,
) {
    if viewport.half_extents().is_none() {
        return;
    }
    for (position, orientation, handle, mut draw) in &mut actors {
        let tile_px = library.tile_px(*handle, config.tile_px);
        let (screen, scale) = project(position.0, viewport.size(), config.focal_length, tile_px);
        let cell = cell_for_orientation(orientation.yaw, orientation.pitch);
        draw.screen = screen;
        draw.scale = scale;
        draw.cell = cell;
        draw.roll_deg =
            base_roll_deg(cell) + banking_roll_deg(orientation.bank, config.banking_gain_deg);
    }
}

/// Re-sorts the fleet by depth and assigns stacking order.
///
/// Farthest actor gets layer `0`; nearer actors get larger indices and draw
/// on top. Depths change continuously, so this runs every tick.
pub fn depth_order_system(mut actors: Query<(Entity, &Position, &mut DrawState)>) {
    let mut depths: Vec<(Entity, OrderedFloat<f32>)> = actors
        .iter()
        .map(|(entity, position, _)| (entity, OrderedFloat(position.0.z)))
        .collect();
    depths.sort_by_key(|&(_, z)| z);

    let ranks: HashMap<Entity, usize> = depths
        .into_iter()
        .enumerate()
        .map(|(rank, (entity, _))| (entity, rank))
        .collect();

    for (entity, _, mut draw) in &mut actors {
        if let Some(&rank) = ranks.get(&entity) {
            draw.layer = rank;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_falls_back_to_default_tile() {
        let mut library = SpriteLibrary::default();
        library.register(SpriteHandle(1), SheetSpec { tile_px: 512.0 });
        assert_eq!(library.tile_px(SpriteHandle(1), 840.0), 512.0);
        assert_eq!(library.tile_px(SpriteHandle(9), 840.0), 840.0);
        assert_eq!(library.len(), 1);
        assert!(!library.is_empty());
    }
}
