//! World to tile conversion and per-frame passability maps

use super::{Tile, TileMap};
use crate::geometry::Aabb;
use bevy::prelude::*;

/// The arena's tile layout. Tile `(0, 0)` has its min corner at `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct TileGrid {
    pub origin: Vec2,
    pub tile_size: Vec2,
    pub columns: u32,
    pub rows: u32,
}

impl Default for TileGrid {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            tile_size: Vec2::splat(32.0),
            columns: 40,
            rows: 22,
        }
    }
}

impl TileGrid {
    pub fn new(origin: Vec2, tile_size: Vec2, columns: u32, rows: u32) -> Self {
        Self {
            origin,
            tile_size,
            columns,
            rows,
        }
    }

    /// Tile holding a world position (floored)
    pub fn tile_for(&self, position: Vec2) -> IVec2 {
        ((position - self.origin) / self.tile_size).floor().as_ivec2()
    }

    /// Number of tiles a size covers on each axis, rounded up so a footprint
    /// never comes out smaller than the entity.
    pub fn tile_span(&self, size: Vec2) -> IVec2 {
        (size / self.tile_size).ceil().as_ivec2().max(IVec2::ONE)
    }

    /// World position of a tile's min corner
    pub fn position_for(&self, tile: IVec2) -> Vec2 {
        self.origin + tile.as_vec2() * self.tile_size
    }

    pub fn tile_box(&self, tile: IVec2) -> Aabb {
        Aabb::from_min_corner(self.position_for(tile), self.tile_size)
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.columns as f32, self.rows as f32) * self.tile_size
    }

    pub fn world_center(&self) -> Vec2 {
        self.origin + self.world_size() / 2.0
    }

    fn open_map(&self) -> TileMap {
        vec![vec![Tile::OPEN; self.columns as usize]; self.rows as usize]
    }

    /// Mark every tile whose interior a box covers as blocked.
    /// Tiles the box only touches along an edge stay open.
    pub fn block_box(&self, map: &mut TileMap, aabb: &Aabb) {
        let first = self.tile_for(aabb.min_corner()).max(IVec2::ZERO);
        let last = (((aabb.max_corner() - self.origin) / self.tile_size).ceil().as_ivec2()
            - IVec2::ONE)
            .min(IVec2::new(self.columns as i32 - 1, self.rows as i32 - 1));

        for row in first.y..=last.y {
            for col in first.x..=last.x {
                if let Some(tile) = map
                    .get_mut(row as usize)
                    .and_then(|cells| cells.get_mut(col as usize))
                {
                    *tile = Tile::BLOCKED;
                }
            }
        }
    }

    /// Passability map for this frame. Blockers listed in `exclude` leave
    /// their tiles open.
    pub fn build_map<I>(&self, blockers: I, exclude: &[Entity]) -> TileMap
    where
        I: IntoIterator<Item = (Entity, Aabb)>,
    {
        let mut map = self.open_map();

        for (entity, aabb) in blockers {
            if exclude.contains(&entity) {
                continue;
            }
            self.block_box(&mut map, &aabb);
        }

        let total_cells = (self.columns * self.rows) as usize;
        let blocked_count = map.iter().flatten().filter(|tile| !tile.passable).count();
        debug!(
            "Tile map: {blocked}/{total} cells blocked ({percentage:.1}%)",
            blocked = blocked_count,
            total = total_cells,
            percentage = (blocked_count as f32 / total_cells.max(1) as f32) * 100.0
        );

        map
    }
}
