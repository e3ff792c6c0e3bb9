use crate::game_logic::errors::{ShootyError, ShootyResult};
use crate::geometry::Aabb;
use crate::pathfinding::TileGrid;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

/// Layout of one arena: its tile grid, spawn points and barriers
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Resource)]
pub struct ArenaDefinition {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(range(min = 1, max = 512))]
    pub columns: u32,
    #[validate(range(min = 1, max = 512))]
    pub rows: u32,
    #[validate(range(min = 4.0, max = 256.0))]
    pub tile_size: f32,
    pub player_spawn: Vec2,
    #[validate(length(max = 256))]
    pub enemy_spawns: Vec<Vec2>,
    #[validate(length(max = 4096))]
    pub barriers: Vec<BarrierDefinition>,
}

/// A solid rectangle placed in the arena, in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierDefinition {
    pub center: Vec2,
    pub size: Vec2,
}

impl BarrierDefinition {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::fixed(self.center, self.size)
    }

    /// Walls `thickness` thick lining the inside of a room centred on the
    /// origin that reaches out to `half` on each axis.
    pub fn outer_walls(half: Vec2, thickness: f32) -> Vec<Self> {
        let (width, height) = (half.x * 2.0, half.y * 2.0);
        let inset = half - Vec2::splat(thickness / 2.0);
        vec![
            Self::new(Vec2::new(0.0, inset.y), Vec2::new(width, thickness)),
            Self::new(Vec2::new(0.0, -inset.y), Vec2::new(width, thickness)),
            Self::new(Vec2::new(-inset.x, 0.0), Vec2::new(thickness, height)),
            Self::new(Vec2::new(inset.x, 0.0), Vec2::new(thickness, height)),
        ]
    }
}

impl Default for ArenaDefinition {
    /// Walled room with four pillars, used when no arena file can be loaded.
    fn default() -> Self {
        let (columns, rows, tile_size) = (40, 22, 32.0);
        let half = Vec2::new(columns as f32, rows as f32) * tile_size / 2.0;
        let wall = tile_size;

        let mut barriers = BarrierDefinition::outer_walls(half, wall);
        let corners = [
            Vec2::new(-1.0, -1.0),
            Vec2::new(-1.0, 1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
        ];
        for corner in corners {
            barriers.push(BarrierDefinition::new(
                corner * Vec2::new(256.0, 128.0),
                Vec2::new(64.0, 96.0),
            ));
        }

        Self {
            name: "default".to_string(),
            columns,
            rows,
            tile_size,
            player_spawn: Vec2::ZERO,
            enemy_spawns: vec![
                Vec2::new(-544.0, 256.0),
                Vec2::new(544.0, 256.0),
                Vec2::new(-544.0, -256.0),
                Vec2::new(544.0, -256.0),
            ],
            barriers,
        }
    }
}

impl ArenaDefinition {
    /// Create a new arena definition with validation
    pub fn new(
        name: String,
        columns: u32,
        rows: u32,
        tile_size: f32,
        player_spawn: Vec2,
        enemy_spawns: Vec<Vec2>,
        barriers: Vec<BarrierDefinition>,
    ) -> ShootyResult<Self> {
        let arena = Self {
            name,
            columns,
            rows,
            tile_size,
            player_spawn,
            enemy_spawns,
            barriers,
        };
        arena.check()?;
        Ok(arena)
    }

    /// Tile grid centred on the world origin
    pub fn tile_grid(&self) -> TileGrid {
        let tile_size = Vec2::splat(self.tile_size);
        let world_size = Vec2::new(self.columns as f32, self.rows as f32) * tile_size;
        TileGrid::new(-world_size / 2.0, tile_size, self.columns, self.rows)
    }

    pub fn bounds(&self) -> Aabb {
        let grid = self.tile_grid();
        Aabb::fixed(grid.world_center(), grid.world_size())
    }

    /// Field validation followed by the geometric checks the derive can't express.
    pub fn check(&self) -> ShootyResult<()> {
        self.validate().map_err(|validation_errors| {
            let error_details = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                    format!("{field}: {}", error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            ShootyError::InvalidArenaData {
                reason: format!("Arena validation failed: {error_details}"),
            }
        })?;

        let bounds = self.bounds();
        if !bounds.contains_point(self.player_spawn) {
            return Err(ShootyError::InvalidArenaData {
                reason: format!("player spawn {} lies outside the arena", self.player_spawn),
            });
        }
        if let Some(spawn) = self
            .enemy_spawns
            .iter()
            .find(|spawn| !bounds.contains_point(**spawn))
        {
            return Err(ShootyError::InvalidArenaData {
                reason: format!("enemy spawn {spawn} lies outside the arena"),
            });
        }
        if let Some(barrier) = self
            .barriers
            .iter()
            .find(|barrier| !(barrier.size.x > 0.0 && barrier.size.y > 0.0))
        {
            return Err(ShootyError::InvalidArenaData {
                reason: format!("barrier at {} has a non-positive size", barrier.center),
            });
        }

        Ok(())
    }

    /// Get the arenas directory path
    pub fn get_arenas_dir() -> ShootyResult<PathBuf> {
        Ok(std::env::current_dir()?.join("arenas"))
    }

    pub fn decode(data: &[u8]) -> ShootyResult<Self> {
        let (arena, _): (ArenaDefinition, usize) =
            bincode::serde::decode_from_slice(data, bincode::config::standard()).map_err(|e| {
                ShootyError::CorruptedArenaFile {
                    reason: format!("Failed to deserialize arena data: {e}"),
                }
            })?;

        arena.check()?;
        Ok(arena)
    }

    pub fn encode(&self) -> ShootyResult<Vec<u8>> {
        self.check()?;

        bincode::serde::encode_to_vec(self, bincode::config::standard()).map_err(|e| {
            ShootyError::InvalidArenaData {
                reason: format!("Failed to serialize arena: {e}"),
            }
        })
    }

    /// Load an arena from the arenas directory
    pub fn load_from_file<P: AsRef<Path>>(filename: P) -> ShootyResult<Self> {
        let file_path = Self::get_arenas_dir()?.join(filename);
        Self::load_from_path(&file_path)
    }

    pub fn load_from_path(file_path: &Path) -> ShootyResult<Self> {
        if !file_path.exists() {
            return Err(ShootyError::ArenaFileNotFound {
                path: file_path.to_path_buf(),
            });
        }

        Self::decode(&std::fs::read(file_path)?)
    }

    /// Save the arena to the arenas directory
    pub fn save_to_file<P: AsRef<Path>>(&self, filename: P) -> ShootyResult<PathBuf> {
        let file_path = Self::get_arenas_dir()?.join(filename);
        self.save_to_path(&file_path)?;
        Ok(file_path)
    }

    pub fn save_to_path(&self, file_path: &Path) -> ShootyResult<()> {
        let data = self.encode()?;

        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(file_path, data)?;

        Ok(())
    }
}
