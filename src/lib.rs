pub mod arena;
pub mod collision;
pub mod components;
pub mod config;
pub mod game_logic;
pub mod geometry;
pub mod pathfinding;
pub mod plugins;
pub mod resources;

// Selective re-exports for external consumers

// Plugins - main.rs needs all plugins
pub use plugins::*;

// Game logic - the arena generator needs errors
pub use game_logic::errors::{ShootyError, ShootyResult};

// Core types
pub use arena::{ArenaDefinition, BarrierDefinition};
pub use geometry::Aabb;
