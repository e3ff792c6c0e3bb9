use crate::config::range_types::*;
use crate::game_logic::movement::{BlockResponse, DriveConfig};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
pub struct GameConfig {
    pub username: String,
    /// Best score so far
    pub score: u32,
    pub settings: GameSettings,
}

impl GameConfig {
    /// Keeps `points` if it beats the best score. Returns whether it did.
    pub fn record_score(&mut self, points: u32) -> bool {
        if points <= self.score {
            return false;
        }
        self.score = points;
        true
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GameSettings {
    // Player settings
    pub player_movement_speed: MovementSpeed,
    pub player_max_health: HealthValue,
    pub player_size: BodySize,

    // Gun settings
    pub fire_rate: FireRate,
    pub bullet_speed: BulletSpeed,
    pub bullet_damage: DamageValue,
    pub bullet_lifetime: Lifetime,
    pub bullet_size: BodySize,

    // Enemy settings
    pub enemy_movement_speed: MovementSpeed,
    pub enemy_max_health: HealthValue,
    pub enemy_size: BodySize,
    pub enemy_path_refresh_rate: RefreshRate,
    /// Enemies only plan routes to targets this many tiles away or closer
    pub max_plan_span_tiles: u32,
    pub score_per_enemy: u32,
    /// Damage an enemy deals by running into the player
    pub contact_damage: DamageValue,
    /// Contact hits per second from a single enemy
    pub contact_rate: FireRate,
    /// Health the player gets back for clearing a wave
    pub wave_heal: HealthValue,

    // Motion driver settings
    pub max_sub_moves: SubMoves,
    pub unstick_allowance: UnstickAllowance,

    // Window settings
    pub window_width: f32,
    pub window_height: f32,
    pub health_bar_color: [f32; 3],

    // Arena settings
    pub arena_file_path: String, // Relative to the arenas directory
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_movement_speed: MovementSpeed::new(160.0),
            player_max_health: HealthValue::new(100.0),
            player_size: BodySize::new(20.0),

            fire_rate: FireRate::new(5.0),
            bullet_speed: BulletSpeed::new(750.0),
            bullet_damage: DamageValue::new(5.0),
            bullet_lifetime: Lifetime::new(3.0),
            bullet_size: BodySize::new(4.0),

            enemy_movement_speed: MovementSpeed::new(96.0),
            enemy_max_health: HealthValue::new(25.0),
            enemy_size: BodySize::new(40.0),
            enemy_path_refresh_rate: RefreshRate::new(5.0),
            max_plan_span_tiles: 20,
            score_per_enemy: 10,
            contact_damage: DamageValue::new(10.0),
            contact_rate: FireRate::new(2.0),
            wave_heal: HealthValue::new(25.0),

            max_sub_moves: SubMoves::new(2),
            unstick_allowance: UnstickAllowance::new(1),

            window_width: 1280.0,
            window_height: 720.0,
            health_bar_color: [0.8, 0.2, 0.2],

            arena_file_path: "default_arena.bin".to_string(),
        }
    }
}

impl GameSettings {
    /// Driver settings for everything that walks. Bullets stop instead.
    pub fn drive_config(&self) -> DriveConfig {
        DriveConfig {
            max_sub_moves: self.max_sub_moves.get(),
            unstick_allowance: self.unstick_allowance.get(),
            response: BlockResponse::Slide,
        }
    }
}

/// Enemies killed in this session, and which wave is on the field
#[derive(Resource, Debug, Default)]
pub struct Score {
    pub points: u32,
    pub wave: u32,
}

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
    /// The player died; the field stays frozen
    GameOver,
}

/// Frame phases, run in declaration order
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameSet {
    Input,
    Steer,
    Drive,
    Resolve,
    Render,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_config_follows_settings() {
        let settings = GameSettings {
            max_sub_moves: SubMoves::new(4),
            unstick_allowance: UnstickAllowance::new(0),
            ..GameSettings::default()
        };

        let config = settings.drive_config();
        assert_eq!(config.max_sub_moves, 4);
        assert_eq!(config.unstick_allowance, 0);
        assert_eq!(config.response, BlockResponse::Slide);
    }

    #[test]
    fn test_record_score_keeps_the_best() {
        let mut config = GameConfig {
            score: 30,
            ..GameConfig::default()
        };

        assert!(!config.record_score(20));
        assert!(!config.record_score(30));
        assert_eq!(config.score, 30);
        assert!(config.record_score(45));
        assert_eq!(config.score, 45);
    }

    #[test]
    fn test_missing_settings_fall_back_to_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            username = "ace"
            score = 3

            [settings]
            max_sub_moves = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.max_sub_moves.get(), 5);
        assert_eq!(config.settings.max_plan_span_tiles, 20);
        assert_eq!(config.settings.enemy_movement_speed.get(), 96.0);
    }
}
