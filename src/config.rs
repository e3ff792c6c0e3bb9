pub mod range_types;

use crate::game_logic::errors::{ShootyError, ShootyResult};
use crate::resources::GameConfig;
use bevy::prelude::*;
use std::fs;
use std::path::PathBuf;

pub fn get_config_path() -> ShootyResult<PathBuf> {
    let mut path = dirs::config_dir().ok_or(ShootyError::ConfigDirNotFound)?;
    path.push("shooty");
    fs::create_dir_all(&path)?;
    path.push("config.toml");
    Ok(path)
}

pub fn parse_config(contents: &str) -> ShootyResult<GameConfig> {
    Ok(toml::from_str::<GameConfig>(contents)?)
}

/// Read the user config, falling back to defaults when it is missing or broken.
pub fn load_config() -> GameConfig {
    let loaded = get_config_path().and_then(|path| {
        if !path.exists() {
            return Err(ShootyError::ConfigFileNotFound { path });
        }
        parse_config(&fs::read_to_string(&path)?)
    });

    match loaded {
        Ok(config) => {
            info!("Loaded config for {}", config.username);
            config
        }
        Err(ShootyError::ConfigFileNotFound { path }) => {
            info!("No config at {}, using defaults", path.display());
            GameConfig::default()
        }
        Err(e) => {
            warn!("Failed to load config, using defaults: {e}");
            GameConfig::default()
        }
    }
}

pub fn save_config(config: &GameConfig) -> ShootyResult<()> {
    let contents = toml::to_string_pretty(config)?;
    fs::write(get_config_path()?, contents)?;
    Ok(())
}

/// Keep `points` as the best score and write it out if it is a new record.
pub fn save_best_score(config: &mut GameConfig, points: u32) {
    if !config.record_score(points) {
        return;
    }
    match save_config(config) {
        Ok(()) => info!("New best score {points} saved"),
        Err(e) => warn!("Failed to save best score: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::range_types::SubMoves;

    #[test]
    fn test_config_round_trips_through_toml() {
        let mut config = GameConfig::default();
        config.username = "ace".to_string();
        config.score = 40;

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.username, "ace");
        assert_eq!(parsed.score, 40);
        assert_eq!(parsed.settings.max_sub_moves, config.settings.max_sub_moves);
    }

    #[test]
    fn test_broken_config_is_an_error() {
        let err = parse_config("username = [").unwrap_err();
        assert!(matches!(err, ShootyError::DeserializationFailed(_)));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let text = toml::to_string_pretty(&GameConfig::default())
            .unwrap()
            .replace(
                "player_movement_speed = 160.0",
                "player_movement_speed = 9000.0",
            )
            .replace("max_sub_moves = 2", "max_sub_moves = 4294967295");

        let parsed = parse_config(&text).unwrap();
        assert_eq!(parsed.settings.player_movement_speed.get(), 1000.0);
        assert_eq!(parsed.settings.max_sub_moves.get(), SubMoves::MAX);
    }
}
