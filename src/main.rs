use bevy::prelude::*;
use shooty::config::load_config;
use shooty::plugins::*;

fn main() {
    let game_config = load_config();
    let settings = &game_config.settings;

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Shooty Face".into(),
                resolution: (settings.window_width, settings.window_height).into(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(game_config.clone())
        .add_plugins((ScenePlugin, PlayerPlugin, EnemyPlugin, CombatPlugin))
        .run();
}
