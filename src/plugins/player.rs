use crate::arena::ArenaDefinition;
use crate::components::*;
use crate::game_logic::steering::{MoveDirections, Steering, steer_brain};
use crate::pathfinding::TileGrid;
use crate::plugins::combat::{spawn_bullet, spawn_health_bar};
use crate::plugins::scene::load_arena;
use crate::resources::{GameConfig, GameSet};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_player.after(load_arena))
            .add_systems(
                Update,
                (read_movement_keys, fire_gun).in_set(GameSet::Input),
            )
            .add_systems(Update, steer_player.in_set(GameSet::Steer));
    }
}

fn spawn_player(mut commands: Commands, arena: Res<ArenaDefinition>, game_config: Res<GameConfig>) {
    let settings = &game_config.settings;
    let size = Vec2::splat(settings.player_size.get());

    let player = commands
        .spawn((
            Player::default(),
            Physics::new(arena.player_spawn, size).with_speed(settings.player_movement_speed.get()),
            Health::new(settings.player_max_health.get()),
            Brain::PlayerControlled,
            Steering::HALT,
            Gun::new(settings.fire_rate.get()),
            Sprite {
                color: Color::srgb(0.2, 0.5, 0.9),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(arena.player_spawn.extend(1.0)),
        ))
        .id();
    spawn_health_bar(&mut commands, player, size.x, settings.health_bar_color);

    info!("Player spawned at {}", arena.player_spawn);
}

fn held_directions(keyboard: &ButtonInput<KeyCode>) -> MoveDirections {
    MoveDirections {
        up: keyboard.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]),
        left: keyboard.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]),
        down: keyboard.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]),
        right: keyboard.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]),
    }
}

fn read_movement_keys(keyboard: Res<ButtonInput<KeyCode>>, mut players: Query<&mut Player>) {
    let directions = held_directions(&keyboard);
    for mut player in players.iter_mut() {
        player.moving = directions;
    }
}

fn cursor_world_position(
    windows: &Query<&Window, With<PrimaryWindow>>,
    cameras: &Query<(&Camera, &GlobalTransform), With<Camera2d>>,
) -> Option<Vec2> {
    let window = windows.single().ok()?;
    let cursor = window.cursor_position()?;
    let (camera, camera_transform) = cameras.single().ok()?;
    camera.viewport_to_world_2d(camera_transform, cursor).ok()
}

/// Holding the left button fires at the gun's rate, letting go re-arms it.
fn fire_gun(
    mut commands: Commands,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut players: Query<(Entity, &Physics, &mut Gun), With<Player>>,
    game_config: Res<GameConfig>,
    time: Res<Time>,
) {
    let Ok((owner, physics, mut gun)) = players.single_mut() else {
        return;
    };
    gun.cooldown.tick(time.delta());

    if mouse_button.just_released(MouseButton::Left) {
        gun.release_trigger();
    }
    if !mouse_button.pressed(MouseButton::Left) {
        return;
    }

    let Some(target) = cursor_world_position(&windows, &cameras) else {
        return;
    };
    if !gun.pull_trigger() {
        return;
    }

    let settings = &game_config.settings;
    if spawn_bullet(&mut commands, owner, physics.position, target, settings).is_none() {
        debug!("Shot aimed at the shooter's own center, skipped");
    }
}

fn steer_player(
    mut players: Query<(&Player, &mut Physics, &mut Brain, &mut Steering)>,
    grid: Res<TileGrid>,
    time: Res<Time>,
) {
    let frame = time.delta();
    for (player, mut physics, mut brain, mut steering) in players.iter_mut() {
        let held = Some(&player.moving);
        *steering = steer_brain(&mut brain, &physics, held, None, &grid, frame);
        physics.velocity = steering.velocity;
    }
}
