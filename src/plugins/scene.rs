use crate::arena::ArenaDefinition;
use crate::components::*;
use crate::game_logic::errors::ShootyResult;
use crate::game_logic::steering::PlanningTurn;
use crate::resources::{GameConfig, GameSet, GameState};
use bevy::prelude::*;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<PlanningTurn>()
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Steer,
                    GameSet::Drive,
                    GameSet::Resolve,
                    GameSet::Render,
                )
                    .chain(),
            )
            .configure_sets(
                Update,
                (
                    GameSet::Input,
                    GameSet::Steer,
                    GameSet::Drive,
                    GameSet::Resolve,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(Startup, (spawn_camera, load_arena))
            .add_systems(Startup, spawn_barriers.after(load_arena))
            .add_systems(Update, toggle_pause)
            .add_systems(Update, sync_transforms.in_set(GameSet::Render));
    }
}

fn load_arena_from_config(game_config: &GameConfig) -> ShootyResult<ArenaDefinition> {
    ArenaDefinition::load_from_file(&game_config.settings.arena_file_path)
}

pub fn load_arena(mut commands: Commands, game_config: Res<GameConfig>) {
    let arena = match load_arena_from_config(&game_config) {
        Ok(arena) => {
            info!("Loaded arena: {}", arena.name);
            arena
        }
        Err(err) => {
            warn!("Failed to load arena, using the built-in one: {err}");
            ArenaDefinition::default()
        }
    };

    let grid = arena.tile_grid();
    info!(
        "Tile grid {columns}x{rows} of {size} units, origin {origin}",
        columns = grid.columns,
        rows = grid.rows,
        size = arena.tile_size,
        origin = grid.origin
    );

    commands.insert_resource(grid);
    commands.insert_resource(arena);
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("MainCamera"), Camera2d));
}

fn spawn_barriers(mut commands: Commands, arena: Res<ArenaDefinition>) {
    for barrier in &arena.barriers {
        commands.spawn((
            Barrier,
            Physics::new(barrier.center, barrier.size),
            Sprite {
                color: Color::srgb(0.35, 0.35, 0.4),
                custom_size: Some(barrier.size),
                ..default()
            },
            Transform::from_translation(barrier.center.extend(0.0)),
        ));
    }
    debug!("Spawned {} barriers", arena.barriers.len());
}

fn toggle_pause(
    keyboard: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keyboard.just_pressed(KeyCode::Escape) {
        return;
    }

    let next = match state.get() {
        GameState::Playing => GameState::Paused,
        GameState::Paused => GameState::Playing,
        GameState::GameOver => return,
    };
    info!("Game state: {next:?}");
    next_state.set(next);
}

/// Sprites follow their physics bodies once driving is done for the frame.
fn sync_transforms(mut bodies: Query<(&Physics, &mut Transform), Changed<Physics>>) {
    for (physics, mut transform) in bodies.iter_mut() {
        transform.translation.x = physics.position.x;
        transform.translation.y = physics.position.y;
    }
}
