use crate::arena::ArenaDefinition;
use crate::components::*;
use crate::config::save_best_score;
use crate::game_logic::steering::{PathFollower, PlanningTurn, Steering, plan_route, steer_brain};
use crate::pathfinding::TileGrid;
use crate::plugins::combat::spawn_health_bar;
use crate::plugins::scene::load_arena;
use crate::resources::{GameConfig, GameSet, GameSettings, Score};
use bevy::prelude::*;

pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Score>()
            .add_systems(Startup, spawn_first_wave.after(load_arena))
            .add_systems(
                Update,
                (tick_path_refresh, plan_enemy_paths, steer_enemies)
                    .chain()
                    .in_set(GameSet::Steer),
            )
            .add_systems(Update, next_wave.in_set(GameSet::Resolve));
    }
}

fn spawn_enemy(commands: &mut Commands, position: Vec2, settings: &GameSettings) {
    let size = Vec2::splat(settings.enemy_size.get());

    let enemy = commands
        .spawn((
            Enemy,
            Physics::new(position, size).with_speed(settings.enemy_movement_speed.get()),
            Health::new(settings.enemy_max_health.get()),
            Brain::PursueViaPath(PathFollower::new(settings.enemy_path_refresh_rate.get())),
            Steering::HALT,
            Melee::new(settings.contact_damage.get(), settings.contact_rate.get()),
            Sprite {
                color: Color::srgb(0.8, 0.25, 0.2),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(position.extend(1.0)),
        ))
        .id();
    spawn_health_bar(commands, enemy, size.x, settings.health_bar_color);
}

fn spawn_wave(commands: &mut Commands, arena: &ArenaDefinition, settings: &GameSettings) {
    for spawn in &arena.enemy_spawns {
        spawn_enemy(commands, *spawn, settings);
    }
}

fn spawn_first_wave(
    mut commands: Commands,
    arena: Res<ArenaDefinition>,
    game_config: Res<GameConfig>,
    mut score: ResMut<Score>,
) {
    score.wave = 1;
    spawn_wave(&mut commands, &arena, &game_config.settings);
    info!("Wave 1: {} enemies", arena.enemy_spawns.len());
}

/// Once the field is clear, record the best score, patch the player up and
/// send the next wave.
fn next_wave(
    mut commands: Commands,
    enemies: Query<(), With<Enemy>>,
    mut players: Query<&mut Health, With<Player>>,
    arena: Res<ArenaDefinition>,
    mut game_config: ResMut<GameConfig>,
    mut score: ResMut<Score>,
) {
    if !enemies.is_empty() || arena.enemy_spawns.is_empty() {
        return;
    }

    save_best_score(&mut game_config, score.points);
    for mut health in players.iter_mut() {
        health.heal(game_config.settings.wave_heal.get());
        debug!("Player healed to {}", *health);
    }

    score.wave += 1;
    spawn_wave(&mut commands, &arena, &game_config.settings);
    info!("Wave {}: {} enemies", score.wave, arena.enemy_spawns.len());
}

fn tick_path_refresh(mut brains: Query<&mut Brain, With<Enemy>>, time: Res<Time>) {
    for mut brain in brains.iter_mut() {
        if let Brain::PursueViaPath(follower) = brain.as_mut() {
            follower.refresh.tick(time.delta());
        }
    }
}

/// Let one path follower per frame search for a route to the player.
fn plan_enemy_paths(
    mut planners: Query<(Entity, &Physics, &mut Brain), With<Enemy>>,
    blockers: Query<(Entity, &Physics), Without<Bullet>>,
    players: Query<(Entity, &Physics), With<Player>>,
    grid: Res<TileGrid>,
    game_config: Res<GameConfig>,
    mut turn: ResMut<PlanningTurn>,
) {
    let Ok((player, target)) = players.single() else {
        return;
    };
    let Some(turn_index) = turn.advance(planners.iter().count()) else {
        return;
    };
    let Some((entity, mover, mut brain)) = planners.iter_mut().nth(turn_index) else {
        return;
    };
    let Brain::PursueViaPath(follower) = brain.as_mut() else {
        return;
    };
    if !follower.refresh.check() {
        return;
    }
    follower.refresh.renew();

    let map = grid.build_map(
        blockers
            .iter()
            .filter(|(_, physics)| physics.solid)
            .map(|(blocker, physics)| (blocker, physics.aabb(0.0))),
        &[entity, player],
    );
    let max_span = game_config.settings.max_plan_span_tiles as i32;

    match plan_route(mover, target, &grid, &map, max_span) {
        Some(result) => {
            debug!(
                "{entity} planned {} tiles toward the player (found: {})",
                result.path.len(),
                result.has_path
            );
            follower.adopt(result);
        }
        None => {
            debug!("{entity} is too far from the player to plan, dropping its path");
            follower.clear();
        }
    }
}

fn steer_enemies(
    mut enemies: Query<(&mut Physics, &mut Brain, &mut Steering), With<Enemy>>,
    players: Query<&Physics, (With<Player>, Without<Enemy>)>,
    grid: Res<TileGrid>,
    time: Res<Time>,
) {
    let target = players.single().ok();
    for (mut physics, mut brain, mut steering) in enemies.iter_mut() {
        *steering = steer_brain(&mut brain, &physics, None, target, &grid, time.delta());
        physics.velocity = steering.velocity;
    }
}
