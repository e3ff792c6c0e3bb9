use crate::components::*;
use crate::config::save_best_score;
use crate::game_logic::movement::{BlockResponse, DriveConfig, Mover, Obstacle, drive};
use crate::game_logic::steering::Steering;
use crate::resources::{GameConfig, GameSet, GameSettings, GameState, Score};
use bevy::prelude::*;

const HEALTH_BAR_HEIGHT: f32 = 4.0;
const HEALTH_BAR_GAP: f32 = 6.0;

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<BulletHit>()
            .add_event::<ContactHit>()
            .add_systems(
                Update,
                (tick_melee, drive_bodies).chain().in_set(GameSet::Drive),
            )
            .add_systems(
                Update,
                (apply_bullet_hits, apply_contact_hits, expire_bullets)
                    .chain()
                    .in_set(GameSet::Resolve),
            )
            .add_systems(Update, update_health_bars.in_set(GameSet::Render));
    }
}

/// A bullet ran into something this frame
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BulletHit {
    pub bullet: Entity,
    pub target: Entity,
    pub damage: Damage,
}

/// A body with a [`Melee`] ran into something while its cooldown was ready
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactHit {
    pub attacker: Entity,
    pub target: Entity,
}

/// Velocity of a bullet fired from `from` at `toward`, if the two differ.
pub fn bullet_velocity(from: Vec2, toward: Vec2, speed: f32) -> Option<Vec2> {
    let direction = (toward - from).try_normalize()?;
    Some(direction * speed)
}

pub fn spawn_bullet(
    commands: &mut Commands,
    owner: Entity,
    from: Vec2,
    toward: Vec2,
    settings: &GameSettings,
) -> Option<Entity> {
    let velocity = bullet_velocity(from, toward, settings.bullet_speed.get())?;
    let size = Vec2::splat(settings.bullet_size.get());

    let bullet = commands
        .spawn((
            Physics::new(from, size)
                .with_speed(settings.bullet_speed.get())
                .with_velocity(velocity),
            Brain::LinearProjectile,
            Steering::full(velocity),
            Bullet {
                owner,
                damage: Damage::new(settings.bullet_damage.get()),
                lifetime: settings.bullet_lifetime.get(),
            },
            Sprite {
                color: Color::srgb(1.0, 0.9, 0.2),
                custom_size: Some(size),
                ..default()
            },
            Transform::from_translation(from.extend(2.0)),
        ))
        .id();
    Some(bullet)
}

pub fn spawn_health_bar(commands: &mut Commands, owner: Entity, width: f32, color: [f32; 3]) {
    commands.spawn((
        HealthBar { owner, width },
        Sprite {
            color: Color::srgb(color[0], color[1], color[2]),
            custom_size: Some(Vec2::new(width, HEALTH_BAR_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 3.0),
    ));
}

/// Run the motion driver for every body that has a brain.
///
/// Every body is recorded up front. A mover's record is refreshed as soon as
/// it has moved, so movers later in the frame see where it ended up.
fn drive_bodies(
    mut bodies: Query<(
        Entity,
        &mut Physics,
        Option<&Brain>,
        Option<&Steering>,
        Option<&Bullet>,
        Option<&Melee>,
    )>,
    time: Res<Time>,
    game_config: Res<GameConfig>,
    mut hits: EventWriter<BulletHit>,
    mut contacts: EventWriter<ContactHit>,
) {
    let frame = time.delta();
    if frame.is_zero() {
        return;
    }

    let mut snapshot: Vec<Obstacle> = bodies
        .iter()
        .map(|(entity, physics, brain, ..)| Obstacle {
            entity,
            physics: Some(*physics),
            projectile: brain.is_some_and(Brain::is_projectile),
        })
        .collect();

    let walker = game_config.settings.drive_config();
    let projectile = DriveConfig {
        response: BlockResponse::Stop,
        ..walker
    };

    for (entity, mut physics, brain, steering, bullet, melee) in bodies.iter_mut() {
        let Some(brain) = brain else {
            continue;
        };
        let fraction_cap = steering.map_or(1.0, |steering| steering.fraction);
        let config = if brain.is_projectile() { &projectile } else { &walker };

        let mut mover = Mover::new(entity, &mut physics);
        if let Some(bullet) = bullet {
            mover = mover.ignoring(bullet.owner);
        }
        let report = drive(&mut mover, frame, fraction_cap, &snapshot, config);

        if let (Some(bullet), Some(target)) = (bullet, report.blocker) {
            hits.write(BulletHit {
                bullet: entity,
                target,
                damage: bullet.damage,
            });
        }
        let striking = melee.is_some_and(|melee| melee.cooldown.check());
        if let (true, Some(target)) = (striking, report.blocker) {
            contacts.write(ContactHit {
                attacker: entity,
                target,
            });
        }
        if report.separated {
            debug!("Separated {entity} from an overlapping body");
        }

        if let Some(record) = snapshot.iter_mut().find(|record| record.entity == entity) {
            record.physics = Some(*physics);
        }
    }
}

fn apply_bullet_hits(
    mut commands: Commands,
    mut hits: EventReader<BulletHit>,
    mut targets: Query<(&mut Health, Has<Enemy>)>,
    mut score: ResMut<Score>,
    game_config: Res<GameConfig>,
) {
    for hit in hits.read() {
        commands.entity(hit.bullet).despawn();

        let Ok((mut health, is_enemy)) = targets.get_mut(hit.target) else {
            continue;
        };

        match health.damage(hit.damage) {
            Vitality::Died => {
                info!("{} destroyed", hit.target);
                commands.entity(hit.target).despawn();
                if is_enemy {
                    score.points += game_config.settings.score_per_enemy;
                }
            }
            Vitality::Alive => debug!("{} hit, health {}", hit.target, *health),
            Vitality::AlreadyDead => {}
        }
    }
}

/// Contact only hurts the player. A killing blow ends the game.
fn apply_contact_hits(
    mut contacts: EventReader<ContactHit>,
    mut attackers: Query<&mut Melee>,
    mut players: Query<&mut Health, With<Player>>,
    mut game_config: ResMut<GameConfig>,
    score: Res<Score>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    for contact in contacts.read() {
        let Ok(mut health) = players.get_mut(contact.target) else {
            continue;
        };
        let Some(damage) = attackers
            .get_mut(contact.attacker)
            .ok()
            .and_then(|mut melee| melee.strike())
        else {
            continue;
        };

        match health.damage(damage) {
            Vitality::Died => {
                info!(
                    "Player down on wave {} with {} points",
                    score.wave, score.points
                );
                save_best_score(&mut game_config, score.points);
                next_state.set(GameState::GameOver);
            }
            Vitality::Alive => debug!("{} hit the player, health {}", contact.attacker, *health),
            Vitality::AlreadyDead => {}
        }
    }
}

fn tick_melee(mut attackers: Query<&mut Melee>, time: Res<Time>) {
    for mut melee in attackers.iter_mut() {
        melee.cooldown.tick(time.delta());
    }
}

fn expire_bullets(
    mut commands: Commands,
    mut bullets: Query<(Entity, &mut Bullet)>,
    time: Res<Time>,
) {
    for (entity, mut bullet) in bullets.iter_mut() {
        bullet.lifetime -= time.delta_secs();
        if bullet.lifetime <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}

fn update_health_bars(
    mut commands: Commands,
    mut bars: Query<(Entity, &HealthBar, &mut Transform, &mut Sprite)>,
    owners: Query<(&Physics, &Health)>,
) {
    for (entity, bar, mut transform, mut sprite) in bars.iter_mut() {
        let Ok((physics, health)) = owners.get(bar.owner) else {
            commands.entity(entity).despawn();
            continue;
        };

        let width = bar.width * health.fraction();
        // left aligned over the owner
        let offset = Vec2::new(
            (width - bar.width) / 2.0,
            physics.size.y / 2.0 + HEALTH_BAR_GAP,
        );
        let position = physics.position + offset;
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        sprite.custom_size = Some(Vec2::new(width, HEALTH_BAR_HEIGHT));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    const FRAME: Duration = Duration::from_millis(100);

    fn combat_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, CombatPlugin))
            .init_state::<GameState>()
            .init_resource::<GameConfig>()
            .init_resource::<Score>()
            .insert_resource(TimeUpdateStrategy::ManualDuration(FRAME))
            .configure_sets(
                Update,
                (GameSet::Drive, GameSet::Resolve, GameSet::Render).chain(),
            );
        // the first frame only starts the clock
        app.update();
        app
    }

    fn spawn_shot(app: &mut App, owner: Entity, from: Vec2) -> Entity {
        let velocity = Vec2::new(750.0, 0.0);
        app.world_mut()
            .spawn((
                Physics::new(from, Vec2::splat(4.0)).with_velocity(velocity),
                Brain::LinearProjectile,
                Steering::full(velocity),
                Bullet {
                    owner,
                    damage: Damage::new(5.0),
                    lifetime: 3.0,
                },
            ))
            .id()
    }

    fn spawn_target(app: &mut App, health: f32) -> Entity {
        app.world_mut()
            .spawn((
                Enemy,
                Physics::new(Vec2::new(50.0, 0.0), Vec2::splat(40.0)),
                Health::new(health),
            ))
            .id()
    }

    fn exists(app: &App, entity: Entity) -> bool {
        app.world().entities().contains(entity)
    }

    #[test]
    fn test_bullet_kills_enemy_and_scores() {
        let mut app = combat_app();
        let shooter = app.world_mut().spawn(Player::default()).id();
        let enemy = spawn_target(&mut app, 1.0);
        let bullet = spawn_shot(&mut app, shooter, Vec2::ZERO);

        app.update();

        assert!(!exists(&app, bullet));
        assert!(!exists(&app, enemy));
        let per_enemy = GameConfig::default().settings.score_per_enemy;
        assert_eq!(app.world().resource::<Score>().points, per_enemy);
    }

    #[test]
    fn test_bullet_damages_without_killing() {
        let mut app = combat_app();
        let shooter = app.world_mut().spawn(Player::default()).id();
        let enemy = spawn_target(&mut app, 25.0);
        let bullet = spawn_shot(&mut app, shooter, Vec2::ZERO);

        app.update();

        assert!(!exists(&app, bullet));
        let health = app.world().get::<Health>(enemy).unwrap();
        assert_eq!(health.current, 20.0);
        assert_eq!(app.world().resource::<Score>().points, 0);
    }

    #[test]
    fn test_second_hit_on_a_dead_enemy_does_not_score() {
        let mut app = combat_app();
        let shooter = app.world_mut().spawn(Player::default()).id();
        let enemy = spawn_target(&mut app, 1.0);
        let first = spawn_shot(&mut app, shooter, Vec2::ZERO);
        let second = spawn_shot(&mut app, shooter, Vec2::new(0.0, 10.0));

        app.update();

        assert!(!exists(&app, first));
        assert!(!exists(&app, second));
        assert!(!exists(&app, enemy));
        let per_enemy = GameConfig::default().settings.score_per_enemy;
        assert_eq!(app.world().resource::<Score>().points, per_enemy);
    }

    #[test]
    fn test_later_movers_see_earlier_moves() {
        let mut app = combat_app();
        let up = Vec2::new(0.0, 600.0);
        let right = Vec2::new(600.0, 0.0);
        // spawned first, so it is driven first
        let leaving = app
            .world_mut()
            .spawn((
                Physics::new(Vec2::ZERO, Vec2::splat(20.0)).with_velocity(up),
                Brain::PursuePlayer,
                Steering::full(up),
            ))
            .id();
        let arriving = app
            .world_mut()
            .spawn((
                Physics::new(Vec2::new(-60.0, 0.0), Vec2::splat(20.0)).with_velocity(right),
                Brain::PursuePlayer,
                Steering::full(right),
            ))
            .id();

        app.update();

        let leaving = app.world().get::<Physics>(leaving).unwrap();
        assert!((leaving.position.y - 60.0).abs() < 1e-3);
        let arriving = app.world().get::<Physics>(arriving).unwrap();
        assert!(arriving.position.x.abs() < 1e-3);
    }

    fn spawn_charger(app: &mut App) -> Entity {
        let velocity = Vec2::new(600.0, 0.0);
        app.world_mut()
            .spawn((
                Enemy,
                Physics::new(Vec2::new(-40.0, 0.0), Vec2::splat(20.0)).with_velocity(velocity),
                Brain::PursuePlayer,
                Steering::full(velocity),
                Melee::new(10.0, 2.0),
            ))
            .id()
    }

    #[test]
    fn test_contact_hurts_the_player() {
        let mut app = combat_app();
        let player = app
            .world_mut()
            .spawn((
                Player::default(),
                Physics::new(Vec2::ZERO, Vec2::splat(20.0)),
                Health::new(100.0),
            ))
            .id();
        let charger = spawn_charger(&mut app);

        app.update();

        assert_eq!(app.world().get::<Health>(player).unwrap().current, 90.0);
        assert!(!app.world().get::<Melee>(charger).unwrap().cooldown.check());
    }

    #[test]
    fn test_fatal_contact_ends_the_game() {
        let mut app = combat_app();
        app.world_mut().spawn((
            Player::default(),
            Physics::new(Vec2::ZERO, Vec2::splat(20.0)),
            Health::new(5.0),
        ));
        spawn_charger(&mut app);

        app.update();
        app.update();

        let state = app.world().resource::<State<GameState>>();
        assert_eq!(state.get(), &GameState::GameOver);
    }

    #[test]
    fn test_bullet_velocity() {
        let velocity = bullet_velocity(Vec2::ZERO, Vec2::new(0.0, 10.0), 750.0);
        assert_eq!(velocity, Some(Vec2::new(0.0, 750.0)));
        assert_eq!(bullet_velocity(Vec2::ONE, Vec2::ONE, 750.0), None);
    }
}
