use crate::game_logic::rate_limit::RateLimit;
use crate::game_logic::steering::{MoveDirections, PathFollower};
use crate::geometry::Aabb;
use bevy::prelude::*;
use derive_more::{Display, From};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Display, From)]
pub struct Speed(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Display, From)]
pub struct Damage(pub f32);

impl Speed {
    pub fn new(value: f32) -> Self { Self(value.max(0.0)) }
    pub const ZERO: Speed = Speed(0.0);
}

impl Damage {
    pub fn new(value: f32) -> Self { Self(value.max(0.0)) }
    pub const ZERO: Damage = Damage(0.0);
}

/// Position, size and motion of anything that takes up space.
///
/// The collision box is derived on demand through [`Physics::aabb`] and is
/// never stored.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Physics {
    /// Center of the body in world units
    pub position: Vec2,
    /// World units per second
    pub velocity: Vec2,
    pub size: Vec2,
    pub move_speed: Speed,
    /// Non-solid bodies are ignored by every collision test
    pub solid: bool,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: Vec2::ONE,
            move_speed: Speed::ZERO,
            solid: true,
        }
    }
}

impl Physics {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            ..default()
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.move_speed = Speed::new(speed);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn passable(mut self) -> Self {
        self.solid = false;
        self
    }

    /// Box for the next `elapsed` seconds of motion at the current velocity.
    pub fn aabb(&self, elapsed: f32) -> Aabb {
        Aabb::new(self.position, self.size, self.velocity * elapsed)
    }

    pub fn min_corner(&self) -> Vec2 {
        self.position - self.size / 2.0
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Move along the current velocity for `elapsed` seconds.
    pub fn advance(&mut self, elapsed: f32) {
        self.position += self.velocity * elapsed;
    }
}

/// What a health change did to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Alive,
    Died,
    AlreadyDead,
}

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub base: f32,
    pub current: f32,
}

impl Health {
    pub fn new(base: f32) -> Self {
        let base = base.max(0.0);
        Self {
            base,
            current: base,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.base > 0.0 { self.current / self.base } else { 0.0 }
    }

    pub fn set(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.base);
    }

    /// Reports `Died` only on the hit that takes health to zero.
    pub fn damage(&mut self, damage: Damage) -> Vitality {
        if self.is_dead() {
            return Vitality::AlreadyDead;
        }

        self.set(self.current - damage.0);
        if self.is_dead() { Vitality::Died } else { Vitality::Alive }
    }

    pub fn heal(&mut self, amount: f32) {
        self.set(self.current + amount.max(0.0));
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}/{:.0}", self.current, self.base)
    }
}

/// How an entity picks its velocity every frame
#[derive(Component, Debug, Clone)]
pub enum Brain {
    PlayerControlled,
    PursuePlayer,
    PursueViaPath(PathFollower),
    LinearProjectile,
}

impl Brain {
    pub fn is_projectile(&self) -> bool {
        matches!(self, Brain::LinearProjectile)
    }
}

#[derive(Component, Debug, Default)]
pub struct Player {
    pub moving: MoveDirections,
}

#[derive(Component, Debug, Default)]
pub struct Enemy;

#[derive(Component, Debug, Default)]
pub struct Barrier;

#[derive(Component, Debug)]
pub struct Bullet {
    pub owner: Entity,
    pub damage: Damage,
    /// Seconds left before the bullet expires on its own
    pub lifetime: f32,
}

#[derive(Component, Debug)]
pub struct Gun {
    pub cooldown: RateLimit,
}

impl Gun {
    pub fn new(fire_rate: f32) -> Self {
        Self {
            cooldown: RateLimit::ready(fire_rate),
        }
    }

    /// Fires if the cooldown allows it.
    pub fn pull_trigger(&mut self) -> bool {
        if !self.cooldown.check() {
            return false;
        }
        self.cooldown.renew();
        true
    }

    /// Letting go of the trigger re-arms the gun straight away.
    pub fn release_trigger(&mut self) {
        self.cooldown.prime();
    }
}

/// Damage dealt by running into the player, at a limited rate
#[derive(Component, Debug)]
pub struct Melee {
    pub damage: Damage,
    pub cooldown: RateLimit,
}

impl Melee {
    pub fn new(damage: f32, rate: f32) -> Self {
        Self {
            damage: Damage::new(damage),
            cooldown: RateLimit::ready(rate),
        }
    }

    /// Spends the cooldown if it is ready.
    pub fn strike(&mut self) -> Option<Damage> {
        if !self.cooldown.check() {
            return None;
        }
        self.cooldown.renew();
        Some(self.damage)
    }
}

/// Tracks the health bar sprite that belongs to an entity
#[derive(Component, Debug)]
pub struct HealthBar {
    pub owner: Entity,
    pub width: f32,
}
