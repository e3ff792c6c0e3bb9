use crate::collision::{Body, broad_test, get_penetration, narrow_test, sanity_check};
use crate::components::Physics;
use bevy::prelude::*;
use std::time::Duration;

/// Another body as it stood when the mover started its frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub entity: Entity,
    pub physics: Option<Physics>,
    /// Projectiles never block anything; they do their own hit detection
    pub projectile: bool,
}

impl Obstacle {
    pub fn new(entity: Entity, physics: Physics) -> Self {
        Self {
            entity,
            physics: Some(physics),
            projectile: false,
        }
    }

    pub fn projectile(mut self) -> Self {
        self.projectile = true;
        self
    }

    fn body(&self) -> Body<'_> {
        Body::new(self.entity, self.physics.as_ref())
    }
}

/// What a mover does once something is in its way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockResponse {
    /// Drop the velocity component that points into the obstacle and keep
    /// going with the rest of the frame
    #[default]
    Slide,
    /// Stop at the point of contact
    Stop,
}

/// Pure driver configuration that can be tested without Bevy runtime
#[derive(Debug, Clone, Copy)]
pub struct DriveConfig {
    /// Sub-moves allowed in one frame
    pub max_sub_moves: u32,
    /// Extra sub-moves granted when a sub-move makes no progress at all
    pub unstick_allowance: u32,
    pub response: BlockResponse,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_sub_moves: 2,
            unstick_allowance: 1,
            response: BlockResponse::Slide,
        }
    }
}

/// The entity being moved and whatever it passes straight through
#[derive(Debug)]
pub struct Mover<'a> {
    pub entity: Entity,
    pub physics: &'a mut Physics,
    /// Entity the mover never collides with, such as a bullet's shooter
    pub ignore: Option<Entity>,
}

impl<'a> Mover<'a> {
    pub fn new(entity: Entity, physics: &'a mut Physics) -> Self {
        Self {
            entity,
            physics,
            ignore: None,
        }
    }

    pub fn ignoring(mut self, entity: Entity) -> Self {
        self.ignore = Some(entity);
        self
    }
}

/// Result of a single sub-move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutcome {
    pub used: Duration,
    pub fraction: f32,
    pub blocker: Option<Obstacle>,
    pub separated: bool,
}

/// Everything that happened to a mover over one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriveReport {
    pub used: Duration,
    /// Last obstacle that cut a sub-move short
    pub blocker: Option<Entity>,
    pub sub_moves: u32,
    /// Whether the mover was pushed out of an overlap
    pub separated: bool,
}

fn portion(duration: Duration, fraction: f32) -> Duration {
    if fraction <= 0.0 {
        Duration::ZERO
    } else if fraction >= 1.0 {
        duration
    } else {
        duration.mul_f32(fraction)
    }
}

/// One sub-move: sweep the mover across `budget`, stop at the first contact.
///
/// A mover that already overlaps something is pushed out of it before the
/// move is applied.
pub fn advance(
    mover: &mut Mover,
    budget: Duration,
    fraction_cap: f32,
    obstacles: &[Obstacle],
) -> StepOutcome {
    let swept = mover.physics.aabb(budget.as_secs_f32());

    let mut min_fraction = fraction_cap.clamp(0.0, 1.0);
    let mut blocker = None;
    let mut separated = false;

    for obstacle in obstacles {
        if obstacle.projectile || Some(obstacle.entity) == mover.ignore {
            continue;
        }
        let mover_body = Body::new(mover.entity, Some(&*mover.physics));
        if !sanity_check(&mover_body, &obstacle.body()) {
            continue;
        }
        let Some(other) = obstacle.physics else {
            continue;
        };

        let other_box = other.aabb(0.0);
        if !broad_test(&swept, &other_box) {
            continue;
        }

        let fraction = narrow_test(&swept, &other_box);
        if fraction == 0.0 {
            mover.physics.translate(-get_penetration(&swept, &other_box));
            separated = true;
        }

        if fraction < min_fraction {
            min_fraction = fraction;
            blocker = Some(*obstacle);
        }
    }

    let used = portion(budget, min_fraction);
    mover.physics.advance(used.as_secs_f32());

    StepOutcome {
        used,
        fraction: min_fraction,
        blocker,
        separated,
    }
}

/// Drop the velocity component that would push back into `blocker`.
fn slide_along(physics: &mut Physics, blocker: &Physics, used: Duration) {
    let expanded = physics.aabb(used.as_secs_f32() / 10.0).state_space();
    let push = get_penetration(&expanded, &blocker.aabb(0.0));

    if push.x != 0.0 {
        physics.velocity.x = 0.0;
    }
    if push.y != 0.0 {
        physics.velocity.y = 0.0;
    }
}

/// Move an entity through one frame against a snapshot of the other bodies.
///
/// `fraction_cap` limits how much of the frame is spent moving, which keeps
/// pursuers from overshooting. Sub-moves are retried with the time left over
/// after a collision, up to the configured bound.
pub fn drive(
    mover: &mut Mover,
    frame: Duration,
    fraction_cap: f32,
    obstacles: &[Obstacle],
    config: &DriveConfig,
) -> DriveReport {
    let mut report = DriveReport::default();
    let mut remaining = frame;
    let mut allowance = portion(frame, fraction_cap);
    let mut limit = config.max_sub_moves.max(1);
    let mut unsticks_left = config.unstick_allowance;

    while !remaining.is_zero() && !allowance.is_zero() && report.sub_moves < limit {
        let cap = allowance.as_secs_f32() / remaining.as_secs_f32();
        let step = advance(mover, remaining, cap, obstacles);

        report.sub_moves += 1;
        report.used += step.used;
        report.separated |= step.separated;
        remaining = remaining.saturating_sub(step.used);
        allowance = allowance.saturating_sub(step.used);

        let Some(blocker) = step.blocker else {
            break;
        };
        report.blocker = Some(blocker.entity);

        if config.response == BlockResponse::Stop {
            break;
        }

        if step.used.is_zero() {
            if unsticks_left == 0 {
                break;
            }
            unsticks_left -= 1;
            limit = limit.saturating_add(1);
            continue;
        }

        if let Some(blocker_physics) = blocker.physics.as_ref() {
            slide_along(mover.physics, blocker_physics, step.used);
        }
        if mover.physics.velocity == Vec2::ZERO {
            break;
        }
    }

    report
}
