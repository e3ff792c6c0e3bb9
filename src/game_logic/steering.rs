//! Velocity selection for the different brains.
//!
//! Everything here works on plain values so it can be tested without an App.

use super::rate_limit::RateLimit;
use crate::collision::broad_test;
use crate::components::{Brain, Physics};
use crate::geometry::Aabb;
use crate::pathfinding::{AStarResult, TileGrid, TileMap, find_path};
use bevy::prelude::*;
use std::time::Duration;

/// Which movement keys are currently held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveDirections {
    pub up: bool,
    pub left: bool,
    pub down: bool,
    pub right: bool,
}

impl MoveDirections {
    /// Unit vector of the held keys. Opposite keys cancel out.
    pub fn resultant(&self) -> Vec2 {
        let dx = match (self.left, self.right) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        let dy = match (self.down, self.up) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        };
        Vec2::new(dx, dy).normalize_or_zero()
    }
}

/// Velocity chosen for this frame plus the share of the frame worth moving.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Steering {
    pub velocity: Vec2,
    /// Never moves past the target when applied as a cap on the frame
    pub fraction: f32,
}

impl Steering {
    pub const HALT: Steering = Steering {
        velocity: Vec2::ZERO,
        fraction: 0.0,
    };

    pub fn full(velocity: Vec2) -> Self {
        Self {
            velocity,
            fraction: 1.0,
        }
    }
}

pub fn keyboard_steering(directions: &MoveDirections, move_speed: f32) -> Steering {
    Steering::full(directions.resultant() * move_speed)
}

/// Head straight for `destination` at full speed, stopping on arrival.
pub fn steer_toward(from: Vec2, destination: Vec2, move_speed: f32, frame: Duration) -> Steering {
    let offset = destination - from;
    let distance_can_move = move_speed * frame.as_secs_f32();
    let fraction = if distance_can_move > 0.0 {
        offset.length() / distance_can_move
    } else {
        0.0
    };

    Steering {
        velocity: offset.normalize_or_zero() * move_speed,
        fraction: fraction.clamp(0.0, 1.0),
    }
}

/// Path state held by an agent that walks the tile grid
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    pub path: Vec<IVec2>,
    pub index: usize,
    pub refresh: RateLimit,
}

impl PathFollower {
    pub fn new(refresh_rate: f32) -> Self {
        Self {
            path: Vec::new(),
            index: 0,
            refresh: RateLimit::new(refresh_rate),
        }
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// Take a fresh search result. The first tile is where the agent already
    /// stands, so following starts at the second one.
    pub fn adopt(&mut self, result: AStarResult) {
        if result.has_path {
            self.path = result.path;
            self.index = 1;
        } else {
            self.clear();
        }
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.index = 0;
    }

    /// Pick the waypoint to head for this frame.
    ///
    /// Tiles the mover already overlaps are skipped, and the index keeps
    /// moving while the chosen waypoint is closer than one frame of travel.
    pub fn next_waypoint(
        &mut self,
        mover: &Aabb,
        grid: &TileGrid,
        distance_can_move: f32,
    ) -> Option<IVec2> {
        let last = self.path.len().checked_sub(1)?;
        let min_corner = mover.min_corner();

        let mut distance_will_move = 0.0;
        let mut index = self.index.min(last);
        let mut next = self.index;
        while distance_will_move < distance_can_move && next <= last {
            index = next;
            next += 1;

            let tile = self.path[index];
            if broad_test(mover, &grid.tile_box(tile)) {
                continue;
            }
            distance_will_move = grid.position_for(tile).distance(min_corner);
        }

        self.index = index;
        Some(self.path[index])
    }

    /// Steering that lines the mover's min corner up with the next waypoint.
    pub fn steer(&mut self, mover: &Physics, grid: &TileGrid, frame: Duration) -> Option<Steering> {
        let speed = mover.move_speed.0;
        let waypoint = self.next_waypoint(&mover.aabb(0.0), grid, speed * frame.as_secs_f32())?;
        Some(steer_toward(
            mover.min_corner(),
            grid.position_for(waypoint),
            speed,
            frame,
        ))
    }
}

/// Tile search between two bodies, skipped when the target is `max_span` or
/// more tiles away on either axis.
pub fn plan_route(
    mover: &Physics,
    target: &Physics,
    grid: &TileGrid,
    map: &TileMap,
    max_span: i32,
) -> Option<AStarResult> {
    let start = grid.tile_for(mover.min_corner());
    let end = grid.tile_for(target.min_corner());

    let distance = (end - start).abs();
    if distance.x >= max_span || distance.y >= max_span {
        return None;
    }

    Some(find_path(start, end, grid.tile_span(mover.size), map))
}

/// This frame's steering for any brain.
///
/// `held` is only read by player-controlled brains and `target` only by
/// pursuers. A pursuer without a target stands still and forgets its path.
pub fn steer_brain(
    brain: &mut Brain,
    mover: &Physics,
    held: Option<&MoveDirections>,
    target: Option<&Physics>,
    grid: &TileGrid,
    frame: Duration,
) -> Steering {
    let speed = mover.move_speed.0;
    match brain {
        Brain::PlayerControlled => held
            .map(|directions| keyboard_steering(directions, speed))
            .unwrap_or(Steering::HALT),
        Brain::PursuePlayer => target
            .map(|target| steer_toward(mover.position, target.position, speed, frame))
            .unwrap_or(Steering::HALT),
        Brain::PursueViaPath(follower) => {
            let Some(target) = target else {
                follower.clear();
                return Steering::HALT;
            };
            follower
                .steer(mover, grid, frame)
                .unwrap_or_else(|| steer_toward(mover.position, target.position, speed, frame))
        }
        Brain::LinearProjectile => Steering::full(mover.velocity),
    }
}

/// Round-robin turn so that only one agent searches for a path per frame
#[derive(Resource, Debug, Default)]
pub struct PlanningTurn {
    next: usize,
}

impl PlanningTurn {
    /// Index of the agent allowed to plan this frame
    pub fn advance(&mut self, participants: usize) -> Option<usize> {
        if participants == 0 {
            self.next = 0;
            return None;
        }
        self.next = (self.next + 1) % participants;
        Some(self.next)
    }
}
