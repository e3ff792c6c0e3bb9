//! Swept box collision tests.
//!
//! `first` is always the mover's box carrying this frame's trajectory and
//! `second` is the obstacle's box. Every function here is pure.

use crate::components::Physics;
use crate::geometry::Aabb;
use bevy::prelude::*;

/// Size of the push applied when two boxes share an edge exactly.
pub const EDGE_NUDGE: f32 = 0.01;

/// An entity as the collision filter sees it.
#[derive(Debug, Clone, Copy)]
pub struct Body<'a> {
    pub entity: Entity,
    pub physics: Option<&'a Physics>,
}

impl<'a> Body<'a> {
    pub fn new(entity: Entity, physics: Option<&'a Physics>) -> Self {
        Self { entity, physics }
    }
}

/// Cheap pair filter that runs before any geometry.
///
/// Rejects an entity paired with itself, pairs where either side has no
/// physics, and pairs where either side is not solid.
pub fn sanity_check(a: &Body, b: &Body) -> bool {
    if a.entity == b.entity {
        return false;
    }

    match (a.physics, b.physics) {
        (Some(first), Some(second)) => first.solid && second.solid,
        _ => false,
    }
}

/// Conservative overlap test of the two swept regions.
///
/// May report pairs that never actually touch, but never misses a pair that
/// does touch at some point during the frame.
pub fn broad_test(first: &Aabb, second: &Aabb) -> bool {
    Aabb::minkowski_difference(&first.state_space(), &second.state_space())
        .contains_point(Vec2::ZERO)
}

/// Fraction of the frame's trajectory that can be travelled before contact.
///
/// `0.0` means the boxes already overlap, `1.0` means no contact this frame.
///
/// ```
/// use bevy::math::Vec2;
/// use shooty::collision::narrow_test;
/// use shooty::geometry::Aabb;
///
/// let mover = Aabb::new(Vec2::new(11.0, 11.0), Vec2::splat(2.0), Vec2::new(4.0, 0.0));
/// let wall = Aabb::fixed(Vec2::new(15.0, 11.0), Vec2::splat(2.0));
/// assert_eq!(narrow_test(&mover, &wall), 0.5);
/// ```
pub fn narrow_test(first: &Aabb, second: &Aabb) -> f32 {
    if !broad_test(first, second) {
        return 1.0;
    }

    let diff = Aabb::minkowski_difference(first, second);
    if diff.contains_point(Vec2::ZERO) {
        return 0.0;
    }

    let (near, far) = (diff.near_corner(), diff.far_corner());
    let Some((entry_x, exit_x)) = crossing_window(near.x, far.x, diff.trajectory.x) else {
        return 1.0;
    };
    let Some((entry_y, exit_y)) = crossing_window(near.y, far.y, diff.trajectory.y) else {
        return 1.0;
    };

    // the two axis windows never coincide
    if entry_x > exit_y || entry_y > exit_x {
        return 1.0;
    }

    let entry = entry_x.max(entry_y);
    let exit = exit_x.min(exit_y);
    if entry >= 1.0 || exit <= 0.0 {
        return 1.0;
    }

    entry.clamp(0.0, 1.0)
}

/// Times at which the origin enters and leaves one axis of a Minkowski
/// difference travelling along `trajectory`.
///
/// A still axis places no limit when the origin sits strictly inside it, and
/// rules out contact entirely when it does not.
fn crossing_window(near: f32, far: f32, trajectory: f32) -> Option<(f32, f32)> {
    if trajectory == 0.0 {
        let (low, high) = (near.min(far), near.max(far));
        return (low < 0.0 && 0.0 < high).then_some((f32::NEG_INFINITY, f32::INFINITY));
    }

    let to_near = near / -trajectory;
    let to_far = far / -trajectory;
    Some((to_near.min(to_far), to_near.max(to_far)))
}

/// Shallowest push that separates two overlapping boxes.
///
/// Callers move `first` by the negated vector.
pub fn get_penetration(first: &Aabb, second: &Aabb) -> Vec2 {
    let diff = Aabb::minkowski_difference(first, second);
    let (near, far) = (diff.near_corner(), diff.far_corner());

    if near.x == 0.0 {
        return Vec2::new(-far.x.signum() * EDGE_NUDGE, 0.0);
    }
    if near.y == 0.0 {
        return Vec2::new(0.0, -far.y.signum() * EDGE_NUDGE);
    }

    if near.x.abs() < near.y.abs() {
        Vec2::new(near.x, 0.0)
    } else {
        Vec2::new(0.0, near.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    fn square(x: f32, y: f32, side: f32) -> Aabb {
        Aabb::fixed(Vec2::new(x, y), Vec2::splat(side))
    }

    fn physics(solid: bool) -> Physics {
        Physics {
            solid,
            ..Physics::default()
        }
    }

    /// Sanity check between two distinct entities
    fn distinct_pair(first: Option<&Physics>, second: Option<&Physics>) -> bool {
        let (a, b) = (Entity::from_raw(1), Entity::from_raw(2));
        sanity_check(&Body::new(a, first), &Body::new(b, second))
    }

    #[test]
    fn test_sanity_check_rejects_self() {
        let body = physics(true);
        let entity = Entity::from_raw(7);
        assert!(!sanity_check(
            &Body::new(entity, Some(&body)),
            &Body::new(entity, Some(&body))
        ));
    }

    #[test]
    fn test_sanity_check_requires_physics() {
        let body = physics(true);

        assert!(!distinct_pair(None, None));
        assert!(!distinct_pair(Some(&body), None));
        assert!(!distinct_pair(None, Some(&body)));
    }

    #[test]
    fn test_sanity_check_requires_solidity() {
        let (solid, ghost) = (physics(true), physics(false));

        assert!(!distinct_pair(Some(&ghost), Some(&ghost)));
        assert!(!distinct_pair(Some(&solid), Some(&ghost)));
        assert!(!distinct_pair(Some(&ghost), Some(&solid)));
        assert!(distinct_pair(Some(&solid), Some(&solid)));
    }

    #[test]
    fn test_broad_and_narrow_along_x() {
        let mut first = square(10.0, 0.0, 2.0);
        let mut second = square(13.0, 0.0, 2.0);

        // separated
        assert!(!broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 1.0);

        // sharing an edge
        second.center.x = 12.0;
        assert!(!broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 1.0);

        // overlapping
        second.center.x = 11.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);

        // approaching each other, meeting halfway through the frame
        first.center.x -= 1.0;
        first.trajectory.x = 1.0;
        second.center.x += 1.0;
        second.trajectory.x = -1.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.5);

        // second zooms past on the y axis before first gets there
        second.center.y += 10.0;
        second.trajectory.y = -100.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 1.0);
    }

    #[test]
    fn test_broad_and_narrow_along_y() {
        let mut first = square(0.0, 10.0, 2.0);
        let mut second = square(0.0, 13.0, 2.0);

        assert!(!broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 1.0);

        second.center.y = 12.0;
        assert!(!broad_test(&first, &second));

        second.center.y = 11.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);

        first.center.y -= 1.0;
        first.trajectory.y = 1.0;
        second.center.y += 1.0;
        second.trajectory.y = -1.0;
        assert_eq!(narrow_test(&first, &second), 0.5);

        second.center.x += 10.0;
        second.trajectory.x = -100.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 1.0);
    }

    #[test]
    fn test_enclosed_boxes_and_points() {
        let mut first = square(10.0, 10.0, 2.0);
        let mut second = square(10.0, 10.0, 1.0);
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);

        first.size = Vec2::ZERO;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);

        first.size = Vec2::splat(2.0);
        second.size = Vec2::ZERO;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);

        second.size = Vec2::ONE;
        first.center.y -= 1.0;
        first.trajectory.y = 1.0;
        second.center.x += 1.0;
        second.trajectory.x = -1.0;
        assert!(broad_test(&first, &second));
        assert_eq!(narrow_test(&first, &second), 0.0);
    }

    #[test]
    fn test_narrow_fractions_along_x() {
        for sign in [1.0, -1.0] {
            let mut first = square(11.0 * sign, 11.0, 2.0);
            let mut second = square(15.0 * sign, 11.0, 2.0);
            assert_eq!(narrow_test(&first, &second), 1.0);

            first.trajectory.x = 4.0 * sign;
            assert_eq!(narrow_test(&first, &second), 0.5);

            second.trajectory.x = -4.0 * sign;
            assert_eq!(narrow_test(&first, &second), 0.25);

            second.trajectory.x = 2.0 * sign;
            assert_eq!(narrow_test(&first, &second), 1.0);
        }
    }

    #[test]
    fn test_narrow_fractions_along_y() {
        for sign in [1.0, -1.0] {
            let mut first = square(11.0, 11.0 * sign, 2.0);
            let mut second = square(11.0, 15.0 * sign, 2.0);
            assert_eq!(narrow_test(&first, &second), 1.0);

            first.trajectory.y = 4.0 * sign;
            assert_eq!(narrow_test(&first, &second), 0.5);

            second.trajectory.y = -4.0 * sign;
            assert_eq!(narrow_test(&first, &second), 0.25);

            second.trajectory.y = 2.0 * sign;
            assert_eq!(narrow_test(&first, &second), 1.0);
        }
    }

    #[test]
    fn test_gap_wider_than_trajectory() {
        let mover = Aabb::new(Vec2::new(10.0, 0.0), Vec2::splat(2.0), Vec2::new(4.0, 0.0));
        let wall = square(20.0, 0.0, 2.0);
        // 8 units between the edges, only 4 travelled
        assert_eq!(narrow_test(&mover, &wall), 1.0);

        let fast = Aabb::new(mover.center, mover.size, Vec2::new(16.0, 0.0));
        assert_eq!(narrow_test(&fast, &wall), 0.5);
    }

    #[test]
    fn test_sliding_along_a_wall_is_free() {
        // flush against the left face of the wall, moving straight down
        let mover = Aabb::new(Vec2::new(8.0, 0.0), Vec2::splat(2.0), Vec2::new(0.0, 6.0));
        let wall = Aabb::fixed(Vec2::new(10.0, 3.0), Vec2::new(2.0, 4.0));
        assert_eq!(narrow_test(&mover, &wall), 1.0);
    }

    #[test]
    fn test_diagonal_approach_inside_one_axis() {
        // y ranges already overlap while x closes the gap
        let mover = Aabb::new(Vec2::new(0.0, 0.0), Vec2::splat(2.0), Vec2::new(4.0, 0.5));
        let wall = square(4.0, 0.0, 2.0);
        assert_eq!(narrow_test(&mover, &wall), 0.5);
    }

    #[test]
    fn test_penetration_picks_shallowest_axis() {
        let first = square(10.0, 10.0, 2.0);
        let push = |x: f32, y: f32| get_penetration(&first, &square(x, y, 2.0));

        assert_eq!(push(11.0, 10.0), Vec2::new(1.0, 0.0));
        assert_eq!(push(9.0, 10.0), Vec2::new(-1.0, 0.0));
        assert_eq!(push(10.0, 9.0), Vec2::new(0.0, -1.0));
        assert_eq!(push(10.0, 11.0), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_penetration_depends_on_order() {
        let a = square(10.0, 10.0, 2.0);
        let b = square(11.0, 10.0, 2.0);

        assert!(broad_test(&a, &b));
        assert_eq!(narrow_test(&a, &b), 0.0);
        assert_eq!(get_penetration(&a, &b), Vec2::new(1.0, 0.0));
        assert_eq!(get_penetration(&b, &a), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn test_penetration_correction_separates() {
        let obstacle = square(10.0, 10.0, 2.0);
        let mover = Aabb::fixed(Vec2::new(10.75, 9.5), Vec2::splat(2.0));
        assert_eq!(narrow_test(&mover, &obstacle), 0.0);

        let corrected = mover.translated(-get_penetration(&mover, &obstacle));
        assert!(!corrected.overlaps(&obstacle));
        assert_eq!(narrow_test(&corrected, &obstacle), 1.0);

        // what is left over is at most the edge nudge
        let residual = get_penetration(&corrected, &obstacle);
        assert!(residual.length() <= EDGE_NUDGE + f32::EPSILON);
    }

    #[test]
    fn test_edge_nudge_points_away() {
        // sharing the mover's right edge with the obstacle's left edge
        let mover = square(8.0, 0.0, 2.0);
        let obstacle = square(10.0, 0.0, 2.0);
        let nudge = get_penetration(&mover, &obstacle);
        assert_eq!(nudge, Vec2::new(EDGE_NUDGE, 0.0));

        let moved = mover.translated(-nudge);
        assert!(moved.max_corner().x < obstacle.min_corner().x);
    }

    fn quarter(rng: &mut Pcg32, low: i32, high: i32) -> f32 {
        rng.gen_range(low..=high) as f32 * 0.25
    }

    fn random_box(rng: &mut Pcg32) -> Aabb {
        Aabb::new(
            Vec2::new(quarter(rng, -32, 32), quarter(rng, -32, 32)),
            Vec2::new(quarter(rng, 0, 16), quarter(rng, 0, 16)),
            Vec2::new(quarter(rng, -32, 32), quarter(rng, -32, 32)),
        )
    }

    fn overlap_at(first: &Aabb, second: &Aabb, time: f32) -> bool {
        let a = Aabb::fixed(first.center + first.trajectory * time, first.size);
        let b = Aabb::fixed(second.center + second.trajectory * time, second.size);
        a.overlaps(&b)
    }

    #[test]
    fn test_broad_test_has_no_false_negatives() {
        let mut rng = Pcg32::seed_from_u64(0x5eed);
        let mut contacts = 0;

        for _ in 0..5000 {
            let (first, second) = (random_box(&mut rng), random_box(&mut rng));
            let narrow = narrow_test(&first, &second);

            if narrow < 1.0 {
                assert!(broad_test(&first, &second), "{first:?} vs {second:?}");
            }

            for step in 0..=16 {
                let time = step as f32 / 16.0;
                if overlap_at(&first, &second, time) {
                    contacts += 1;
                    assert!(
                        broad_test(&first, &second),
                        "{first:?} vs {second:?} at {time}"
                    );
                    assert!(
                        narrow <= time + 1e-4,
                        "contact at {time} but narrow_test gave {narrow}: {first:?} vs {second:?}"
                    );
                    break;
                }
            }
        }

        println!("randomized pairs in contact: {contacts}");
        assert!(contacts > 0);
    }
}
