//! Axis-aligned boxes with a per-frame trajectory.
//!
//! An [`Aabb`] is always rebuilt from an entity's position, size and
//! velocity when it is needed. Nothing in the crate stores one between
//! queries.

use bevy::prelude::*;

/// Axis-aligned bounding box carrying the displacement planned for the frame.
///
/// `size` must be non-negative on both axes. A zero size is a valid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
    pub trajectory: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2, trajectory: Vec2) -> Self {
        Self {
            center,
            size,
            trajectory,
        }
    }

    /// A box that is not going anywhere this frame.
    pub fn fixed(center: Vec2, size: Vec2) -> Self {
        Self::new(center, size, Vec2::ZERO)
    }

    /// Build a fixed box from its min corner, the way tiles are addressed.
    pub fn from_min_corner(min_corner: Vec2, size: Vec2) -> Self {
        Self::fixed(min_corner + size / 2.0, size)
    }

    pub fn extent(&self) -> Vec2 {
        self.size / 2.0
    }

    pub fn min_corner(&self) -> Vec2 {
        self.center - self.extent()
    }

    pub fn max_corner(&self) -> Vec2 {
        self.center + self.extent()
    }

    /// Per axis, whichever corner coordinate lies closer to the origin.
    /// Ties resolve to the min corner.
    pub fn near_corner(&self) -> Vec2 {
        let (min, max) = (self.min_corner(), self.max_corner());
        Vec2::new(
            if min.x.abs() <= max.x.abs() { min.x } else { max.x },
            if min.y.abs() <= max.y.abs() { min.y } else { max.y },
        )
    }

    /// Per axis, whichever corner coordinate lies farther from the origin.
    /// Ties resolve to the max corner.
    pub fn far_corner(&self) -> Vec2 {
        let (min, max) = (self.min_corner(), self.max_corner());
        Vec2::new(
            if min.x.abs() > max.x.abs() { min.x } else { max.x },
            if min.y.abs() > max.y.abs() { min.y } else { max.y },
        )
    }

    /// Strict interior test. Points on an edge are outside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        let (min, max) = (self.min_corner(), self.max_corner());
        min.x < point.x && point.x < max.x && min.y < point.y && point.y < max.y
    }

    /// The whole region this box sweeps across during the frame.
    ///
    /// ```
    /// use bevy::math::Vec2;
    /// use shooty::geometry::Aabb;
    ///
    /// let moving = Aabb::new(Vec2::new(10.0, 0.0), Vec2::splat(2.0), Vec2::new(4.0, 0.0));
    /// let swept = moving.state_space();
    /// assert_eq!(swept.center, Vec2::new(12.0, 0.0));
    /// assert_eq!(swept.size, Vec2::new(6.0, 2.0));
    /// assert_eq!(swept.trajectory, Vec2::ZERO);
    /// ```
    pub fn state_space(&self) -> Aabb {
        Aabb::fixed(
            self.center + self.trajectory / 2.0,
            self.size + self.trajectory.abs(),
        )
    }

    pub fn state_space_for(aabb: &Aabb) -> Aabb {
        aabb.state_space()
    }

    /// Relative box of `first` against `second`. The two overlap exactly when
    /// the result contains the origin.
    pub fn minkowski_difference(first: &Aabb, second: &Aabb) -> Aabb {
        Aabb::new(
            first.center - second.center,
            first.size + second.size,
            first.trajectory - second.trajectory,
        )
    }

    /// Overlap that excludes shared edges.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        Aabb::minkowski_difference(self, other).contains_point(Vec2::ZERO)
    }

    pub fn translated(&self, offset: Vec2) -> Aabb {
        Aabb::new(self.center + offset, self.size, self.trajectory)
    }
}
