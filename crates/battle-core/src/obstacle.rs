//! Static terrain: the arena boundary and obstacles.
//!
//! [`ObstacleMap::is_blocked`] is the only question entities ask of the
//! terrain. It is a pure function of static geometry and never considers
//! other units or bullets; entity contact goes through `is_hit` instead.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Bounds {
    /// Creates bounds from two corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `point` lies inside or on the edge.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Size along each axis.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// A piece of impassable static geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Obstacle {
    /// Rotated rectangle centred on `position`.
    Block {
        /// Centre in world space.
        position: Vec2,
        /// Rotation in radians.
        rotation: f32,
        /// Half the width and height in the local frame.
        half_extent: Vec2,
    },
}

impl Obstacle {
    /// Creates an unrotated block.
    #[must_use]
    pub const fn block(position: Vec2, half_extent: Vec2) -> Self {
        Self::Block {
            position,
            rotation: 0.0,
            half_extent,
        }
    }

    /// Returns `true` if `point` lies inside this obstacle.
    #[must_use]
    pub fn is_blocked(&self, point: Vec2) -> bool {
        match *self {
            Self::Block {
                position,
                rotation,
                half_extent,
            } => {
                let local = geometry::world_to_local(position, rotation, point);
                local.x.abs() <= half_extent.x && local.y.abs() <= half_extent.y
            }
        }
    }
}

/// Boundary plus obstacles, owned by the game core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleMap {
    boundary: Bounds,
    obstacles: Vec<Obstacle>,
}

impl ObstacleMap {
    /// Creates a map with only a boundary.
    #[must_use]
    pub fn new(boundary: Bounds) -> Self {
        Self {
            boundary,
            obstacles: Vec::new(),
        }
    }

    /// Adds an obstacle.
    pub fn add(&mut self, obstacle: Obstacle) {
        self.obstacles.push(obstacle);
    }

    /// Returns the playable boundary.
    #[must_use]
    pub fn boundary(&self) -> Bounds {
        self.boundary
    }

    /// Returns the obstacles in insertion order.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Returns `true` if `point` is outside the boundary or inside any obstacle.
    #[must_use]
    pub fn is_blocked(&self, point: Vec2) -> bool {
        !self.boundary.contains(point) || self.obstacles.iter().any(|o| o.is_blocked(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn map() -> ObstacleMap {
        ObstacleMap::new(Bounds::new(Vec2::splat(-10.0), Vec2::splat(10.0)))
    }

    #[test]
    fn bounds_contains_edges() {
        let b = Bounds::new(Vec2::ZERO, Vec2::ONE);
        assert!(b.contains(Vec2::ZERO));
        assert!(b.contains(Vec2::ONE));
        assert!(!b.contains(Vec2::new(1.01, 0.5)));
        assert_eq!(b.size(), Vec2::ONE);
    }

    #[test]
    fn outside_boundary_is_blocked() {
        let m = map();
        assert!(!m.is_blocked(Vec2::ZERO));
        assert!(m.is_blocked(Vec2::new(10.5, 0.0)));
        assert!(m.is_blocked(Vec2::new(0.0, -11.0)));
    }

    #[test]
    fn block_blocks_interior() {
        let mut m = map();
        m.add(Obstacle::block(Vec2::new(3.0, 0.0), Vec2::new(1.0, 2.0)));
        assert!(m.is_blocked(Vec2::new(3.5, 1.5)));
        assert!(!m.is_blocked(Vec2::new(4.5, 0.0)));
        assert_eq!(m.obstacles().len(), 1);
    }

    #[test]
    fn rotated_block_uses_local_frame() {
        let diamond = Obstacle::Block {
            position: Vec2::ZERO,
            rotation: FRAC_PI_4,
            half_extent: Vec2::ONE,
        };
        // Corner of the unrotated square is outside the rotated one.
        assert!(!diamond.is_blocked(Vec2::new(0.95, 0.95)));
        // Point along the axis the diagonal now lies on is inside.
        assert!(diamond.is_blocked(Vec2::new(0.0, 1.3)));
    }
}
