//! Identity and authoritative body state shared by every entity.
//!
//! This module provides:
//! - [`UnitId`], [`BulletId`], [`PlayerId`]: strongly typed identifiers
//! - [`Body`]: position, rotation and health of a unit
//!
//! A [`Body`] is only ever written by the apply phase. Unit behaviors receive
//! it by shared reference during update, so a unit cannot move, turn or heal
//! itself except by pushing events.
//!
//! # Example
//!
//! ```
//! use battle_core::entity::{Body, UnitId};
//! use glam::Vec2;
//!
//! let body = Body::new(Vec2::new(1.0, 2.0), 0.0, 100.0);
//! assert_eq!(body.health, 100.0);
//! assert!(!body.is_defeated());
//! assert_eq!(UnitId::new(7).as_u64(), 7);
//! ```

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates an identifier from a raw `u64` value.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw `u64` value of this identifier.
            #[must_use]
            pub const fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self::new(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Unique identifier of a unit.
    ///
    /// Assigned monotonically by the arena and never reused, so ordering by
    /// id is the same as ordering by insertion.
    UnitId,
    "UnitId"
);

define_id!(
    /// Unique identifier of a bullet.
    BulletId,
    "BulletId"
);

define_id!(
    /// Identifier of a connected player.
    PlayerId,
    "PlayerId"
);

/// Authoritative transform and health of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// World position.
    pub position: Vec2,
    /// Body rotation in radians (0 faces +Y).
    pub rotation: f32,
    /// Current health; the unit is removed once this reaches zero.
    pub health: f32,
    /// Health at spawn.
    pub max_health: f32,
}

impl Body {
    /// Creates a body at full health.
    #[must_use]
    pub const fn new(position: Vec2, rotation: f32, max_health: f32) -> Self {
        Self {
            position,
            rotation,
            health: max_health,
            max_health,
        }
    }

    /// Maps a world-space point into this body's local frame.
    #[must_use]
    pub fn world_to_local(&self, world: Vec2) -> Vec2 {
        geometry::world_to_local(self.position, self.rotation, world)
    }

    /// Maps a local-frame point into world space.
    #[must_use]
    pub fn local_to_world(&self, local: Vec2) -> Vec2 {
        geometry::local_to_world(self.position, self.rotation, local)
    }

    /// Returns `true` once health has dropped to zero or below.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod id_tests {
        use super::*;
        use std::collections::HashSet;

        #[test]
        fn ordering_follows_value() {
            let mut ids = vec![UnitId::new(3), UnitId::new(1), UnitId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![UnitId::new(1), UnitId::new(2), UnitId::new(3)]);
        }

        #[test]
        fn hashing() {
            let mut set = HashSet::new();
            set.insert(PlayerId::new(1));
            set.insert(PlayerId::new(2));
            set.insert(PlayerId::new(1));
            assert_eq!(set.len(), 2);
        }

        #[test]
        fn debug_and_display() {
            assert_eq!(format!("{:?}", UnitId::new(4)), "UnitId(4)");
            assert_eq!(format!("{:?}", BulletId::new(9)), "BulletId(9)");
            assert_eq!(format!("{}", PlayerId::new(2)), "2");
        }

        #[test]
        fn u64_conversions() {
            let id: BulletId = 12u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 12);
        }

        #[test]
        fn serialization_roundtrip() {
            let id = UnitId::new(12345);
            let json = serde_json::to_string(&id).unwrap();
            let back: UnitId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, back);
        }
    }

    mod body_tests {
        use super::*;
        use std::f32::consts::FRAC_PI_2;

        #[test]
        fn new_starts_at_full_health() {
            let body = Body::new(Vec2::ZERO, 0.0, 50.0);
            assert_eq!(body.health, body.max_health);
        }

        #[test]
        fn defeated_at_zero_or_below() {
            let mut body = Body::new(Vec2::ZERO, 0.0, 10.0);
            body.health = 0.0;
            assert!(body.is_defeated());
            body.health = -3.0;
            assert!(body.is_defeated());
            body.health = 0.1;
            assert!(!body.is_defeated());
        }

        #[test]
        fn frame_transforms() {
            let body = Body::new(Vec2::new(5.0, 5.0), FRAC_PI_2, 1.0);
            let world = body.local_to_world(Vec2::new(0.0, 1.0));
            assert!((world - Vec2::new(4.0, 5.0)).length() < 1e-5);
            assert!((body.world_to_local(world) - Vec2::new(0.0, 1.0)).length() < 1e-5);
        }
    }
}
