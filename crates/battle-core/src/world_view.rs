//! `WorldView` provides read-only access to the frozen snapshot during update.
//!
//! # Immutability
//!
//! A `WorldView` holds only shared references: to the committed arena, the
//! player table, the obstacle map and the configuration. This ensures that:
//! - Units and bullets cannot directly mutate the world (they push events)
//! - Every entity observes the same state, the end of the previous tick
//! - The update phase can run in parallel
//!
//! # Example
//!
//! ```
//! use battle_core::config::GameConfig;
//! use battle_core::game_core::GameCore;
//! use battle_core::unit::UnitTag;
//! use glam::Vec2;
//!
//! let mut core = GameCore::new(GameConfig::default(), 7);
//! let player = core.add_player();
//! let tank = core.spawn_unit(UnitTag::TinyTank, player, Vec2::ZERO, 0.0).unwrap();
//!
//! let view = core.world_view();
//! assert_eq!(view.get_unit(tank).unwrap().player_id(), player);
//! assert!(view.is_blocked_by_obstacles(Vec2::new(50.0, 0.0)));
//! assert_eq!(view.tick(), 0);
//! ```

use glam::{Vec2, Vec4};
use std::collections::BTreeMap;

use crate::arena::Arena;
use crate::bullet::Bullet;
use crate::config::GameConfig;
use crate::entity::{BulletId, PlayerId, UnitId};
use crate::obstacle::ObstacleMap;
use crate::player::Player;
use crate::unit::Unit;

/// Colour reported for players that are not connected.
pub const DEFAULT_PLAYER_COLOR: Vec4 = Vec4::ONE;

/// Read-only view of the committed world.
#[derive(Debug, Clone, Copy)]
pub struct WorldView<'a> {
    arena: &'a Arena,
    players: &'a BTreeMap<PlayerId, Player>,
    obstacles: &'a ObstacleMap,
    config: &'a GameConfig,
}

impl<'a> WorldView<'a> {
    /// Creates a view over the given snapshot.
    #[must_use]
    pub fn new(
        arena: &'a Arena,
        players: &'a BTreeMap<PlayerId, Player>,
        obstacles: &'a ObstacleMap,
        config: &'a GameConfig,
    ) -> Self {
        Self {
            arena,
            players,
            obstacles,
            config,
        }
    }

    /// Returns a connected player.
    #[must_use]
    pub fn get_player(&self, id: PlayerId) -> Option<&'a Player> {
        self.players.get(&id)
    }

    /// Returns the player's colour, or white if the player is not connected.
    #[must_use]
    pub fn get_player_color(&self, id: PlayerId) -> Vec4 {
        self.get_player(id).map_or(DEFAULT_PLAYER_COLOR, Player::color)
    }

    /// Iterates all units in id order.
    pub fn get_units(&self) -> impl Iterator<Item = (UnitId, &'a Unit)> + 'a {
        self.arena.units()
    }

    /// Returns a unit by id.
    #[must_use]
    pub fn get_unit(&self, id: UnitId) -> Option<&'a Unit> {
        self.arena.unit(id)
    }

    /// Iterates the units owned by `player` in id order.
    pub fn units_of_player(&self, player: PlayerId) -> impl Iterator<Item = &'a Unit> + 'a {
        self.arena.units_of_player(player)
    }

    /// Iterates all bullets in id order.
    pub fn get_bullets(&self) -> impl Iterator<Item = (BulletId, &'a Bullet)> + 'a {
        self.arena.bullets()
    }

    /// Returns `true` if `position` is outside the arena or inside an obstacle.
    #[must_use]
    pub fn is_blocked_by_obstacles(&self, position: Vec2) -> bool {
        self.obstacles.is_blocked(position)
    }

    /// Returns the obstacle map.
    #[must_use]
    pub fn obstacles(&self) -> &'a ObstacleMap {
        self.obstacles
    }

    /// Tick of the snapshot.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Simulation configuration.
    #[must_use]
    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    /// Duration of one tick in seconds.
    #[must_use]
    pub fn seconds_per_tick(&self) -> f32 {
        self.config.seconds_per_tick()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obstacle::Obstacle;
    use crate::tests::helpers::World;
    use crate::unit::UnitTag;

    #[test]
    fn player_lookup_and_color() {
        let mut world = World::new();
        let player = world.add_player();
        let view = world.view();

        assert!(view.get_player(player).is_some());
        assert_eq!(view.get_player_color(player), Player::new(player).color());
        assert!(view.get_player(PlayerId::new(42)).is_none());
        assert_eq!(view.get_player_color(PlayerId::new(42)), Vec4::ONE);
    }

    #[test]
    fn unit_queries() {
        let mut world = World::new();
        let p0 = world.add_player();
        let p1 = world.add_player();
        let a = world.spawn(UnitTag::CollisionTank, p0, Vec2::ZERO, 0.0);
        let b = world.spawn(UnitTag::TinyTank, p1, Vec2::ONE, 0.0);
        let view = world.view();

        let ids: Vec<_> = view.get_units().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(view.get_unit(b).unwrap().tag(), UnitTag::TinyTank);
        assert_eq!(view.units_of_player(p0).count(), 1);
        assert_eq!(view.get_bullets().count(), 0);
    }

    #[test]
    fn obstacles_and_boundary() {
        let mut world = World::new();
        world.obstacles.add(Obstacle::block(Vec2::new(3.0, 3.0), Vec2::ONE));
        let view = world.view();

        assert!(view.is_blocked_by_obstacles(Vec2::new(3.5, 3.5)));
        assert!(view.is_blocked_by_obstacles(Vec2::new(-20.0, 0.0)));
        assert!(!view.is_blocked_by_obstacles(Vec2::ZERO));
        assert_eq!(view.obstacles().obstacles().len(), 1);
    }

    #[test]
    fn timing_comes_from_config() {
        let mut world = World::new();
        world.config.tick_rate = 20;
        world.arena.advance_tick();
        let view = world.view();

        assert!((view.seconds_per_tick() - 0.05).abs() < 1e-7);
        assert_eq!(view.tick(), 1);
        assert_eq!(view.config().tick_rate, 20);
    }

    #[test]
    fn view_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorldView<'static>>();
    }
}
