//! Arena module: storage for every live unit and bullet.
//!
//! # Determinism
//!
//! Units and bullets are stored in `BTreeMap`s keyed by monotonically
//! assigned ids, so iteration is always in id order, which is also spawn
//! order. Ids are never reused, even after a despawn.

use glam::Vec2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bullet::{Bullet, BulletBody, BulletInner};
use crate::entity::{Body, BulletId, PlayerId, UnitId};
use crate::unit::{Unit, UnitInner};

// =============================================================================
// Arena
// =============================================================================

/// Container of all simulation entities plus the tick counter.
///
/// # Example
///
/// ```
/// use battle_core::arena::Arena;
/// use battle_core::config::GameConfig;
/// use battle_core::entity::{Body, PlayerId};
/// use battle_core::unit::{TinyTank, UnitInner};
/// use glam::Vec2;
///
/// let config = GameConfig::default();
/// let mut arena = Arena::new();
/// let a = arena.spawn_unit(
///     PlayerId::new(0),
///     Body::new(Vec2::ZERO, 0.0, 100.0),
///     UnitInner::TinyTank(TinyTank::new(&config)),
/// );
/// let b = arena.spawn_unit(
///     PlayerId::new(1),
///     Body::new(Vec2::ONE, 0.0, 100.0),
///     UnitInner::TinyTank(TinyTank::new(&config)),
/// );
///
/// let ids: Vec<_> = arena.units().map(|(id, _)| id).collect();
/// assert_eq!(ids, vec![a, b]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    next_unit_id: u64,
    next_bullet_id: u64,
    units: BTreeMap<UnitId, Unit>,
    bullets: BTreeMap<BulletId, Bullet>,
    tick: u64,
}

impl Arena {
    /// Creates an empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Units
    // -------------------------------------------------------------------------

    /// Adds a unit and returns its freshly assigned id.
    pub fn spawn_unit(&mut self, player_id: PlayerId, body: Body, inner: UnitInner) -> UnitId {
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id += 1;
        self.units.insert(id, Unit::new(id, player_id, body, inner));
        id
    }

    /// Removes a unit, returning it if it existed.
    pub fn despawn_unit(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Returns a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Returns a unit by id, mutably.
    #[must_use]
    pub fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Iterates units in id order.
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &Unit)> + '_ {
        self.units.iter().map(|(&id, unit)| (id, unit))
    }

    /// Iterates the units owned by `player` in id order.
    pub fn units_of_player(&self, player: PlayerId) -> impl Iterator<Item = &Unit> + '_ {
        self.units
            .values()
            .filter(move |unit| unit.player_id() == player)
    }

    /// Groups unit ids by owner.
    #[must_use]
    pub fn units_by_player(&self) -> BTreeMap<PlayerId, Vec<UnitId>> {
        let mut groups: BTreeMap<PlayerId, Vec<UnitId>> = BTreeMap::new();
        for (id, unit) in &self.units {
            groups.entry(unit.player_id()).or_default().push(*id);
        }
        groups
    }

    /// Parallel mutable iteration over units, for the update phase.
    pub fn par_units_mut(&mut self) -> impl ParallelIterator<Item = (&UnitId, &mut Unit)> + '_ {
        self.units.par_iter_mut()
    }

    /// Ids of units whose health has run out, in id order.
    #[must_use]
    pub fn defeated_units(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|(_, unit)| unit.body().is_defeated())
            .map(|(&id, _)| id)
            .collect()
    }

    /// Number of live units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    // -------------------------------------------------------------------------
    // Bullets
    // -------------------------------------------------------------------------

    /// Adds a bullet and returns its freshly assigned id.
    pub fn spawn_bullet(&mut self, body: BulletBody, inner: BulletInner) -> BulletId {
        let id = BulletId::new(self.next_bullet_id);
        self.next_bullet_id += 1;
        self.bullets.insert(id, Bullet::new(id, body, inner));
        id
    }

    /// Removes a bullet, returning it if it existed.
    pub fn despawn_bullet(&mut self, id: BulletId) -> Option<Bullet> {
        self.bullets.remove(&id)
    }

    /// Returns a bullet by id.
    #[must_use]
    pub fn bullet(&self, id: BulletId) -> Option<&Bullet> {
        self.bullets.get(&id)
    }

    /// Returns a bullet by id, mutably.
    #[must_use]
    pub fn bullet_mut(&mut self, id: BulletId) -> Option<&mut Bullet> {
        self.bullets.get_mut(&id)
    }

    /// Iterates bullets in id order.
    pub fn bullets(&self) -> impl Iterator<Item = (BulletId, &Bullet)> + '_ {
        self.bullets.iter().map(|(&id, bullet)| (id, bullet))
    }

    /// Parallel mutable iteration over bullets, for the update phase.
    pub fn par_bullets_mut(
        &mut self,
    ) -> impl ParallelIterator<Item = (&BulletId, &mut Bullet)> + '_ {
        self.bullets.par_iter_mut()
    }

    /// Number of live bullets.
    #[must_use]
    pub fn bullet_count(&self) -> usize {
        self.bullets.len()
    }

    // -------------------------------------------------------------------------
    // Queries & Tick
    // -------------------------------------------------------------------------

    /// First unit, in id order, whose hit test contains `point`.
    #[must_use]
    pub fn unit_at(&self, point: Vec2) -> Option<UnitId> {
        self.units
            .iter()
            .find(|(_, unit)| unit.is_hit(point))
            .map(|(&id, _)| id)
    }

    /// Returns true if the arena holds no units and no bullets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.bullets.is_empty()
    }

    /// Returns the current simulation tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the simulation tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}

// =============================================================================
// Tests
// =============================================================================
