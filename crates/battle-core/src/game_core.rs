//! Game core module with the two-phase tick loop.
//!
//! `GameCore` owns every player, unit, bullet and obstacle and advances them
//! through a deterministic tick:
//!
//! 1. **SNAPSHOT**: the committed arena `current` is frozen for the tick
//! 2. **UPDATE**: every unit, then every bullet, runs in parallel against a
//!    [`WorldView`] of the snapshot and pushes events into its own sink
//! 3. **APPLY**: the merged queue is sorted and the [`resolver`] applies it to
//!    the working arena `next`, then removes defeated units
//! 4. **SWAP**: the buffers are swapped and the tick counter advances
//!
//! # Determinism
//!
//! - Entities live in `BTreeMap`s, so iteration is in id order
//! - Events are sorted by (origin, sequence) before the apply phase
//! - The only randomness, spawn-point sampling, comes from a `ChaCha8Rng`
//!   seeded at construction
//!
//! # Example
//!
//! ```
//! use battle_core::config::GameConfig;
//! use battle_core::game_core::GameCore;
//! use battle_core::player::{InputData, Keys};
//! use battle_core::unit::UnitTag;
//! use glam::Vec2;
//!
//! let mut core = GameCore::new(GameConfig::default(), 42);
//! let player = core.add_player();
//! let tank = core
//!     .spawn_unit(UnitTag::CollisionTank, player, Vec2::ZERO, 0.0)
//!     .unwrap();
//!
//! core.set_input(player, InputData::new(Keys::FORWARD, Vec2::new(0.0, 5.0)))
//!     .unwrap();
//! for _ in 0..30 {
//!     core.step();
//! }
//!
//! assert_eq!(core.tick(), 30);
//! assert!(core.arena().unit(tank).unwrap().body().position.y > 0.0);
//! ```

use glam::{Vec2, Vec4};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::bullet::BulletBehavior;
use crate::config::GameConfig;
use crate::entity::{Body, BulletId, PlayerId, UnitId};
use crate::error::{CoreError, Result};
use crate::event::{Event, EventOrigin, EventQueue, EventSink, QueuedEvent};
use crate::obstacle::{Obstacle, ObstacleMap};
use crate::player::{InputData, Player};
use crate::render::{ModelRegistry, RenderContext, Renderer};
use crate::resolver;
use crate::unit::{Unit, UnitBehavior, UnitRegistry, UnitTag};
use crate::world_view::{WorldView, DEFAULT_PLAYER_COLOR};

// =============================================================================
// Tick Report
// =============================================================================

/// What happened during one [`GameCore::step`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick that was simulated.
    pub tick: u64,
    /// Every event processed, in apply order.
    pub events: Vec<QueuedEvent>,
    /// Events dropped because their target was already gone.
    pub dropped: usize,
    /// Bullets fired this tick.
    pub spawned: Vec<BulletId>,
    /// Units removed because their health ran out.
    pub destroyed: Vec<UnitId>,
}

impl TickReport {
    /// Iterates the events of this tick without their queue metadata.
    pub fn iter_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|q| &q.event)
    }
}

// =============================================================================
// Game Core
// =============================================================================

/// The simulation authority.
///
/// # Double Buffering
///
/// - `current`: the committed state every entity reads during update
/// - `next`: the working copy whose entities run `update` and which the
///   resolver mutates
///
/// After the apply phase the buffers are swapped, so `current` always holds
/// the end-of-tick state.
#[derive(Debug, Clone)]
pub struct GameCore {
    config: GameConfig,
    current: Arena,
    next: Arena,
    players: BTreeMap<PlayerId, Player>,
    next_player_id: u64,
    obstacles: ObstacleMap,
    registry: UnitRegistry,
    pending: Vec<Event>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl GameCore {
    /// Creates an empty game with the built-in unit types registered.
    ///
    /// # Example
    ///
    /// ```
    /// use battle_core::config::GameConfig;
    /// use battle_core::game_core::GameCore;
    ///
    /// let core = GameCore::new(GameConfig::default(), 12345);
    /// assert_eq!(core.tick(), 0);
    /// assert_eq!(core.seed(), 12345);
    /// ```
    #[must_use]
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let obstacles = ObstacleMap::new(config.boundary);
        Self {
            config,
            current: Arena::new(),
            next: Arena::new(),
            players: BTreeMap::new(),
            next_player_id: 0,
            obstacles,
            registry: UnitRegistry::with_builtin_units(),
            pending: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    // -------------------------------------------------------------------------
    // Players
    // -------------------------------------------------------------------------

    /// Registers a new player and returns its id.
    pub fn add_player(&mut self) -> PlayerId {
        let id = PlayerId::new(self.next_player_id);
        self.next_player_id += 1;
        self.players.insert(id, Player::new(id));
        debug!(player = %id, "player joined");
        id
    }

    /// Removes a player.
    ///
    /// The player's units stay in the arena. Units that need input stop
    /// driving, while contact damage still applies.
    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            debug!(player = %id, "player left");
        }
        removed
    }

    /// Replaces the input snapshot a player's units read next tick.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownPlayer`] if the player is not connected.
    pub fn set_input(&mut self, id: PlayerId, input: InputData) -> Result<()> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(CoreError::UnknownPlayer(id))?;
        player.set_input_data(input);
        Ok(())
    }

    /// Returns a connected player.
    #[must_use]
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    /// Returns the player's colour, or white if the player is not connected.
    #[must_use]
    pub fn get_player_color(&self, id: PlayerId) -> Vec4 {
        self.players
            .get(&id)
            .map_or(DEFAULT_PLAYER_COLOR, Player::color)
    }

    /// Iterates connected players in id order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    // -------------------------------------------------------------------------
    // Spawning
    // -------------------------------------------------------------------------

    /// Spawns a unit into the committed state at full health.
    ///
    /// # Errors
    ///
    /// - [`CoreError::UnknownPlayer`] if `player` is not connected
    /// - [`CoreError::UnknownUnitType`] if `tag` has no registered factory
    pub fn spawn_unit(
        &mut self,
        tag: UnitTag,
        player: PlayerId,
        position: Vec2,
        rotation: f32,
    ) -> Result<UnitId> {
        if !self.players.contains_key(&player) {
            return Err(CoreError::UnknownPlayer(player));
        }
        let inner = self
            .registry
            .create(tag, &self.config)
            .ok_or_else(|| CoreError::UnknownUnitType(tag.to_string()))?;
        let body = Body::new(position, rotation, inner.max_health());
        let id = self.current.spawn_unit(player, body, inner);
        debug!(unit = %id, %tag, %player, x = position.x, y = position.y, "unit spawned");
        Ok(id)
    }

    /// Spawns a unit looked up by its display name, such as `"Tiny Tank"`.
    ///
    /// # Errors
    ///
    /// Same as [`spawn_unit`](Self::spawn_unit); an unregistered name gives
    /// [`CoreError::UnknownUnitType`].
    pub fn spawn_unit_by_name(
        &mut self,
        name: &str,
        player: PlayerId,
        position: Vec2,
        rotation: f32,
    ) -> Result<UnitId> {
        let tag = self
            .registry
            .tag_for_name(name)
            .ok_or_else(|| CoreError::UnknownUnitType(name.to_owned()))?;
        self.spawn_unit(tag, player, position, rotation)
    }

    /// Removes a unit from the committed state between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownUnit`] if no such unit is alive.
    pub fn despawn_unit(&mut self, id: UnitId) -> Result<Unit> {
        let unit = self
            .current
            .despawn_unit(id)
            .ok_or(CoreError::UnknownUnit(id))?;
        debug!(unit = %id, player = %unit.player_id(), "unit despawned");
        Ok(unit)
    }

    /// Samples a random unblocked point inside the boundary.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoSpawnPosition`] if `spawn_attempts` samples in a
    /// row were all blocked.
    pub fn random_spawn_position(&mut self) -> Result<Vec2> {
        let bounds = self.obstacles.boundary();
        let attempts = self.config.spawn_attempts;
        for _ in 0..attempts {
            let candidate = Vec2::new(
                self.rng.gen_range(bounds.min.x..bounds.max.x),
                self.rng.gen_range(bounds.min.y..bounds.max.y),
            );
            if !self.obstacles.is_blocked(candidate) {
                return Ok(candidate);
            }
        }
        Err(CoreError::NoSpawnPosition { attempts })
    }

    // -------------------------------------------------------------------------
    // Obstacles
    // -------------------------------------------------------------------------

    /// Adds an obstacle to the map.
    pub fn add_obstacle(&mut self, obstacle: Obstacle) {
        self.obstacles.add(obstacle);
    }

    /// Returns `true` if `position` is outside the boundary or inside an obstacle.
    #[must_use]
    pub fn is_blocked_by_obstacles(&self, position: Vec2) -> bool {
        self.obstacles.is_blocked(position)
    }

    // -------------------------------------------------------------------------
    // Tick
    // -------------------------------------------------------------------------

    /// Queues an external event, applied ahead of entity events next tick.
    pub fn push_event(&mut self, event: Event) {
        self.pending.push(event);
    }

    /// Advances the simulation by one tick.
    ///
    /// Entity updates run in parallel, but their events are sorted by
    /// (origin, sequence) before the apply phase, so the outcome does not
    /// depend on thread scheduling.
    pub fn step(&mut self) -> TickReport {
        let tick = self.current.current_tick();

        // SNAPSHOT: next starts as a copy of the committed state
        self.next.clone_from(&self.current);

        // UPDATE
        let mut queue = EventQueue::new();
        let mut external = EventSink::new(EventOrigin::External, tick);
        for event in self.pending.drain(..) {
            external.push(event);
        }
        queue.extend_from_sink(external);

        let view = WorldView::new(&self.current, &self.players, &self.obstacles, &self.config);

        let unit_sinks: Vec<EventSink> = self
            .next
            .par_units_mut()
            .map(|(id, unit)| {
                let mut sink = EventSink::new(EventOrigin::Unit(*id), tick);
                unit.update(&view, tick, &mut sink);
                sink
            })
            .collect();
        let bullet_sinks: Vec<EventSink> = self
            .next
            .par_bullets_mut()
            .map(|(id, bullet)| {
                let mut sink = EventSink::new(EventOrigin::Bullet(*id), tick);
                bullet.update(&view, tick, &mut sink);
                sink
            })
            .collect();

        for sink in unit_sinks.into_iter().chain(bullet_sinks) {
            queue.extend_from_sink(sink);
        }
        queue.sort_for_apply();

        // APPLY
        let applied = resolver::resolve(queue.drain(), &mut self.next, &self.config);

        // SWAP
        std::mem::swap(&mut self.current, &mut self.next);
        self.current.advance_tick();

        trace!(
            tick,
            events = applied.events.len(),
            dropped = applied.dropped,
            destroyed = applied.destroyed.len(),
            "tick applied"
        );

        TickReport {
            tick,
            events: applied.events,
            dropped: applied.dropped,
            spawned: applied.spawned,
            destroyed: applied.destroyed,
        }
    }

    // -------------------------------------------------------------------------
    // Render
    // -------------------------------------------------------------------------

    /// Draws every unit, then every bullet, from the committed state.
    pub fn render(&self, renderer: &mut dyn Renderer, models: &mut ModelRegistry) {
        for (_, unit) in self.current.units() {
            let body = unit.body();
            let mut ctx = RenderContext::new(
                &mut *renderer,
                &mut *models,
                body.position,
                body.rotation,
                self.get_player_color(unit.player_id()),
            );
            unit.inner().render(&mut ctx);
        }
        for (_, bullet) in self.current.bullets() {
            let body = bullet.body();
            let mut ctx = RenderContext::new(
                &mut *renderer,
                &mut *models,
                body.position,
                body.rotation,
                self.get_player_color(body.player),
            );
            bullet.inner().render(&mut ctx);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Returns the committed arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.current
    }

    /// Returns the committed arena for scenario setup between ticks.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.current
    }

    /// Returns a read-only view of the committed state.
    #[must_use]
    pub fn world_view(&self) -> WorldView<'_> {
        WorldView::new(&self.current, &self.players, &self.obstacles, &self.config)
    }

    /// Returns the number of completed ticks.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.current.current_tick()
    }

    /// Returns the seed of the spawn-point generator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Returns the unit type registry.
    #[must_use]
    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    /// Returns the unit type registry for registering extra unit types.
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut UnitRegistry {
        &mut self.registry
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Keys;

    fn core() -> GameCore {
        GameCore::new(GameConfig::default(), 42)
    }

    mod player_tests {
        use super::*;

        #[test]
        fn ids_are_sequential() {
            let mut core = core();
            assert_eq!(core.add_player(), PlayerId::new(0));
            assert_eq!(core.add_player(), PlayerId::new(1));
            assert_eq!(core.players().count(), 2);
        }

        #[test]
        fn set_input_unknown_player_errors() {
            let mut core = core();
            let err = core
                .set_input(PlayerId::new(9), InputData::default())
                .unwrap_err();
            assert!(matches!(err, CoreError::UnknownPlayer(id) if id == PlayerId::new(9)));
        }

        #[test]
        fn removed_player_colour_falls_back_to_white() {
            let mut core = core();
            let player = core.add_player();
            assert_ne!(core.get_player_color(player), Vec4::ONE);
            assert!(core.remove_player(player).is_some());
            assert!(core.remove_player(player).is_none());
            assert_eq!(core.get_player_color(player), Vec4::ONE);
        }
    }

    mod spawn_tests {
        use super::*;

        #[test]
        fn spawn_uses_unit_max_health() {
            let mut core = core();
            let player = core.add_player();
            let id = core
                .spawn_unit(UnitTag::CollisionTank, player, Vec2::ONE, 0.5)
                .unwrap();
            let body = core.arena().unit(id).unwrap().body();
            assert_eq!(body.position, Vec2::ONE);
            assert_eq!(body.rotation, 0.5);
            assert_eq!(body.health, core.config().collision_tank.max_health);
        }

        #[test]
        fn spawn_requires_player() {
            let mut core = core();
            let result = core.spawn_unit(UnitTag::TinyTank, PlayerId::new(3), Vec2::ZERO, 0.0);
            assert!(matches!(result, Err(CoreError::UnknownPlayer(_))));
        }

        #[test]
        fn spawn_by_name() {
            let mut core = core();
            let player = core.add_player();
            let id = core
                .spawn_unit_by_name("Collision Tank", player, Vec2::ZERO, 0.0)
                .unwrap();
            assert_eq!(core.arena().unit(id).unwrap().tag(), UnitTag::CollisionTank);

            let err = core
                .spawn_unit_by_name("Hover Tank", player, Vec2::ZERO, 0.0)
                .unwrap_err();
            assert!(matches!(err, CoreError::UnknownUnitType(name) if name == "Hover Tank"));
        }

        #[test]
        fn despawn_between_ticks() {
            let mut core = core();
            let player = core.add_player();
            let id = core
                .spawn_unit(UnitTag::TinyTank, player, Vec2::ZERO, 0.0)
                .unwrap();

            let unit = core.despawn_unit(id).unwrap();
            assert_eq!(unit.id(), id);
            assert!(matches!(core.despawn_unit(id), Err(CoreError::UnknownUnit(u)) if u == id));
        }

        #[test]
        fn random_spawn_avoids_obstacles() {
            let mut core = core();
            core.add_obstacle(Obstacle::block(Vec2::ZERO, Vec2::splat(5.0)));
            for _ in 0..50 {
                let p = core.random_spawn_position().unwrap();
                assert!(!core.is_blocked_by_obstacles(p));
            }
        }

        #[test]
        fn random_spawn_gives_up_when_everything_is_blocked() {
            let mut core = core();
            core.add_obstacle(Obstacle::block(Vec2::ZERO, Vec2::splat(11.0)));
            let err = core.random_spawn_position().unwrap_err();
            assert!(matches!(err, CoreError::NoSpawnPosition { attempts: 64 }));
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_advances_tick() {
            let mut core = core();
            let report = core.step();
            assert_eq!(report.tick, 0);
            assert_eq!(core.tick(), 1);
            assert_eq!(core.step().tick, 1);
        }

        #[test]
        fn external_events_apply_first() {
            let mut core = core();
            let player = core.add_player();
            let id = core
                .spawn_unit(UnitTag::TinyTank, player, Vec2::ZERO, 0.0)
                .unwrap();
            core.push_event(Event::DealDamage {
                target: id,
                source: id,
                amount: 25.0,
            });

            let report = core.step();
            assert_eq!(report.events[0].origin, EventOrigin::External);
            assert_eq!(core.arena().unit(id).unwrap().body().health, 75.0);

            let report = core.step();
            assert!(report
                .events
                .iter()
                .all(|q| q.origin != EventOrigin::External));
        }

        #[test]
        fn removing_unit_externally() {
            let mut core = core();
            let player = core.add_player();
            let id = core
                .spawn_unit(UnitTag::CollisionTank, player, Vec2::ZERO, 0.0)
                .unwrap();
            core.push_event(Event::RemoveUnit { unit: id });
            let report = core.step();
            assert!(core.arena().unit(id).is_none());
            assert!(report.destroyed.is_empty());
        }

        #[test]
        fn tiny_tank_fires_and_bullet_flies() {
            let mut core = core();
            let player = core.add_player();
            core.spawn_unit(UnitTag::TinyTank, player, Vec2::ZERO, 0.0)
                .unwrap();
            core.set_input(player, InputData::new(Keys::FIRE, Vec2::new(0.0, 5.0)))
                .unwrap();

            let report = core.step();
            assert_eq!(report.spawned.len(), 1);
            let bullet = report.spawned[0];
            let start = core.arena().bullet(bullet).unwrap().body().position;

            core.set_input(player, InputData::default()).unwrap();
            core.step();
            let moved = core.arena().bullet(bullet).unwrap().body().position;
            assert!(moved.y > start.y);
        }
    }
}
