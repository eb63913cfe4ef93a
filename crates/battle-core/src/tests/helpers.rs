//! Test fixtures for exercising units and bullets outside the tick loop.
//!
//! `World` owns the same pieces a [`WorldView`] borrows, so a test can build
//! a scenario, clone it as the frozen snapshot and run one entity's update
//! against it.

use glam::Vec2;
use std::collections::BTreeMap;
use std::sync::Once;

use crate::arena::Arena;
use crate::config::GameConfig;
use crate::entity::{Body, PlayerId, UnitId};
use crate::event::Event;
use crate::obstacle::ObstacleMap;
use crate::player::{InputData, Keys, Player};
use crate::unit::{UnitBehavior, UnitRegistry, UnitTag};
use crate::world_view::WorldView;

// =============================================================================
// World Fixture
// =============================================================================

/// Owned world state for single-entity tests.
#[derive(Debug, Clone)]
pub struct World {
    pub arena: Arena,
    pub players: BTreeMap<PlayerId, Player>,
    pub obstacles: ObstacleMap,
    pub config: GameConfig,
    next_player: u64,
}

impl World {
    /// Empty world with the default configuration.
    pub fn new() -> Self {
        let config = GameConfig::default();
        Self {
            arena: Arena::new(),
            players: BTreeMap::new(),
            obstacles: ObstacleMap::new(config.boundary),
            config,
            next_player: 0,
        }
    }

    pub fn view(&self) -> WorldView<'_> {
        WorldView::new(&self.arena, &self.players, &self.obstacles, &self.config)
    }

    /// Connects a player with no input held.
    pub fn add_player(&mut self) -> PlayerId {
        let id = PlayerId::new(self.next_player);
        self.next_player += 1;
        self.players.insert(id, Player::new(id));
        id
    }

    /// Spawns a unit at full health. The owner does not have to be connected.
    pub fn spawn(&mut self, tag: UnitTag, player: PlayerId, position: Vec2, rotation: f32) -> UnitId {
        let inner = UnitRegistry::with_builtin_units()
            .create(tag, &self.config)
            .expect("built-in unit type");
        let body = Body::new(position, rotation, inner.max_health());
        self.arena.spawn_unit(player, body, inner)
    }

    /// Adds `keys` to the player's held keys.
    pub fn press(&mut self, player: PlayerId, keys: Keys) {
        let p = self.players.get_mut(&player).expect("connected player");
        let input = *p.input_data();
        p.set_input_data(InputData::new(input.keys | keys, input.mouse_cursor_position));
    }

    /// Moves the player's cursor.
    pub fn aim(&mut self, player: PlayerId, cursor: Vec2) {
        let p = self.players.get_mut(&player).expect("connected player");
        let keys = p.input_data().keys;
        p.set_input_data(InputData::new(keys, cursor));
    }
}

// =============================================================================
// Event Helpers
// =============================================================================

/// Extracts `(target, source, amount)` from every `DealDamage` in push order.
pub fn damage_events(events: &[Event]) -> Vec<(UnitId, UnitId, f32)> {
    events
        .iter()
        .filter_map(|e| match *e {
            Event::DealDamage {
                target,
                source,
                amount,
            } => Some((target, source, amount)),
            _ => None,
        })
        .collect()
}

/// Installs a `tracing` subscriber that writes through the test harness.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .try_init();
    });
}
