//! Units: the player-controlled entities of the battle.
//!
//! This module provides:
//! - [`UnitBehavior`]: the capability contract every unit type implements
//! - [`UnitTag`] / [`UnitInner`]: closed enum dispatch over the built-in types
//! - [`Unit`]: id, owner, committed [`Body`] and type-specific state
//! - [`UnitRegistry`]: name and tag lookup of unit factories
//!
//! # Update contract
//!
//! [`UnitBehavior::update`] receives the unit's [`Body`] by shared
//! reference. Position, rotation and health can therefore only change
//! through events; the behavior mutates nothing but its own private state
//! (speed, cooldowns, contact bookkeeping).
//!
//! # Example
//!
//! ```
//! use battle_core::config::GameConfig;
//! use battle_core::unit::{UnitBehavior, UnitRegistry, UnitTag};
//!
//! let registry = UnitRegistry::with_builtin_units();
//! let tag = registry.tag_for_name("Collision Tank").unwrap();
//! assert_eq!(tag, UnitTag::CollisionTank);
//!
//! let inner = registry.create(tag, &GameConfig::default()).unwrap();
//! assert_eq!(inner.author(), "Ljy and ZKX");
//! ```

mod collision_tank;
mod tiny_tank;

pub use collision_tank::CollisionTank;
pub use tiny_tank::TinyTank;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::GameConfig;
use crate::entity::{Body, PlayerId, UnitId};
use crate::event::EventSink;
use crate::render::RenderContext;
use crate::world_view::WorldView;

// =============================================================================
// Behavior Contract
// =============================================================================

/// Read-only inputs to [`UnitBehavior::update`].
#[derive(Debug, Clone, Copy)]
pub struct UnitContext<'a> {
    /// The unit being updated.
    pub id: UnitId,
    /// Its owner.
    pub player_id: PlayerId,
    /// Its committed body from the end of the previous tick.
    pub body: &'a Body,
    /// Tick being simulated.
    pub tick: u64,
}

/// Capability contract of every unit type.
///
/// Implementations must be deterministic: the same context, view and
/// private state always push the same events.
pub trait UnitBehavior {
    /// Advances private state and pushes this tick's events.
    fn update(&mut self, ctx: &UnitContext<'_>, view: &WorldView<'_>, events: &mut EventSink);

    /// Draws the unit at `ctx.position`.
    fn render(&self, ctx: &mut RenderContext<'_>);

    /// Returns `true` if the world-space `point` lies inside the unit whose
    /// committed body is `body`.
    fn is_hit(&self, body: &Body, point: Vec2) -> bool;

    /// Display name, also used for registry lookup.
    fn unit_name(&self) -> &'static str;

    /// Credit line.
    fn author(&self) -> &'static str;

    /// Health at spawn.
    fn max_health(&self) -> f32;

    /// Status multiplier on movement and turning.
    fn speed_scale(&self) -> f32 {
        1.0
    }

    /// Status multiplier on damage dealt by fired bullets.
    fn damage_scale(&self) -> f32 {
        1.0
    }
}

// =============================================================================
// Tag & Inner
// =============================================================================

/// Unit type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UnitTag {
    /// Basic cannon tank.
    TinyTank,
    /// Ramming tank that deals contact damage.
    CollisionTank,
}

impl fmt::Display for UnitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TinyTank => write!(f, "TinyTank"),
            Self::CollisionTank => write!(f, "CollisionTank"),
        }
    }
}

/// Type-specific unit state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UnitInner {
    /// See [`TinyTank`].
    TinyTank(TinyTank),
    /// See [`CollisionTank`].
    CollisionTank(CollisionTank),
}

impl UnitInner {
    /// Returns the matching tag.
    #[must_use]
    pub const fn tag(&self) -> UnitTag {
        match self {
            Self::TinyTank(_) => UnitTag::TinyTank,
            Self::CollisionTank(_) => UnitTag::CollisionTank,
        }
    }

    /// Returns the collision tank state, if this is one.
    #[must_use]
    pub const fn as_collision_tank(&self) -> Option<&CollisionTank> {
        match self {
            Self::CollisionTank(tank) => Some(tank),
            Self::TinyTank(_) => None,
        }
    }

    /// Returns the collision tank state mutably, if this is one.
    #[must_use]
    pub fn as_collision_tank_mut(&mut self) -> Option<&mut CollisionTank> {
        match self {
            Self::CollisionTank(tank) => Some(tank),
            Self::TinyTank(_) => None,
        }
    }

    /// Returns the tiny tank state, if this is one.
    #[must_use]
    pub const fn as_tiny_tank(&self) -> Option<&TinyTank> {
        match self {
            Self::TinyTank(tank) => Some(tank),
            Self::CollisionTank(_) => None,
        }
    }
}

impl UnitBehavior for UnitInner {
    fn update(&mut self, ctx: &UnitContext<'_>, view: &WorldView<'_>, events: &mut EventSink) {
        match self {
            Self::TinyTank(u) => u.update(ctx, view, events),
            Self::CollisionTank(u) => u.update(ctx, view, events),
        }
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        match self {
            Self::TinyTank(u) => u.render(ctx),
            Self::CollisionTank(u) => u.render(ctx),
        }
    }

    fn is_hit(&self, body: &Body, point: Vec2) -> bool {
        match self {
            Self::TinyTank(u) => u.is_hit(body, point),
            Self::CollisionTank(u) => u.is_hit(body, point),
        }
    }

    fn unit_name(&self) -> &'static str {
        match self {
            Self::TinyTank(u) => u.unit_name(),
            Self::CollisionTank(u) => u.unit_name(),
        }
    }

    fn author(&self) -> &'static str {
        match self {
            Self::TinyTank(u) => u.author(),
            Self::CollisionTank(u) => u.author(),
        }
    }

    fn max_health(&self) -> f32 {
        match self {
            Self::TinyTank(u) => u.max_health(),
            Self::CollisionTank(u) => u.max_health(),
        }
    }

    fn speed_scale(&self) -> f32 {
        match self {
            Self::TinyTank(u) => u.speed_scale(),
            Self::CollisionTank(u) => u.speed_scale(),
        }
    }

    fn damage_scale(&self) -> f32 {
        match self {
            Self::TinyTank(u) => u.damage_scale(),
            Self::CollisionTank(u) => u.damage_scale(),
        }
    }
}

// =============================================================================
// Unit
// =============================================================================

/// A live unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    id: UnitId,
    player_id: PlayerId,
    body: Body,
    inner: UnitInner,
}

impl Unit {
    /// Creates a unit.
    #[must_use]
    pub const fn new(id: UnitId, player_id: PlayerId, body: Body, inner: UnitInner) -> Self {
        Self {
            id,
            player_id,
            body,
            inner,
        }
    }

    /// Returns the unit id.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Returns the owning player.
    #[must_use]
    pub const fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Returns the committed body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Mutable body, for the apply phase and scenario setup.
    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Returns the type-specific state.
    #[must_use]
    pub const fn inner(&self) -> &UnitInner {
        &self.inner
    }

    /// Mutable type-specific state, for scenario setup.
    pub fn inner_mut(&mut self) -> &mut UnitInner {
        &mut self.inner
    }

    /// Returns the unit type.
    #[must_use]
    pub const fn tag(&self) -> UnitTag {
        self.inner.tag()
    }

    /// Hit test against the committed body.
    #[must_use]
    pub fn is_hit(&self, point: Vec2) -> bool {
        self.inner.is_hit(&self.body, point)
    }

    /// Runs the behavior against the frozen world.
    pub fn update(&mut self, view: &WorldView<'_>, tick: u64, events: &mut EventSink) {
        let ctx = UnitContext {
            id: self.id,
            player_id: self.player_id,
            body: &self.body,
            tick,
        };
        self.inner.update(&ctx, view, events);
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Builds the initial state of one unit type.
pub type UnitFactory = fn(&GameConfig) -> UnitInner;

/// One registered unit type.
#[derive(Debug, Clone, Copy)]
pub struct UnitRegistration {
    /// Type discriminator.
    pub tag: UnitTag,
    /// Display name used for lookup.
    pub name: &'static str,
    /// Constructor.
    pub factory: UnitFactory,
}

/// Lookup of unit factories by tag and by display name.
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    by_tag: BTreeMap<UnitTag, UnitRegistration>,
}

impl UnitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in unit type.
    #[must_use]
    pub fn with_builtin_units() -> Self {
        let mut registry = Self::new();
        registry.register(UnitTag::TinyTank, "Tiny Tank", |config| {
            UnitInner::TinyTank(TinyTank::new(config))
        });
        registry.register(UnitTag::CollisionTank, "Collision Tank", |config| {
            UnitInner::CollisionTank(CollisionTank::new(config))
        });
        registry
    }

    /// Registers `factory` for `tag`, replacing any earlier registration.
    pub fn register(&mut self, tag: UnitTag, name: &'static str, factory: UnitFactory) {
        self.by_tag.insert(tag, UnitRegistration { tag, name, factory });
    }

    /// Builds a unit of type `tag`, or `None` if it is not registered.
    #[must_use]
    pub fn create(&self, tag: UnitTag, config: &GameConfig) -> Option<UnitInner> {
        self.by_tag.get(&tag).map(|r| (r.factory)(config))
    }

    /// Looks up a tag by display name.
    #[must_use]
    pub fn tag_for_name(&self, name: &str) -> Option<UnitTag> {
        self.by_tag.values().find(|r| r.name == name).map(|r| r.tag)
    }

    /// Registered entries in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitRegistration> {
        self.by_tag.values()
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
