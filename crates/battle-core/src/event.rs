//! Deferred mutations emitted during the update phase.
//!
//! Entities never write to each other directly. Every cross-entity effect
//! (movement, turning, damage, spawning and removing bullets) is pushed as an
//! [`Event`] into the entity's own [`EventSink`]. After all entities have
//! updated, the sinks are merged into one [`EventQueue`], sorted into a
//! deterministic order and handed to the [`resolver`](crate::resolver).
//!
//! # Ordering
//!
//! Each queued event carries an [`EventOrigin`] and a per-origin sequence
//! number. Sorting by `(origin, sequence)` yields:
//!
//! 1. externally pushed events, in push order;
//! 2. unit events, by unit id, then push order;
//! 3. bullet events, by bullet id, then push order.
//!
//! This is exactly the order a single-threaded pass over units and then
//! bullets in id order would produce, so the parallel update is
//! indistinguishable from a sequential one.
//!
//! # Example
//!
//! ```
//! use battle_core::entity::UnitId;
//! use battle_core::event::{Event, EventOrigin, EventQueue, EventSink};
//! use glam::Vec2;
//!
//! let mut late = EventSink::new(EventOrigin::Unit(UnitId::new(2)), 0);
//! late.push_rotate_unit(UnitId::new(2), 1.0);
//!
//! let mut early = EventSink::new(EventOrigin::Unit(UnitId::new(1)), 0);
//! early.push_move_unit(UnitId::new(1), Vec2::new(0.0, 1.0));
//!
//! let mut queue = EventQueue::new();
//! queue.extend_from_sink(late);
//! queue.extend_from_sink(early);
//! queue.sort_for_apply();
//!
//! let events: Vec<_> = queue.drain().map(|q| q.event).collect();
//! assert!(matches!(events[0], Event::MoveUnit { .. }));
//! assert!(matches!(events[1], Event::RotateUnit { .. }));
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bullet::BulletTag;
use crate::entity::{BulletId, PlayerId, UnitId};

// =============================================================================
// Event
// =============================================================================

/// A deferred mutation of the world.
///
/// Events are applied strictly in queue order. An event whose target no
/// longer exists when it is applied is dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// Set a unit's position.
    MoveUnit {
        /// Unit to move.
        unit: UnitId,
        /// New world position.
        position: Vec2,
    },
    /// Set a unit's body rotation.
    RotateUnit {
        /// Unit to turn.
        unit: UnitId,
        /// New rotation in radians.
        rotation: f32,
    },
    /// Subtract health from a unit.
    DealDamage {
        /// Unit receiving the damage.
        target: UnitId,
        /// Unit credited with the damage.
        source: UnitId,
        /// Health to subtract.
        amount: f32,
    },
    /// Remove a unit immediately.
    RemoveUnit {
        /// Unit to remove.
        unit: UnitId,
    },
    /// Spawn a bullet.
    GenerateBullet {
        /// Bullet type to create.
        kind: BulletTag,
        /// Unit that fired it.
        unit: UnitId,
        /// Owner of the firing unit.
        player: PlayerId,
        /// Spawn position.
        position: Vec2,
        /// Spawn rotation in radians.
        rotation: f32,
        /// Multiplier on the bullet's base damage.
        damage_scale: f32,
        /// Velocity in world units per second.
        velocity: Vec2,
    },
    /// Set a bullet's position.
    MoveBullet {
        /// Bullet to move.
        bullet: BulletId,
        /// New world position.
        position: Vec2,
    },
    /// Remove a bullet immediately.
    RemoveBullet {
        /// Bullet to remove.
        bullet: BulletId,
    },
}

impl Event {
    /// Short name of the variant, used in log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MoveUnit { .. } => "MoveUnit",
            Self::RotateUnit { .. } => "RotateUnit",
            Self::DealDamage { .. } => "DealDamage",
            Self::RemoveUnit { .. } => "RemoveUnit",
            Self::GenerateBullet { .. } => "GenerateBullet",
            Self::MoveBullet { .. } => "MoveBullet",
            Self::RemoveBullet { .. } => "RemoveBullet",
        }
    }
}

// =============================================================================
// Origin & Queued Event
// =============================================================================

/// Where an event came from.
///
/// The derived ordering (`External` < `Unit` < `Bullet`, then by id) is the
/// apply order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventOrigin {
    /// Pushed from outside the tick through
    /// [`GameCore::push_event`](crate::game_core::GameCore::push_event).
    External,
    /// Pushed by a unit during its update.
    Unit(UnitId),
    /// Pushed by a bullet during its update.
    Bullet(BulletId),
}

impl fmt::Display for EventOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Unit(id) => write!(f, "unit:{id}"),
            Self::Bullet(id) => write!(f, "bullet:{id}"),
        }
    }
}

/// An event plus the metadata that fixes its place in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedEvent {
    /// The mutation itself.
    pub event: Event,
    /// Who pushed it.
    pub origin: EventOrigin,
    /// Tick during which it was pushed.
    pub tick: u64,
    /// Push index within `origin` for this tick.
    pub sequence: u32,
}

// =============================================================================
// Event Sink
// =============================================================================

/// Per-entity push surface handed to `update`.
///
/// Pushing only records the event; nothing in the world changes until the
/// apply phase.
#[derive(Debug, Clone)]
pub struct EventSink {
    origin: EventOrigin,
    tick: u64,
    events: Vec<QueuedEvent>,
}

impl EventSink {
    /// Creates an empty sink for `origin` at `tick`.
    #[must_use]
    pub fn new(origin: EventOrigin, tick: u64) -> Self {
        Self {
            origin,
            tick,
            events: Vec::new(),
        }
    }

    /// Returns the origin stamped on every pushed event.
    #[must_use]
    pub const fn origin(&self) -> EventOrigin {
        self.origin
    }

    /// Records an event.
    pub fn push(&mut self, event: Event) {
        // A single entity pushes a handful of events per tick.
        #[allow(clippy::cast_possible_truncation)]
        let sequence = self.events.len() as u32;
        self.events.push(QueuedEvent {
            event,
            origin: self.origin,
            tick: self.tick,
            sequence,
        });
    }

    /// Records [`Event::MoveUnit`].
    pub fn push_move_unit(&mut self, unit: UnitId, position: Vec2) {
        self.push(Event::MoveUnit { unit, position });
    }

    /// Records [`Event::RotateUnit`].
    pub fn push_rotate_unit(&mut self, unit: UnitId, rotation: f32) {
        self.push(Event::RotateUnit { unit, rotation });
    }

    /// Records [`Event::DealDamage`].
    pub fn push_deal_damage(&mut self, target: UnitId, source: UnitId, amount: f32) {
        self.push(Event::DealDamage {
            target,
            source,
            amount,
        });
    }

    /// Records [`Event::RemoveUnit`].
    pub fn push_remove_unit(&mut self, unit: UnitId) {
        self.push(Event::RemoveUnit { unit });
    }

    /// Records [`Event::GenerateBullet`].
    #[allow(clippy::too_many_arguments)]
    pub fn push_generate_bullet(
        &mut self,
        kind: BulletTag,
        unit: UnitId,
        player: PlayerId,
        position: Vec2,
        rotation: f32,
        damage_scale: f32,
        velocity: Vec2,
    ) {
        self.push(Event::GenerateBullet {
            kind,
            unit,
            player,
            position,
            rotation,
            damage_scale,
            velocity,
        });
    }

    /// Records [`Event::MoveBullet`].
    pub fn push_move_bullet(&mut self, bullet: BulletId, position: Vec2) {
        self.push(Event::MoveBullet { bullet, position });
    }

    /// Records [`Event::RemoveBullet`].
    pub fn push_remove_bullet(&mut self, bullet: BulletId) {
        self.push(Event::RemoveBullet { bullet });
    }

    /// Returns the recorded events in push order.
    #[must_use]
    pub fn events(&self) -> &[QueuedEvent] {
        &self.events
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if nothing was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consumes the sink, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<QueuedEvent> {
        self.events
    }
}

// =============================================================================
// Event Queue
// =============================================================================

/// Ordered queue of one tick's events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventQueue {
    events: Vec<QueuedEvent>,
}

impl EventQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every event recorded by `sink`.
    pub fn extend_from_sink(&mut self, sink: EventSink) {
        self.events.extend(sink.into_events());
    }

    /// Sorts into apply order: by origin, then by push sequence.
    pub fn sort_for_apply(&mut self) {
        self.events
            .sort_by(|a, b| a.origin.cmp(&b.origin).then(a.sequence.cmp(&b.sequence)));
    }

    /// Returns the queued events in their current order.
    #[must_use]
    pub fn events(&self) -> &[QueuedEvent] {
        &self.events
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Removes and yields every queued event in order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, QueuedEvent> {
        self.events.drain(..)
    }
}

// =============================================================================
// Tests
// =============================================================================
