//! Apply phase: turns the sorted event queue into state mutations.
//!
//! The resolver is the only writer of unit bodies and bullet bodies during a
//! tick. It walks the queue strictly in order:
//!
//! - `MoveUnit`, `RotateUnit`, `DealDamage` and `MoveBullet` mutate their
//!   target in place.
//! - `RemoveUnit` and `RemoveBullet` despawn immediately, so any later event
//!   in the same batch that names the removed id is stale.
//! - `GenerateBullet` spawns a bullet, provided its shooter still exists.
//!
//! An event whose target no longer exists is dropped and counted; the tick
//! never fails. Once the whole batch is applied, every unit whose health has
//! reached zero is removed, so two units that kill each other in the same
//! tick both receive their full damage before either disappears.
//!
//! # Example
//!
//! ```
//! use battle_core::arena::Arena;
//! use battle_core::config::GameConfig;
//! use battle_core::entity::{Body, PlayerId, UnitId};
//! use battle_core::event::{EventOrigin, EventSink};
//! use battle_core::resolver;
//! use battle_core::unit::{TinyTank, UnitInner};
//! use glam::Vec2;
//!
//! let config = GameConfig::default();
//! let mut arena = Arena::new();
//! let tank = arena.spawn_unit(
//!     PlayerId::new(0),
//!     Body::new(Vec2::ZERO, 0.0, 100.0),
//!     UnitInner::TinyTank(TinyTank::new(&config)),
//! );
//!
//! let mut sink = EventSink::new(EventOrigin::External, 0);
//! sink.push_deal_damage(tank, tank, 30.0);
//! sink.push_move_unit(UnitId::new(99), Vec2::ONE);
//!
//! let report = resolver::resolve(sink.into_events(), &mut arena, &config);
//! assert_eq!(report.dropped, 1);
//! assert_eq!(arena.unit(tank).unwrap().body().health, 70.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::arena::Arena;
use crate::bullet::{BulletBody, BulletInner};
use crate::config::GameConfig;
use crate::entity::{BulletId, UnitId};
use crate::event::{Event, QueuedEvent};

/// Outcome of one apply phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplyReport {
    /// Every event processed, in apply order, including dropped ones.
    pub events: Vec<QueuedEvent>,
    /// Number of events dropped because their target no longer existed.
    pub dropped: usize,
    /// Bullets spawned by `GenerateBullet`.
    pub spawned: Vec<BulletId>,
    /// Units removed because their health ran out, in id order.
    pub destroyed: Vec<UnitId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Applied,
    Spawned(BulletId),
    Stale,
}

/// Applies `events` to `arena` in order, then removes defeated units.
pub fn resolve<I>(events: I, arena: &mut Arena, config: &GameConfig) -> ApplyReport
where
    I: IntoIterator<Item = QueuedEvent>,
{
    let mut report = ApplyReport::default();

    for queued in events {
        match apply_event(&queued.event, arena, config) {
            Outcome::Applied => {}
            Outcome::Spawned(id) => report.spawned.push(id),
            Outcome::Stale => {
                trace!(
                    event = queued.event.name(),
                    origin = %queued.origin,
                    sequence = queued.sequence,
                    "dropped stale event"
                );
                report.dropped += 1;
            }
        }
        report.events.push(queued);
    }

    for id in arena.defeated_units() {
        if let Some(unit) = arena.despawn_unit(id) {
            debug!(unit = %id, player = %unit.player_id(), health = unit.body().health, "unit destroyed");
            report.destroyed.push(id);
        }
    }

    report
}

fn apply_event(event: &Event, arena: &mut Arena, config: &GameConfig) -> Outcome {
    match *event {
        Event::MoveUnit { unit, position } => match arena.unit_mut(unit) {
            Some(u) => {
                u.body_mut().position = position;
                Outcome::Applied
            }
            None => Outcome::Stale,
        },
        Event::RotateUnit { unit, rotation } => match arena.unit_mut(unit) {
            Some(u) => {
                u.body_mut().rotation = rotation;
                Outcome::Applied
            }
            None => Outcome::Stale,
        },
        Event::DealDamage { target, amount, .. } => match arena.unit_mut(target) {
            Some(u) => {
                u.body_mut().health -= amount;
                Outcome::Applied
            }
            None => Outcome::Stale,
        },
        Event::RemoveUnit { unit } => match arena.despawn_unit(unit) {
            Some(_) => {
                debug!(%unit, "unit removed");
                Outcome::Applied
            }
            None => Outcome::Stale,
        },
        Event::GenerateBullet {
            kind,
            unit,
            player,
            position,
            rotation,
            damage_scale,
            velocity,
        } => {
            if arena.unit(unit).is_none() {
                return Outcome::Stale;
            }
            let body = BulletBody {
                shooter: unit,
                player,
                position,
                rotation,
                damage_scale,
                velocity,
            };
            let id = arena.spawn_bullet(body, BulletInner::from_tag(kind, config));
            trace!(bullet = %id, %kind, shooter = %unit, "bullet spawned");
            Outcome::Spawned(id)
        }
        Event::MoveBullet { bullet, position } => match arena.bullet_mut(bullet) {
            Some(b) => {
                b.body_mut().position = position;
                Outcome::Applied
            }
            None => Outcome::Stale,
        },
        Event::RemoveBullet { bullet } => match arena.despawn_bullet(bullet) {
            Some(_) => Outcome::Applied,
            None => Outcome::Stale,
        },
    }
}

// =============================================================================
// Tests
// =============================================================================
