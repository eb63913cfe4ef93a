//! Projectiles fired by units.
//!
//! Bullets follow the same contract as units: the authoritative transform
//! lives in a [`BulletBody`] that only the apply phase writes, while the
//! concrete behavior reads the frozen world and pushes events.

mod cannon_ball;

pub use cannon_ball::CannonBall;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::GameConfig;
use crate::entity::{BulletId, PlayerId, UnitId};
use crate::event::EventSink;
use crate::render::RenderContext;
use crate::world_view::WorldView;

// =============================================================================
// Behavior Contract
// =============================================================================

/// Read-only inputs to [`BulletBehavior::update`].
#[derive(Debug, Clone, Copy)]
pub struct BulletContext<'a> {
    /// The bullet being updated.
    pub id: BulletId,
    /// Its committed state from the previous tick.
    pub body: &'a BulletBody,
    /// Tick being simulated.
    pub tick: u64,
}

/// Capability contract of every bullet type.
pub trait BulletBehavior {
    /// Advances private state and pushes this tick's events.
    fn update(&mut self, ctx: &BulletContext<'_>, view: &WorldView<'_>, events: &mut EventSink);

    /// Draws the bullet at `ctx.position`.
    fn render(&self, ctx: &mut RenderContext<'_>);

    /// Display name.
    fn bullet_name(&self) -> &'static str;
}

// =============================================================================
// Tag & Inner
// =============================================================================

/// Bullet type discriminator, carried by [`Event::GenerateBullet`](crate::event::Event::GenerateBullet).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BulletTag {
    /// Straight-flying shell that damages the first enemy it touches.
    CannonBall,
}

impl fmt::Display for BulletTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CannonBall => write!(f, "CannonBall"),
        }
    }
}

/// Type-specific bullet state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BulletInner {
    /// See [`CannonBall`].
    CannonBall(CannonBall),
}

impl BulletInner {
    /// Builds the state for a freshly fired bullet of type `tag`.
    #[must_use]
    pub fn from_tag(tag: BulletTag, config: &GameConfig) -> Self {
        match tag {
            BulletTag::CannonBall => Self::CannonBall(CannonBall::new(&config.cannon_ball)),
        }
    }

    /// Returns the matching tag.
    #[must_use]
    pub const fn tag(&self) -> BulletTag {
        match self {
            Self::CannonBall(_) => BulletTag::CannonBall,
        }
    }
}

impl BulletBehavior for BulletInner {
    fn update(&mut self, ctx: &BulletContext<'_>, view: &WorldView<'_>, events: &mut EventSink) {
        match self {
            Self::CannonBall(b) => b.update(ctx, view, events),
        }
    }

    fn render(&self, ctx: &mut RenderContext<'_>) {
        match self {
            Self::CannonBall(b) => b.render(ctx),
        }
    }

    fn bullet_name(&self) -> &'static str {
        match self {
            Self::CannonBall(b) => b.bullet_name(),
        }
    }
}

// =============================================================================
// Bullet
// =============================================================================

/// Authoritative bullet state, written only by the apply phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BulletBody {
    /// Unit that fired the bullet; credited with its damage.
    pub shooter: UnitId,
    /// Owner of the shooter at fire time.
    pub player: PlayerId,
    /// World position.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Multiplier on base damage.
    pub damage_scale: f32,
    /// Velocity in world units per second.
    pub velocity: Vec2,
}

/// A live bullet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    id: BulletId,
    body: BulletBody,
    inner: BulletInner,
}

impl Bullet {
    /// Creates a bullet.
    #[must_use]
    pub const fn new(id: BulletId, body: BulletBody, inner: BulletInner) -> Self {
        Self { id, body, inner }
    }

    /// Returns the bullet id.
    #[must_use]
    pub const fn id(&self) -> BulletId {
        self.id
    }

    /// Returns the committed state.
    #[must_use]
    pub const fn body(&self) -> &BulletBody {
        &self.body
    }

    /// Mutable committed state, for the apply phase and setup.
    pub fn body_mut(&mut self) -> &mut BulletBody {
        &mut self.body
    }

    /// Returns the type-specific state.
    #[must_use]
    pub const fn inner(&self) -> &BulletInner {
        &self.inner
    }

    /// Returns the bullet type.
    #[must_use]
    pub const fn tag(&self) -> BulletTag {
        self.inner.tag()
    }

    /// Runs the behavior against the frozen world.
    pub fn update(&mut self, view: &WorldView<'_>, tick: u64, events: &mut EventSink) {
        let ctx = BulletContext {
            id: self.id,
            body: &self.body,
            tick,
        };
        self.inner.update(&ctx, view, events);
    }
}
