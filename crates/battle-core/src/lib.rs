//! # Battle Core
//!
//! Deterministic per-tick combat core for a multiplayer tank battle.
//!
//! The crate advances unit state (position, rotation, speed, health,
//! cooldowns) from sampled player input at a fixed timestep, resolves contact
//! between units, bullets and obstacles, and expresses every cross-entity
//! effect as a queued [`Event`](event::Event).
//!
//! ## Architecture
//!
//! Each tick of [`GameCore`](game_core::GameCore) runs two strict phases:
//!
//! - **Update**: every live unit and bullet reads a frozen snapshot through a
//!   [`WorldView`](world_view::WorldView) and pushes events into its own
//!   [`EventSink`](event::EventSink). Units may only change their private
//!   state (speed, cooldowns, contact bookkeeping).
//! - **Apply**: the [`resolver`] drains the merged queue in push order,
//!   mutates positions, rotations and health, then removes defeated units.
//!
//! No entity observes another entity's this-tick mutation, so update order
//! does not matter and the update phase may run in parallel.
//!
//! ## Usage
//!
//! ```
//! use battle_core::config::GameConfig;
//! use battle_core::game_core::GameCore;
//! use battle_core::unit::UnitTag;
//! use glam::Vec2;
//!
//! let mut core = GameCore::new(GameConfig::default(), 42);
//! let player = core.add_player();
//! let tank = core
//!     .spawn_unit(UnitTag::CollisionTank, player, Vec2::ZERO, 0.0)
//!     .unwrap();
//!
//! for _ in 0..10 {
//!     core.step();
//! }
//!
//! assert_eq!(core.tick(), 10);
//! assert!(core.arena().unit(tank).is_some());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arena;
pub mod bullet;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod game_core;
pub mod geometry;
pub mod obstacle;
pub mod player;
pub mod render;
pub mod resolver;
pub mod unit;
pub mod world_view;

pub use error::{CoreError, Result};
pub use game_core::{GameCore, TickReport};

#[cfg(test)]
mod tests;
