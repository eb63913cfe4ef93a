//! Simulation configuration.
//!
//! [`GameConfig`] holds the tick rate, the arena boundary and the tuning for
//! each built-in unit and bullet type. Every field has a default, so a config
//! document only needs to list the values it overrides.
//!
//! # Example
//!
//! ```
//! use battle_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "tick_rate": 30 }"#).unwrap();
//! assert_eq!(config.tick_rate, 30);
//! assert!((config.seconds_per_tick() - 1.0 / 30.0).abs() < 1e-6);
//! assert_eq!(config.collision_tank.speed_cap, 4.0);
//! ```

use std::f32::consts::PI;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{CoreError, Result};
use crate::obstacle::Bounds;

/// Tuning for the collision (ramming) tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTankConfig {
    /// Health at spawn.
    pub max_health: f32,
    /// Speed below which thrust is constant acceleration; above it thrust is
    /// constant power.
    pub speed_cap: f32,
    /// Constant-acceleration thrust (units/s²).
    pub acceleration: f32,
    /// Constant-power thrust; acceleration above the cap is `power / speed`.
    pub power: f32,
    /// Friction deceleration while coasting (units/s²).
    pub friction: f32,
    /// Friction deceleration while the brake key is held (units/s²).
    pub brake_friction: f32,
    /// Speed divisor applied when a move is blocked by an obstacle.
    pub obstacle_damping: f32,
    /// Turn rate in radians per second.
    pub rotate_angular_speed: f32,
    /// Damage dealt to the rammed unit per unit of impact speed.
    pub ram_damage_per_speed: f32,
    /// Damage taken by the rammer per unit of impact speed.
    pub ram_recoil_per_speed: f32,
    /// Collision circle radius in the local frame.
    pub hit_radius: f32,
    /// Seconds between the start of two ram pulses.
    pub pulse_interval: f32,
}

impl Default for CollisionTankConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed_cap: 4.0,
            acceleration: 6.0,
            power: 12.5,
            friction: 2.5,
            brake_friction: 10.0,
            obstacle_damping: 1.05,
            rotate_angular_speed: PI,
            ram_damage_per_speed: 20.0,
            ram_recoil_per_speed: 5.0,
            hit_radius: 1.0,
            pulse_interval: 1.0,
        }
    }
}

impl CollisionTankConfig {
    /// Speed at which constant-power thrust balances coasting friction.
    #[must_use]
    pub fn terminal_speed(&self) -> f32 {
        self.power / self.friction
    }
}

/// Tuning for the basic cannon tank.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TinyTankConfig {
    /// Health at spawn.
    pub max_health: f32,
    /// Fixed travel speed while a drive key is held (units/s).
    pub move_speed: f32,
    /// Turn rate in radians per second.
    pub rotate_angular_speed: f32,
    /// Seconds between shots.
    pub fire_interval: f32,
    /// Distance from the hull centre to the muzzle along the turret axis.
    pub muzzle_offset: f32,
    /// Muzzle velocity of fired cannon balls (units/s).
    pub bullet_speed: f32,
}

impl Default for TinyTankConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 3.0,
            rotate_angular_speed: PI,
            fire_interval: 1.0,
            muzzle_offset: 1.2,
            bullet_speed: 20.0,
        }
    }
}

/// Tuning for cannon balls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannonBallConfig {
    /// Damage on hit before the shooter's damage scale is applied.
    pub damage: f32,
}

impl Default for CannonBallConfig {
    fn default() -> Self {
        Self { damage: 10.0 }
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed update rate in ticks per second.
    pub tick_rate: u32,
    /// Playable area; everything outside counts as blocked.
    pub boundary: Bounds,
    /// How many samples [`random_spawn_position`](crate::game_core::GameCore::random_spawn_position)
    /// draws before giving up.
    pub spawn_attempts: u32,
    /// Collision tank tuning.
    pub collision_tank: CollisionTankConfig,
    /// Cannon tank tuning.
    pub tiny_tank: TinyTankConfig,
    /// Cannon ball tuning.
    pub cannon_ball: CannonBallConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            boundary: Bounds::new(Vec2::new(-10.0, -10.0), Vec2::new(10.0, 10.0)),
            spawn_attempts: 64,
            collision_tank: CollisionTankConfig::default(),
            tiny_tank: TinyTankConfig::default(),
            cannon_ball: CannonBallConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses a JSON document and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ConfigParse`] for malformed JSON and
    /// [`CoreError::InvalidConfig`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Duration of one tick in seconds.
    #[must_use]
    pub fn seconds_per_tick(&self) -> f32 {
        1.0 / self.tick_rate.max(1) as f32
    }

    /// Number of whole ticks covering `seconds`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn ticks_for(&self, seconds: f32) -> u32 {
        (seconds * self.tick_rate as f32).round().max(0.0) as u32
    }

    /// Checks that every value is usable by the simulation.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate must be positive"));
        }
        if self.boundary.min.x >= self.boundary.max.x || self.boundary.min.y >= self.boundary.max.y
        {
            return Err(invalid("boundary min must be below max on both axes"));
        }

        let tank = &self.collision_tank;
        for (name, value) in [
            ("collision_tank.max_health", tank.max_health),
            ("collision_tank.speed_cap", tank.speed_cap),
            ("collision_tank.acceleration", tank.acceleration),
            ("collision_tank.power", tank.power),
            ("collision_tank.friction", tank.friction),
            ("collision_tank.brake_friction", tank.brake_friction),
            ("collision_tank.hit_radius", tank.hit_radius),
            ("tiny_tank.max_health", self.tiny_tank.max_health),
            ("tiny_tank.bullet_speed", self.tiny_tank.bullet_speed),
            ("cannon_ball.damage", self.cannon_ball.damage),
        ] {
            if value.is_nan() || value <= 0.0 {
                return Err(invalid(&format!("{name} must be positive, got {value}")));
            }
        }

        // Zero is a usable setting for these: no turning, no cooldown, no recoil.
        for (name, value) in [
            ("collision_tank.rotate_angular_speed", tank.rotate_angular_speed),
            ("collision_tank.ram_damage_per_speed", tank.ram_damage_per_speed),
            ("collision_tank.ram_recoil_per_speed", tank.ram_recoil_per_speed),
            ("collision_tank.pulse_interval", tank.pulse_interval),
            ("tiny_tank.move_speed", self.tiny_tank.move_speed),
            ("tiny_tank.rotate_angular_speed", self.tiny_tank.rotate_angular_speed),
            ("tiny_tank.fire_interval", self.tiny_tank.fire_interval),
            ("tiny_tank.muzzle_offset", self.tiny_tank.muzzle_offset),
        ] {
            if value.is_nan() || value < 0.0 {
                return Err(invalid(&format!("{name} must not be negative, got {value}")));
            }
        }
        if self.spawn_attempts == 0 {
            return Err(invalid("spawn_attempts must be positive"));
        }
        if tank.obstacle_damping < 1.0 {
            return Err(invalid("collision_tank.obstacle_damping must be at least 1.0"));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> CoreError {
    warn!(reason = message, "rejected game config");
    CoreError::InvalidConfig(message.to_string())
}
