//! Error types for the outer surface of the core.
//!
//! The tick itself never fails: stale event targets and absent players are
//! handled in place. Only setup operations (configuration, spawning, input
//! assignment) return errors.

use thiserror::Error;

use crate::entity::{PlayerId, UnitId};

/// Errors returned by fallible [`GameCore`](crate::game_core::GameCore) and
/// [`GameConfig`](crate::config::GameConfig) operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The player id is not registered with the core.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// The unit id is not registered with the core.
    #[error("unknown unit {0}")]
    UnknownUnit(UnitId),

    /// No unit factory is registered under the given name.
    #[error("unknown unit type `{0}`")]
    UnknownUnitType(String),

    /// Random spawn sampling failed to find an unblocked position.
    #[error("no unblocked spawn position found after {attempts} attempts")]
    NoSpawnPosition {
        /// Number of samples drawn before giving up.
        attempts: u32,
    },

    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, CoreError>;
