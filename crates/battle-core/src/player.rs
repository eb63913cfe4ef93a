//! Players and their per-tick input snapshot.
//!
//! Input arrives from the window layer as pre-sampled boolean arrays indexed
//! by GLFW key and mouse-button codes. [`InputData::from_glfw`] folds those
//! into a compact [`Keys`] set once per tick; units only ever read the set.

use bitflags::bitflags;
use glam::{Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::entity::PlayerId;

/// GLFW key code for `W`.
pub const GLFW_KEY_W: usize = 87;
/// GLFW key code for `S`.
pub const GLFW_KEY_S: usize = 83;
/// GLFW key code for `A`.
pub const GLFW_KEY_A: usize = 65;
/// GLFW key code for `D`.
pub const GLFW_KEY_D: usize = 68;
/// GLFW key code for `Q`.
pub const GLFW_KEY_Q: usize = 81;
/// GLFW code for the left mouse button.
pub const GLFW_MOUSE_BUTTON_LEFT: usize = 0;

bitflags! {
    /// Control keys held during a tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Keys: u8 {
        /// Drive forward (`W`).
        const FORWARD = 1 << 0;
        /// Drive backward (`S`).
        const BACKWARD = 1 << 1;
        /// Turn counter-clockwise (`A`).
        const TURN_LEFT = 1 << 2;
        /// Turn clockwise (`D`).
        const TURN_RIGHT = 1 << 3;
        /// Modifier: brake hard instead of drifting (`Q`).
        const BRAKE = 1 << 4;
        /// Primary fire (left mouse button).
        const FIRE = 1 << 5;
    }
}

/// Input snapshot for one player, refreshed once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputData {
    /// Keys held this tick.
    pub keys: Keys,
    /// Cursor position in world space.
    pub mouse_cursor_position: Vec2,
}

impl InputData {
    /// Creates an input snapshot.
    #[must_use]
    pub const fn new(keys: Keys, mouse_cursor_position: Vec2) -> Self {
        Self {
            keys,
            mouse_cursor_position,
        }
    }

    /// Builds a snapshot from GLFW-indexed key and mouse-button arrays.
    ///
    /// Codes beyond the end of either array read as released.
    #[must_use]
    pub fn from_glfw(key_down: &[bool], mouse_button_down: &[bool], cursor: Vec2) -> Self {
        let pressed = |codes: &[bool], code: usize| codes.get(code).copied().unwrap_or(false);

        let mut keys = Keys::empty();
        keys.set(Keys::FORWARD, pressed(key_down, GLFW_KEY_W));
        keys.set(Keys::BACKWARD, pressed(key_down, GLFW_KEY_S));
        keys.set(Keys::TURN_LEFT, pressed(key_down, GLFW_KEY_A));
        keys.set(Keys::TURN_RIGHT, pressed(key_down, GLFW_KEY_D));
        keys.set(Keys::BRAKE, pressed(key_down, GLFW_KEY_Q));
        keys.set(
            Keys::FIRE,
            pressed(mouse_button_down, GLFW_MOUSE_BUTTON_LEFT),
        );

        Self::new(keys, cursor)
    }

    /// Returns `true` if every key in `keys` is held.
    #[must_use]
    pub fn is_down(&self, keys: Keys) -> bool {
        self.keys.contains(keys)
    }
}

const PALETTE: [Vec4; 6] = [
    Vec4::new(1.0, 0.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 0.0, 1.0, 1.0),
    Vec4::new(1.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 1.0, 1.0),
    Vec4::new(1.0, 0.0, 1.0, 1.0),
];

/// A connected player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    id: PlayerId,
    color: Vec4,
    input: InputData,
}

impl Player {
    /// Creates a player with no input and a palette colour chosen by id.
    #[must_use]
    pub fn new(id: PlayerId) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let color = PALETTE[(id.as_u64() % PALETTE.len() as u64) as usize];
        Self {
            id,
            color,
            input: InputData::default(),
        }
    }

    /// Returns the player id.
    #[must_use]
    pub const fn id(&self) -> PlayerId {
        self.id
    }

    /// Returns the player's tint colour.
    #[must_use]
    pub const fn color(&self) -> Vec4 {
        self.color
    }

    /// Returns the current input snapshot.
    #[must_use]
    pub const fn input_data(&self) -> &InputData {
        &self.input
    }

    /// Replaces the input snapshot.
    pub fn set_input_data(&mut self, input: InputData) {
        self.input = input;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_glfw_maps_codes() {
        let mut key_down = vec![false; 512];
        key_down[GLFW_KEY_W] = true;
        key_down[GLFW_KEY_D] = true;
        key_down[GLFW_KEY_Q] = true;
        let mouse = [true, false, false];

        let input = InputData::from_glfw(&key_down, &mouse, Vec2::new(1.0, 2.0));
        assert!(input.is_down(Keys::FORWARD | Keys::TURN_RIGHT | Keys::BRAKE | Keys::FIRE));
        assert!(!input.is_down(Keys::BACKWARD));
        assert!(!input.is_down(Keys::TURN_LEFT));
        assert_eq!(input.mouse_cursor_position, Vec2::new(1.0, 2.0));
    }

    #[test]
    fn from_glfw_short_arrays_read_released() {
        let input = InputData::from_glfw(&[true; 10], &[], Vec2::ZERO);
        assert!(input.keys.is_empty());
    }

    #[test]
    fn palette_cycles_by_id() {
        let a = Player::new(PlayerId::new(1));
        let b = Player::new(PlayerId::new(7));
        assert_eq!(a.color(), b.color());
        assert_ne!(a.color(), Player::new(PlayerId::new(2)).color());
    }

    #[test]
    fn input_replacement() {
        let mut player = Player::new(PlayerId::new(0));
        assert!(player.input_data().keys.is_empty());
        player.set_input_data(InputData::new(Keys::FIRE, Vec2::ONE));
        assert!(player.input_data().is_down(Keys::FIRE));
    }

    #[test]
    fn keys_serialization_roundtrip() {
        let keys = Keys::FORWARD | Keys::BRAKE;
        let json = serde_json::to_string(&keys).unwrap();
        let back: Keys = serde_json::from_str(&json).unwrap();
        assert_eq!(keys, back);
    }
}
