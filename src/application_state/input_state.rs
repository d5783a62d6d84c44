//! # Input State
//!
//! Key transition states and the per-tick snapshot built from them.

use std::collections::HashMap;
use winit::keyboard::KeyCode;

/// Represents the state of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RawInputState {
    /// Key is not pressed
    #[default]
    NotPressed,
    /// Key was just pressed this tick
    Pressed,
    /// Key has been held down across ticks
    Held,
    /// Key was just released this tick
    Released,
}

impl RawInputState {
    /// Determines if the input is actively down (either pressed or held)
    pub fn is_active(&self) -> bool {
        matches!(self, RawInputState::Pressed | RawInputState::Held)
    }

    /// Determines if the input was just pressed this tick
    pub fn is_just_pressed(&self) -> bool {
        matches!(self, RawInputState::Pressed)
    }

    /// Derives the transition from the previous and current down states
    pub fn from_raw_states(previous: bool, current: bool) -> Self {
        match (previous, current) {
            (false, true) => RawInputState::Pressed,
            (true, true) => RawInputState::Held,
            (true, false) => RawInputState::Released,
            (false, false) => RawInputState::NotPressed,
        }
    }
}

/// A snapshot of key transitions and mouse motion for one tick.
#[derive(Debug, Clone, Default)]
pub struct ProcessedInputState {
    /// Transition state of every tracked key
    pub keyboard_states: HashMap<KeyCode, RawInputState>,

    /// Mouse movement accumulated since the previous tick (x, y)
    pub mouse_delta: Option<(f64, f64)>,
}

impl ProcessedInputState {
    /// Gets the state of a keyboard key; untracked keys read as not pressed
    pub fn get_key_state(&self, key: KeyCode) -> RawInputState {
        self.keyboard_states.get(&key).copied().unwrap_or_default()
    }

    /// Gets the mouse movement since the previous tick
    pub fn get_mouse_delta(&self) -> Option<(f64, f64)> {
        self.mouse_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_follow_previous_and_current_state() {
        assert_eq!(RawInputState::from_raw_states(false, true), RawInputState::Pressed);
        assert_eq!(RawInputState::from_raw_states(true, true), RawInputState::Held);
        assert_eq!(RawInputState::from_raw_states(true, false), RawInputState::Released);
        assert_eq!(RawInputState::from_raw_states(false, false), RawInputState::NotPressed);
    }

    #[test]
    fn only_pressed_is_an_edge() {
        assert!(RawInputState::Pressed.is_just_pressed());
        assert!(!RawInputState::Held.is_just_pressed());
        assert!(RawInputState::Held.is_active());
        assert!(!RawInputState::Released.is_active());
    }
}
