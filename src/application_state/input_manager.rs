//! # Input Manager
//!
//! Tracks raw keyboard and mouse events between ticks and turns them into a
//! [`ProcessedInputState`] snapshot once per tick.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 10] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::ShiftLeft,
    KeyCode::ShiftRight,
    KeyCode::Space,
    KeyCode::Tab,
    KeyCode::KeyP,
    KeyCode::KeyB,
];

/// Manages the state of all input devices and processes input events.
#[derive(Debug)]
pub struct InputManager {
    /// Down state of every tracked key at the previous tick
    keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current down state of every tracked key
    keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Mouse motion accumulated since the previous tick
    mouse_delta: Option<(f64, f64)>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a manager with every tracked key released.
    pub fn new() -> Self {
        let released: HashMap<_, _> = KEY_CODES.iter().map(|&key| (key, false)).collect();
        Self {
            keyboard_inputs_old: released.clone(),
            keyboard_inputs_new: released,
            mouse_delta: None,
        }
    }

    /// Processes a window event and updates the key states.
    pub fn intake_input(&mut self, event: &WindowEvent) {
        if let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state,
                    physical_key: PhysicalKey::Code(key),
                    ..
                },
            ..
        } = event
        {
            if let Some(key_state) = self.keyboard_inputs_new.get_mut(key) {
                *key_state = *state == ElementState::Pressed;
            }
        }
    }

    /// Accumulates raw mouse motion.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) movement reported by the device
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Builds the snapshot for this tick and starts tracking the next one.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let processed_input = ProcessedInputState {
            keyboard_states,
            mouse_delta: self.mouse_delta.take(),
        };
        self.keyboard_inputs_old.clone_from(&self.keyboard_inputs_new);
        processed_input
    }

    /// Releases every key and drops pending mouse motion.
    ///
    /// Called when the window loses focus so no key stays stuck down.
    pub fn reset_inputs(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|down| *down = false);
        self.mouse_delta = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(manager: &mut InputManager, key: KeyCode, down: bool) {
        manager.keyboard_inputs_new.insert(key, down);
    }

    #[test]
    fn press_then_hold_then_release() {
        let mut manager = InputManager::new();
        press(&mut manager, KeyCode::Space, true);
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Space),
            RawInputState::Pressed
        );
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Space),
            RawInputState::Held
        );
        press(&mut manager, KeyCode::Space, false);
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::Space),
            RawInputState::Released
        );
    }

    #[test]
    fn mouse_motion_accumulates_until_consumed() {
        let mut manager = InputManager::new();
        manager.intake_mouse_motion((2.0, 1.0));
        manager.intake_mouse_motion((3.0, -4.0));
        assert_eq!(manager.get_and_reset_processed_input().get_mouse_delta(), Some((5.0, -3.0)));
        assert_eq!(manager.get_and_reset_processed_input().get_mouse_delta(), None);
    }

    #[test]
    fn reset_releases_held_keys() {
        let mut manager = InputManager::new();
        press(&mut manager, KeyCode::KeyW, true);
        manager.get_and_reset_processed_input();
        manager.reset_inputs();
        assert_eq!(
            manager.get_and_reset_processed_input().get_key_state(KeyCode::KeyW),
            RawInputState::Released
        );
    }
}
