//! # Input Manager
//!
//! This module folds window and device events into per-frame input snapshots:
//! - Keyboard state for the movement keys
//! - Mouse button state for break and place
//! - Mouse movement accumulated between frames
//!
//! A key or button that goes down and back up between two frames still reports `Pressed`
//! for the next frame.

use std::collections::{HashMap, HashSet};

use winit::{
    event::{ElementState, KeyEvent, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use super::input_state::{MouseInput, ProcessedInputState, RawInputState};

const KEY_CODES: [KeyCode; 5] = [
    KeyCode::KeyW,
    KeyCode::KeyS,
    KeyCode::KeyA,
    KeyCode::KeyD,
    KeyCode::Space,
];

const MOUSE_BUTTONS: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

/// Manages the state of all input devices and processes input events.
#[derive(Debug)]
pub struct InputManager {
    /// Previous state of all tracked keyboard keys
    pub keyboard_inputs_old: HashMap<KeyCode, bool>,
    /// Current state of all tracked keyboard keys
    pub keyboard_inputs_new: HashMap<KeyCode, bool>,
    /// Keys that went down since the last frame, even if already released again
    pub keyboard_presses: HashSet<KeyCode>,

    /// Current state of mouse inputs
    pub mouse_inputs: MouseInput,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    /// Creates a new InputManager with every tracked key and button released.
    pub fn new() -> Self {
        let released_keys: HashMap<KeyCode, bool> =
            KEY_CODES.iter().map(|key| (*key, false)).collect();
        let released_buttons: HashMap<MouseButton, bool> =
            MOUSE_BUTTONS.iter().map(|button| (*button, false)).collect();

        Self {
            keyboard_inputs_old: released_keys.clone(),
            keyboard_inputs_new: released_keys,
            keyboard_presses: HashSet::new(),
            mouse_inputs: MouseInput {
                mouse_button_inputs_old: released_buttons.clone(),
                mouse_button_inputs_new: released_buttons,
                mouse_button_presses: HashSet::new(),
                mouse_delta: None,
            },
        }
    }

    /// Updates the old state with the current state to prepare for the next frame.
    pub fn move_old_states(&mut self) {
        for (key, new_state) in self.keyboard_inputs_new.iter() {
            if let Some(old_state) = self.keyboard_inputs_old.get_mut(key) {
                *old_state = *new_state;
            }
        }

        for (button, new_state) in self.mouse_inputs.mouse_button_inputs_new.iter() {
            if let Some(old_state) = self.mouse_inputs.mouse_button_inputs_old.get_mut(button) {
                *old_state = *new_state;
            }
        }
    }

    /// Processes a window event and updates internal input state.
    ///
    /// # Arguments
    /// * `event` - The window event to process
    pub fn intake_input(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state,
                        physical_key: PhysicalKey::Code(key),
                        ..
                    },
                ..
            } => self.set_key(*key, *state == ElementState::Pressed),
            WindowEvent::MouseInput { button, state, .. } => {
                self.set_mouse_button(*button, *state == ElementState::Pressed)
            }
            _ => {}
        }
    }

    /// Records whether `key` is down. Untracked keys are ignored.
    pub fn set_key(&mut self, key: KeyCode, down: bool) {
        if let Some(key_state) = self.keyboard_inputs_new.get_mut(&key) {
            // Auto-repeat reports a key that is already down; that is not a new press.
            if down && !*key_state {
                self.keyboard_presses.insert(key);
            }
            *key_state = down;
        }
    }

    /// Records whether `button` is down. Untracked buttons are ignored.
    pub fn set_mouse_button(&mut self, button: MouseButton, down: bool) {
        if let Some(button_state) = self.mouse_inputs.mouse_button_inputs_new.get_mut(&button) {
            if down && !*button_state {
                self.mouse_inputs.mouse_button_presses.insert(button);
            }
            *button_state = down;
        }
    }

    /// Adds a mouse movement to the movement accumulated for this frame.
    ///
    /// # Arguments
    /// * `delta` - The (x, y) delta of mouse movement since the last update
    pub fn intake_mouse_motion(&mut self, delta: (f64, f64)) {
        let (x, y) = self.mouse_inputs.mouse_delta.unwrap_or((0.0, 0.0));
        self.mouse_inputs.mouse_delta = Some((x + delta.0, y + delta.1));
    }

    /// Creates a processed input state from the current raw boolean states.
    ///
    /// # Returns
    /// A new `ProcessedInputState` with processed input states.
    pub fn create_processed_input_state(&self) -> ProcessedInputState {
        let keyboard_states = self
            .keyboard_inputs_new
            .iter()
            .map(|(key, &new_state)| {
                if self.keyboard_presses.contains(key) {
                    return (*key, RawInputState::Pressed);
                }
                let old_state = self.keyboard_inputs_old.get(key).copied().unwrap_or(false);
                (*key, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        let mouse_button_states = self
            .mouse_inputs
            .mouse_button_inputs_new
            .iter()
            .map(|(button, &new_state)| {
                if self.mouse_inputs.mouse_button_presses.contains(button) {
                    return (*button, RawInputState::Pressed);
                }
                let old_state = self
                    .mouse_inputs
                    .mouse_button_inputs_old
                    .get(button)
                    .copied()
                    .unwrap_or(false);
                (*button, RawInputState::from_raw_states(old_state, new_state))
            })
            .collect();

        ProcessedInputState {
            keyboard_states,
            mouse_button_states,
            mouse_delta: self.mouse_inputs.mouse_delta,
        }
    }

    /// Returns the processed input state and resets per-frame state.
    pub fn get_and_reset_processed_input(&mut self) -> ProcessedInputState {
        let processed_input = self.create_processed_input_state();
        self.reset_inputs();
        processed_input
    }

    /// Starts a new frame: current states become the previous ones, and accumulated mouse
    /// movement and latched presses are discarded.
    pub fn reset_inputs(&mut self) {
        self.move_old_states();
        self.keyboard_presses.clear();
        self.mouse_inputs.mouse_button_presses.clear();
        self.mouse_inputs.mouse_delta = None;
    }

    /// Releases every key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keyboard_inputs_new.values_mut().for_each(|down| *down = false);
        self.mouse_inputs
            .mouse_button_inputs_new
            .values_mut()
            .for_each(|down| *down = false);
        self.reset_inputs();
    }
}
