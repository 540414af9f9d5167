//! Keyboard input handling and per-player control bindings.

use engine_core::DirectionalInput;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Manages keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                if self.keys_held.remove(&key) {
                    self.keys_released.insert(key);
                }
            }
        }
    }

    /// Press or release `key` so that its held state matches `held`.
    pub fn set_key(&mut self, key: KeyCode, held: bool) {
        let state = if held {
            ElementState::Pressed
        } else {
            ElementState::Released
        };
        self.process_keyboard(key, state);
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Snapshot the four directional controls of one player.
    pub fn directional(&self, bindings: &ControlBindings) -> DirectionalInput {
        DirectionalInput {
            up: self.is_key_held(bindings.up),
            down: self.is_key_held(bindings.down),
            left: self.is_key_held(bindings.left),
            right: self.is_key_held(bindings.right),
        }
    }
}

/// The four keys that steer one player's leader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlBindings {
    pub up: KeyCode,
    pub down: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl ControlBindings {
    pub fn keys(&self) -> [KeyCode; 4] {
        [self.up, self.down, self.left, self.right]
    }
}

/// Named keyboard layouts, so config files can pick one per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingScheme {
    Wasd,
    Arrows,
    Ijkl,
    Numpad,
}

impl BindingScheme {
    pub fn bindings(self) -> ControlBindings {
        match self {
            BindingScheme::Wasd => ControlBindings {
                up: KeyCode::KeyW,
                down: KeyCode::KeyS,
                left: KeyCode::KeyA,
                right: KeyCode::KeyD,
            },
            BindingScheme::Arrows => ControlBindings {
                up: KeyCode::ArrowUp,
                down: KeyCode::ArrowDown,
                left: KeyCode::ArrowLeft,
                right: KeyCode::ArrowRight,
            },
            BindingScheme::Ijkl => ControlBindings {
                up: KeyCode::KeyI,
                down: KeyCode::KeyK,
                left: KeyCode::KeyJ,
                right: KeyCode::KeyL,
            },
            BindingScheme::Numpad => ControlBindings {
                up: KeyCode::Numpad8,
                down: KeyCode::Numpad5,
                left: KeyCode::Numpad4,
                right: KeyCode::Numpad6,
            },
        }
    }

    /// Default scheme for the n-th player.
    pub fn for_player(index: usize) -> Self {
        match index % 4 {
            0 => BindingScheme::Wasd,
            1 => BindingScheme::Arrows,
            2 => BindingScheme::Ijkl,
            _ => BindingScheme::Numpad,
        }
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
