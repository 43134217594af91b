// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Derived input state.
//!
//! [`InputState`] is a snapshot of the devices as seen through the events
//! that were pushed into the queue: which keys and buttons are currently
//! held and where the pointer last was. It is mutated only as a side effect
//! of pushing an event, never by reading the queue back.

use std::collections::HashSet;

use crate::event::Event;

/// An engine-internal representation of a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// The left mouse button.
    Left,
    /// The right mouse button.
    Right,
    /// The middle mouse button.
    Middle,
    /// The back mouse button (typically on the side).
    Back,
    /// The forward mouse button (typically on the side).
    Forward,
    /// Another mouse button, identified by a numeric code.
    Other(u16),
}

/// Current key/button/pointer state derived from consumed events.
///
/// Press events insert into the sets, release events remove, pointer
/// motion overwrites the position. A focus-lost event clears both press
/// sets: releases cannot reliably be observed while unfocused, so holding
/// onto the bits would wedge keys as stuck-down.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pressed_keys: HashSet<String>,
    pressed_buttons: HashSet<MouseButton>,
    pointer: (f32, f32),
}

impl InputState {
    /// Whether the key with the given physical key code is currently held.
    pub fn is_key_pressed(&self, key_code: &str) -> bool {
        self.pressed_keys.contains(key_code)
    }

    /// Whether the given mouse button is currently held.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// The last known pointer position, in window coordinates.
    pub fn pointer_position(&self) -> (f32, f32) {
        self.pointer
    }

    /// Iterates over the key codes currently held.
    pub fn pressed_keys(&self) -> impl Iterator<Item = &str> {
        self.pressed_keys.iter().map(String::as_str)
    }

    /// Folds one event into the state.
    pub(crate) fn apply(&mut self, event: &Event) {
        match event {
            Event::KeyPressed { key_code } => {
                self.pressed_keys.insert(key_code.clone());
            }
            Event::KeyReleased { key_code } => {
                self.pressed_keys.remove(key_code);
            }
            Event::MouseButtonPressed { button } => {
                self.pressed_buttons.insert(*button);
            }
            Event::MouseButtonReleased { button } => {
                self.pressed_buttons.remove(button);
            }
            Event::MouseMoved { x, y } => {
                self.pointer = (*x, *y);
            }
            Event::FocusLost => {
                self.pressed_keys.clear();
                self.pressed_buttons.clear();
            }
            // Everything else carries no device state.
            _ => {}
        }
    }
}
