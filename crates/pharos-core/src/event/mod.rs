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

//! The bounded event queue shared between the input and frame contexts.
//!
//! Producers on the input side [`push`] events; the frame context [`pop`]s
//! them in FIFO order every tick. The queue is bounded: a push that finds
//! it full drops the event and raises a sticky overflow flag instead of
//! failing the producer, because losing a low-priority input event is
//! preferable to crashing the input thread. The flag is observed through
//! [`check_and_clear_oom`] only.
//!
//! [`push`]: EventQueue::push
//! [`pop`]: EventQueue::pop
//! [`check_and_clear_oom`]: EventQueue::check_and_clear_oom

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::graphics::surface::SyncMode;
use crate::input::{InputState, MouseButton};

/// Events flowing from the platform layer into the core.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A keyboard key was pressed.
    KeyPressed {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// A keyboard key was released.
    KeyReleased {
        /// A string representation of the physical key code.
        key_code: String,
    },
    /// A mouse button was pressed.
    MouseButtonPressed {
        /// The mouse button that was pressed.
        button: MouseButton,
    },
    /// A mouse button was released.
    MouseButtonReleased {
        /// The mouse button that was released.
        button: MouseButton,
    },
    /// The mouse cursor moved.
    MouseMoved {
        /// The new x-coordinate of the cursor.
        x: f32,
        /// The new y-coordinate of the cursor.
        y: f32,
    },
    /// The mouse wheel was scrolled.
    MouseWheelScrolled {
        /// The horizontal scroll delta.
        delta_x: f32,
        /// The vertical scroll delta.
        delta_y: f32,
    },
    /// The window's client area changed size.
    WindowResized {
        /// New width in physical pixels.
        width: u32,
        /// New height in physical pixels.
        height: u32,
    },
    /// The window gained input focus.
    FocusGained,
    /// The window lost input focus.
    FocusLost,
    /// The user asked the window to close.
    CloseRequested,
    /// The application changed the presentation sync mode.
    SyncModeChanged {
        /// The newly requested mode.
        mode: SyncMode,
    },
}

#[derive(Debug)]
struct QueueInner {
    buffer: VecDeque<Event>,
    input: InputState,
}

/// Bounded FIFO buffer of [`Event`]s plus the derived [`InputState`].
///
/// This is the only structure shared between the input and frame contexts;
/// an internal lock serializes `push`/`pop` and the overflow flag is a
/// single atomic safe for concurrent set and check-and-clear.
#[derive(Debug)]
pub struct EventQueue {
    inner: Mutex<QueueInner>,
    capacity: usize,
    oom: AtomicBool,
}

impl EventQueue {
    /// Creates a queue holding at most `capacity` buffered events.
    pub fn new(capacity: usize) -> Self {
        log::info!("Event queue initialized (capacity: {capacity}).");
        Self {
            inner: Mutex::new(QueueInner {
                buffer: VecDeque::with_capacity(capacity.min(256)),
                input: InputState::default(),
            }),
            capacity,
            oom: AtomicBool::new(false),
        }
    }

    /// Appends an event; infallible from the caller's perspective.
    ///
    /// At capacity the event record is dropped and the sticky overflow flag
    /// is set. The input state is updated either way: the snapshot mirrors
    /// the physical device, not the buffer, and dropping the record must
    /// not wedge a key as stuck-down.
    pub fn push(&self, event: Event) {
        let mut inner = self.lock();
        inner.input.apply(&event);
        if inner.buffer.len() >= self.capacity {
            self.oom.store(true, Ordering::Release);
            log::trace!("Event queue full; dropping {event:?}.");
        } else {
            inner.buffer.push_back(event);
        }
    }

    /// Removes and returns the oldest buffered event, or `None` if empty.
    ///
    /// Consumers must drain to `None` every tick to keep the buffer from
    /// growing without bound.
    pub fn pop(&self) -> Option<Event> {
        self.lock().buffer.pop_front()
    }

    /// Reports whether an overflow occurred since the last call, clearing
    /// the flag.
    ///
    /// This is the only way the flag is observed: any number of overflows
    /// between checks collapse into a single `true`.
    pub fn check_and_clear_oom(&self) -> bool {
        self.oom.swap(false, Ordering::AcqRel)
    }

    /// A snapshot of the input state derived from every pushed event.
    pub fn input_state(&self) -> InputState {
        self.lock().input.clone()
    }

    /// Number of currently buffered events.
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Whether no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Drops all buffered events and frees the backing storage.
    ///
    /// The final step of engine teardown.
    pub fn release_storage(&self) {
        let mut inner = self.lock();
        inner.buffer.clear();
        inner.buffer.shrink_to_fit();
        log::debug!("Event queue storage released.");
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        // A producer panicking mid-push leaves nothing half-written worth
        // poisoning over; recover the guard.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
