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

//! Named signals and the scheduling seam.
//!
//! The core does not own a dispatch substrate; it schedules [`Signal`]s
//! into whatever implements [`Scheduler`] and lets that collaborator invoke
//! the registered callbacks in order. [`ExitRequest`] is the cooperative
//! shutdown signal, safe to fire from any thread or signal handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Named signals exchanged with the external scheduler.
///
/// `Started` and `FrameFinished` are interrupt-style: the core emits them
/// but never consumes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Begin scheduling ticks.
    Start,
    /// No-op hook point between frames.
    Update,
    /// Advance one frame.
    PresentFrame,
    /// Request shutdown.
    Exit,
    /// Finalize and release resources.
    Deinit,
    /// Emitted once when the core has started.
    Started,
    /// Emitted after every completed frame.
    FrameFinished,
}

/// Capability to enqueue a named signal into the dispatch substrate.
pub trait Scheduler {
    /// Schedules `signal` for dispatch.
    fn schedule(&mut self, signal: Signal);
}

/// A scheduler that drops every signal.
///
/// The default when the host drives the core directly through
/// [`Engine::run`](crate::Engine::run) or
/// [`Engine::step`](crate::Engine::step) and nothing else listens.
#[derive(Debug, Default)]
pub struct NullScheduler;

impl Scheduler for NullScheduler {
    fn schedule(&mut self, signal: Signal) {
        log::trace!("Dropping signal {signal:?} (no scheduler attached).");
    }
}

/// Cloneable handle used to request a cooperative shutdown.
///
/// Requesting exit never terminates the loop mid-frame: the frame context
/// consumes the flag at frame completion and walks the lifecycle state
/// machine from there.
#[derive(Debug, Clone)]
pub struct ExitRequest {
    flag: Arc<AtomicBool>,
}

impl ExitRequest {
    /// Creates a handle with no exit requested.
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown.
    #[inline]
    pub fn request(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown has been requested.
    #[inline]
    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

impl Default for ExitRequest {
    fn default() -> Self {
        Self::new()
    }
}
