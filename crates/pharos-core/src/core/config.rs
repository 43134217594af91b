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

//! Core configuration.
//!
//! Everything the core needs to know up front lives in [`CoreConfig`],
//! including whether it drives its own loop ([`LoopMode`]). Keeping the
//! loop mode here, rather than in a process-wide flag, keeps the core
//! testable without ambient state.

use serde::Deserialize;

use crate::graphics::surface::SyncMode;

/// Who drives the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// The core drives an infinite dispatch loop until it has exited.
    Blocking,
    /// An external driver repeatedly invokes one frame step and checks
    /// for exit.
    External,
}

/// Configuration handed to the core at construction time.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Initial window title.
    pub title: String,
    /// Initial logical window width.
    pub width: u32,
    /// Initial logical window height.
    pub height: u32,
    /// Whether the window starts fullscreen.
    pub fullscreen: bool,
    /// Initial presentation sync mode.
    pub sync_mode: SyncMode,
    /// Who drives the frame loop.
    pub loop_mode: LoopMode,
    /// Target iterations per second for the input loop (0 = unlimited).
    pub input_rate: u32,
    /// Refresh rate assumed when the platform cannot report one.
    pub fallback_refresh_rate: u32,
    /// Maximum number of buffered input events.
    pub event_queue_capacity: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            title: "Pharos".to_string(),
            width: 1024,
            height: 768,
            fullscreen: false,
            sync_mode: SyncMode::default(),
            loop_mode: LoopMode::Blocking,
            input_rate: 240,
            fallback_refresh_rate: 60,
            event_queue_capacity: 8192,
        }
    }
}
