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

//! Engine-owned presentation surface types.
//!
//! These types describe the swapchain in backend-agnostic terms; the
//! `wgpu_impl` module converts them to the concrete API's equivalents.

use serde::Deserialize;

/// How completed frames are synchronized with the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// No synchronization; frames present as fast as they are produced.
    None,
    /// Classic double buffering, locked to the display's refresh.
    Double,
    /// Triple buffering: vsync'd presentation with an extra in-flight frame.
    Triple,
}

impl SyncMode {
    /// The backend present-mode policy this sync mode maps to.
    pub fn present_mode(self) -> PresentMode {
        match self {
            SyncMode::None => PresentMode::Immediate,
            SyncMode::Double => PresentMode::Fifo,
            SyncMode::Triple => PresentMode::Mailbox,
        }
    }

    /// The frame-governor target this sync mode pins, given the display
    /// refresh rate in Hz.
    ///
    /// Triple buffering produces at twice the refresh rate so the mailbox
    /// always holds a fresh frame; every other mode leaves the governor
    /// unlimited (0) and lets the present mode do the pacing.
    pub fn target_rate(self, refresh_hz: u32) -> u32 {
        match self {
            SyncMode::Triple => refresh_hz * 2,
            SyncMode::None | SyncMode::Double => 0,
        }
    }
}

impl Default for SyncMode {
    fn default() -> Self {
        SyncMode::Double
    }
}

/// Backend-level policy for how completed frames are queued for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    /// Present immediately; tearing allowed.
    Immediate,
    /// First-in first-out; the standard vsync queue.
    Fifo,
    /// Single-slot mailbox; newer frames replace waiting ones.
    Mailbox,
}

/// Pixel format of the presentation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// 8-bit BGRA, linear.
    Bgra8Unorm,
    /// 8-bit BGRA with sRGB encoding.
    Bgra8UnormSrgb,
    /// 8-bit RGBA, linear.
    Rgba8Unorm,
    /// 8-bit RGBA with sRGB encoding.
    Rgba8UnormSrgb,
}

impl SurfaceFormat {
    /// Whether the format applies sRGB encoding on write.
    pub fn is_srgb(self) -> bool {
        matches!(
            self,
            SurfaceFormat::Bgra8UnormSrgb | SurfaceFormat::Rgba8UnormSrgb
        )
    }
}

/// Usage flags for the surface's textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceUsage(u32);

impl SurfaceUsage {
    /// The textures are rendered into.
    pub const RENDER_ATTACHMENT: Self = Self(1 << 0);
    /// The textures can be the source of a copy.
    pub const COPY_SRC: Self = Self(1 << 1);
    /// The textures can be the destination of a copy.
    pub const COPY_DST: Self = Self(1 << 2);

    /// Combines two usage sets.
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every flag in `other` is present in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for SurfaceUsage {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Complete description of the swapchain the core wants presented.
///
/// Owned by the core, mutated only by the surface reconciler, read by the
/// presentation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    /// Width in physical pixels.
    pub width: u32,
    /// Height in physical pixels.
    pub height: u32,
    /// Pixel format of the presentation textures.
    pub format: SurfaceFormat,
    /// Queueing policy derived from the sync mode.
    pub present_mode: PresentMode,
    /// Usage flags for the presentation textures.
    pub usage: SurfaceUsage,
}

/// Records the order in which teardown released resources.
///
/// Teardown order is strict (swapchain before device before surface before
/// platform); the trace makes it observable.
#[derive(Debug, Default)]
pub struct ReleaseTrace {
    entries: Vec<&'static str>,
}

impl ReleaseTrace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one released resource.
    pub fn record(&mut self, resource: &'static str) {
        log::debug!("Released {resource}.");
        self.entries.push(resource);
    }

    /// The release order observed so far.
    pub fn entries(&self) -> &[&'static str] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Each sync mode maps to exactly one present mode.
    #[test]
    fn sync_mode_maps_to_present_mode() {
        assert_eq!(SyncMode::None.present_mode(), PresentMode::Immediate);
        assert_eq!(SyncMode::Double.present_mode(), PresentMode::Fifo);
        assert_eq!(SyncMode::Triple.present_mode(), PresentMode::Mailbox);
    }

    /// Triple buffering pins the governor to twice the refresh rate;
    /// everything else runs unlimited.
    #[test]
    fn sync_mode_target_rate() {
        assert_eq!(SyncMode::Triple.target_rate(60), 120);
        assert_eq!(SyncMode::Triple.target_rate(144), 288);
        assert_eq!(SyncMode::Double.target_rate(60), 0);
        assert_eq!(SyncMode::None.target_rate(60), 0);
    }

    /// sRGB detection covers both channel orders.
    #[test]
    fn srgb_formats() {
        assert!(SurfaceFormat::Bgra8UnormSrgb.is_srgb());
        assert!(SurfaceFormat::Rgba8UnormSrgb.is_srgb());
        assert!(!SurfaceFormat::Bgra8Unorm.is_srgb());
        assert!(!SurfaceFormat::Rgba8Unorm.is_srgb());
    }

    /// Usage flags combine and test like a bitset.
    #[test]
    fn usage_flags_combine() {
        let usage = SurfaceUsage::RENDER_ATTACHMENT | SurfaceUsage::COPY_SRC;
        assert!(usage.contains(SurfaceUsage::RENDER_ATTACHMENT));
        assert!(usage.contains(SurfaceUsage::COPY_SRC));
        assert!(!usage.contains(SurfaceUsage::COPY_DST));
    }

    /// The trace preserves recording order.
    #[test]
    fn release_trace_preserves_order() {
        let mut trace = ReleaseTrace::new();
        trace.record("swapchain");
        trace.record("queue");
        trace.record("device");
        assert_eq!(trace.entries(), &["swapchain", "queue", "device"]);
    }
}
