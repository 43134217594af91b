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

//! Core-owned window state.
//!
//! [`Window`] holds the attributes the application reads and the core
//! writes: the owned title buffer, the logical size, the fullscreen flag,
//! and the framebuffer format/size mirrored from the live swapchain.
//! The platform wrapper around the native window lives in
//! [`platform`](crate::platform); exactly one window is supported.

use std::fmt;

use crate::graphics::surface::{SurfaceDescriptor, SurfaceFormat};

/// Window-visible attributes of the single application window.
#[derive(Debug, Clone)]
pub struct Window {
    title: String,
    width: u32,
    height: u32,
    fullscreen: bool,
    framebuffer_format: Option<SurfaceFormat>,
    framebuffer_width: u32,
    framebuffer_height: u32,
    refresh_rate: Option<u32>,
}

impl Window {
    /// Creates window state with the given title and logical size.
    pub fn new(title: impl Into<String>, width: u32, height: u32, fullscreen: bool) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            fullscreen,
            framebuffer_format: None,
            framebuffer_width: 0,
            framebuffer_height: 0,
            refresh_rate: None,
        }
    }

    /// The current window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replaces the owned title buffer.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Formatted-print variant of [`set_title`]: renders the arguments into
    /// a fresh core-owned buffer, freeing the previous one.
    ///
    /// ```
    /// # let mut window = pharos_core::Window::new("demo", 640, 480, false);
    /// window.set_title_fmt(format_args!("demo — {} fps", 60));
    /// ```
    ///
    /// [`set_title`]: Window::set_title
    pub fn set_title_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.title = args.to_string();
    }

    /// Logical size of the window's client area.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Whether the window covers the whole display.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Pixel format of the live swapchain, once one exists.
    pub fn framebuffer_format(&self) -> Option<SurfaceFormat> {
        self.framebuffer_format
    }

    /// Size of the live swapchain's textures.
    pub fn framebuffer_size(&self) -> (u32, u32) {
        (self.framebuffer_width, self.framebuffer_height)
    }

    /// Refresh rate of the display the window sits on, if the platform
    /// reported one.
    pub fn refresh_rate(&self) -> Option<u32> {
        self.refresh_rate
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub(crate) fn set_refresh_rate(&mut self, refresh_hz: Option<u32>) {
        self.refresh_rate = refresh_hz;
    }

    /// Mirrors the live swapchain's format and size into the
    /// window-visible attributes.
    pub(crate) fn mirror_framebuffer(&mut self, descriptor: &SurfaceDescriptor) {
        self.framebuffer_format = Some(descriptor.format);
        self.framebuffer_width = descriptor.width;
        self.framebuffer_height = descriptor.height;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::surface::{PresentMode, SurfaceUsage};

    /// Setting the title replaces the previous owned buffer.
    #[test]
    fn set_title_replaces_buffer() {
        let mut window = Window::new("first", 640, 480, false);
        assert_eq!(window.title(), "first");
        window.set_title("second");
        assert_eq!(window.title(), "second");
    }

    /// The formatted helper renders into the owned buffer.
    #[test]
    fn set_title_fmt_formats() {
        let mut window = Window::new("demo", 640, 480, false);
        window.set_title_fmt(format_args!("demo — {} fps", 144));
        assert_eq!(window.title(), "demo — 144 fps");
    }

    /// Framebuffer attributes mirror the descriptor they were given.
    #[test]
    fn mirror_framebuffer_copies_attributes() {
        let mut window = Window::new("demo", 640, 480, false);
        assert_eq!(window.framebuffer_format(), None);

        let descriptor = SurfaceDescriptor {
            width: 1280,
            height: 720,
            format: SurfaceFormat::Bgra8UnormSrgb,
            present_mode: PresentMode::Fifo,
            usage: SurfaceUsage::RENDER_ATTACHMENT,
        };
        window.mirror_framebuffer(&descriptor);
        assert_eq!(
            window.framebuffer_format(),
            Some(SurfaceFormat::Bgra8UnormSrgb)
        );
        assert_eq!(window.framebuffer_size(), (1280, 720));
        // The logical size is independent of the framebuffer mirror.
        assert_eq!(window.size(), (640, 480));
    }
}
