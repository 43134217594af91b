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

//! Mapping between the engine's surface types and wgpu's.

use crate::graphics::error::PresentError;
use crate::graphics::surface::{PresentMode, SurfaceFormat, SurfaceUsage};

pub(crate) fn format_to_wgpu(format: SurfaceFormat) -> wgpu::TextureFormat {
    match format {
        SurfaceFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        SurfaceFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,
        SurfaceFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        SurfaceFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
    }
}

pub(crate) fn format_from_wgpu(format: wgpu::TextureFormat) -> SurfaceFormat {
    match format {
        wgpu::TextureFormat::Bgra8Unorm => SurfaceFormat::Bgra8Unorm,
        wgpu::TextureFormat::Bgra8UnormSrgb => SurfaceFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Rgba8Unorm => SurfaceFormat::Rgba8Unorm,
        wgpu::TextureFormat::Rgba8UnormSrgb => SurfaceFormat::Rgba8UnormSrgb,
        other => {
            log::warn!("Surface format {other:?} has no engine equivalent; assuming Bgra8UnormSrgb.");
            SurfaceFormat::Bgra8UnormSrgb
        }
    }
}

pub(crate) fn present_mode_to_wgpu(mode: PresentMode) -> wgpu::PresentMode {
    match mode {
        PresentMode::Immediate => wgpu::PresentMode::Immediate,
        PresentMode::Fifo => wgpu::PresentMode::Fifo,
        PresentMode::Mailbox => wgpu::PresentMode::Mailbox,
    }
}

pub(crate) fn usage_to_wgpu(usage: SurfaceUsage) -> wgpu::TextureUsages {
    let mut usages = wgpu::TextureUsages::empty();
    if usage.contains(SurfaceUsage::RENDER_ATTACHMENT) {
        usages |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }
    if usage.contains(SurfaceUsage::COPY_SRC) {
        usages |= wgpu::TextureUsages::COPY_SRC;
    }
    if usage.contains(SurfaceUsage::COPY_DST) {
        usages |= wgpu::TextureUsages::COPY_DST;
    }
    usages
}

pub(crate) fn present_error_from_surface(error: wgpu::SurfaceError) -> PresentError {
    match error {
        wgpu::SurfaceError::Timeout => PresentError::Timeout,
        wgpu::SurfaceError::Outdated => PresentError::Outdated,
        wgpu::SurfaceError::Lost => PresentError::Lost,
        wgpu::SurfaceError::OutOfMemory => PresentError::OutOfMemory,
        other => PresentError::Backend(other.to_string()),
    }
}
