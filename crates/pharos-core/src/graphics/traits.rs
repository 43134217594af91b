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

use crate::graphics::error::PresentError;
use crate::graphics::surface::{ReleaseTrace, SurfaceDescriptor, SurfaceFormat};

/// The engine's seam to the graphics API.
///
/// The core only sequences calls into the backend and reacts to its error
/// signals; everything API-specific (instances, adapters, devices, queues)
/// lives behind this trait. The shipped implementation is
/// [`WgpuBackend`](crate::graphics::wgpu_impl::WgpuBackend); tests use
/// recording mocks.
pub trait GraphicsBackend: std::fmt::Debug + Send + Sync {
    /// The surface format the backend prefers for presentation.
    fn preferred_format(&self) -> SurfaceFormat;

    /// Builds the swapchain described by `descriptor`.
    ///
    /// ## Arguments
    /// * `descriptor` - The complete surface description; dimensions are
    ///   guaranteed non-degenerate by the caller.
    /// ## Returns
    /// `Ok(())` on success, or the backend's creation error.
    fn create_swapchain(&mut self, descriptor: &SurfaceDescriptor) -> anyhow::Result<()>;

    /// Releases the current swapchain, if any.
    fn release_swapchain(&mut self);

    /// Acquires, draws into, and presents one frame.
    fn present(&mut self) -> Result<(), PresentError>;

    /// Releases every backend-owned resource in the fixed teardown order,
    /// recording each release: swapchain, queue, device, surface, adapter,
    /// instance.
    fn shutdown(&mut self, trace: &mut ReleaseTrace);
}
