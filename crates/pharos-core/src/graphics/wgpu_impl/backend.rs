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

//! The wgpu implementation of [`GraphicsBackend`].
//!
//! Construction runs the one-shot GPU acquisition sequence: instance →
//! surface → adapter → device/queue. The only asynchronous step is the
//! adapter request, collapsed into a synchronous startup barrier with
//! `pollster`; there is no timeout and no retry, because a missing or
//! incompatible GPU backend has no recovery path in this layer.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};

use crate::graphics::error::PresentError;
use crate::graphics::surface::{ReleaseTrace, SurfaceDescriptor, SurfaceFormat};
use crate::graphics::traits::GraphicsBackend;
use crate::graphics::wgpu_impl::conversions;
use crate::platform::winit::PlatformWindow;

/// Environment variable naming the graphics backend to use.
pub const BACKEND_ENV_VAR: &str = "PHAROS_BACKEND";

/// Holds the core wgpu state objects required for presentation.
///
/// Every handle sits in an `Option` so teardown can release them one by
/// one in the fixed order the engine demands.
#[derive(Debug)]
pub struct WgpuBackend {
    instance: Option<wgpu::Instance>,
    surface: Option<wgpu::Surface<'static>>,
    adapter: Option<wgpu::Adapter>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
}

impl WgpuBackend {
    /// Acquires the backend with no extra feature or limit requirements.
    ///
    /// ## Arguments
    /// * `window` - The platform window to present into.
    /// ## Returns
    /// The acquired backend, or a fatal startup error.
    pub fn new(window: &PlatformWindow) -> Result<Self> {
        Self::with_requirements(window, wgpu::Features::empty(), wgpu::Limits::default())
    }

    /// Acquires the backend with caller-specified device requirements.
    ///
    /// Blocks until the adapter request completes; any failure along the
    /// sequence is fatal.
    pub fn with_requirements(
        window: &PlatformWindow,
        required_features: wgpu::Features,
        required_limits: wgpu::Limits,
    ) -> Result<Self> {
        log::info!("Acquiring graphics backend...");
        pollster::block_on(Self::acquire(window, required_features, required_limits))
    }

    async fn acquire(
        window: &PlatformWindow,
        required_features: wgpu::Features,
        required_limits: wgpu::Limits,
    ) -> Result<Self> {
        // --- 1. Create Instance ---
        let backends = backends_from_env()?;
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });
        log::debug!("wgpu instance created (backends: {backends:?}).");

        // --- 2. Create Surface ---
        let window_arc: Arc<winit::window::Window> = Arc::clone(window.winit_window_arc());
        let surface = instance
            .create_surface(window_arc)
            .context("Failed to create the presentation surface")?;
        log::debug!("wgpu surface created for the window.");

        // --- 3. Request Adapter (synchronous barrier) ---
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No compatible graphics adapter: {e}"))?;

        let adapter_info = adapter.get_info();
        if adapter_info.backend == wgpu::Backend::Noop {
            bail!(
                "Adapter \"{}\" reports no usable backend",
                adapter_info.name
            );
        }
        log::info!(
            "Selected GPU: \"{}\", Backend: {:?}",
            adapter_info.name,
            adapter_info.backend
        );

        // --- 4. Request Device and Queue ---
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Pharos Logical Device"),
                required_features,
                required_limits,
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| anyhow!("Failed to create the logical device: {e}"))?;
        log::info!("Logical device and command queue created.");

        // Device loss has no recovery path in this layer: nothing here can
        // re-upload what the device held.
        device.set_device_lost_callback(|reason, message| {
            log::error!("Graphics device lost ({reason:?}): {message}");
            std::process::exit(1);
        });
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured graphics error: {error}");
        }));

        Ok(Self {
            instance: Some(instance),
            surface: Some(surface),
            adapter: Some(adapter),
            device: Some(device),
            queue: Some(queue),
            config: None,
        })
    }
}

impl GraphicsBackend for WgpuBackend {
    fn preferred_format(&self) -> SurfaceFormat {
        let (Some(surface), Some(adapter)) = (self.surface.as_ref(), self.adapter.as_ref())
        else {
            return SurfaceFormat::Bgra8UnormSrgb;
        };
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        conversions::format_from_wgpu(format)
    }

    fn create_swapchain(&mut self, descriptor: &SurfaceDescriptor) -> Result<()> {
        let (Some(surface), Some(adapter), Some(device)) = (
            self.surface.as_ref(),
            self.adapter.as_ref(),
            self.device.as_ref(),
        ) else {
            bail!("Backend resources already released");
        };

        let caps = surface.get_capabilities(adapter);
        let requested = conversions::present_mode_to_wgpu(descriptor.present_mode);
        let present_mode = if caps.present_modes.contains(&requested) {
            requested
        } else {
            log::warn!("Present mode {requested:?} unsupported here; falling back to Fifo.");
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: conversions::usage_to_wgpu(descriptor.usage),
            format: conversions::format_to_wgpu(descriptor.format),
            width: descriptor.width.max(1),
            height: descriptor.height.max(1),
            present_mode,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(device, &config);
        log::info!(
            "Surface configured: Format={:?}, Size={}x{}, PresentMode={:?}",
            config.format,
            config.width,
            config.height,
            config.present_mode
        );
        self.config = Some(config);
        Ok(())
    }

    fn release_swapchain(&mut self) {
        // wgpu tears the old swapchain down on the next configure; dropping
        // the configuration marks it released on our side.
        if self.config.take().is_some() {
            log::debug!("Swapchain released.");
        }
    }

    fn present(&mut self) -> Result<(), PresentError> {
        let (Some(surface), Some(device), Some(queue)) = (
            self.surface.as_ref(),
            self.device.as_ref(),
            self.queue.as_ref(),
        ) else {
            return Err(PresentError::Backend(
                "backend resources already released".to_string(),
            ));
        };
        if self.config.is_none() {
            return Err(PresentError::Lost);
        }

        let frame = surface
            .get_current_texture()
            .map_err(conversions::present_error_from_surface)?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Pharos Present Encoder"),
        });
        {
            let _render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Screen Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.01,
                            g: 0.02,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
        }
        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn shutdown(&mut self, trace: &mut ReleaseTrace) {
        self.config = None;
        trace.record("swapchain");
        drop(self.queue.take());
        trace.record("queue");
        drop(self.device.take());
        trace.record("device");
        drop(self.surface.take());
        trace.record("surface");
        drop(self.adapter.take());
        trace.record("adapter");
        drop(self.instance.take());
        trace.record("instance");
    }
}

fn backends_from_env() -> Result<wgpu::Backends> {
    match std::env::var(BACKEND_ENV_VAR) {
        Ok(name) => backends_from_name(&name),
        Err(std::env::VarError::NotPresent) => Ok(wgpu::Backends::PRIMARY),
        Err(std::env::VarError::NotUnicode(_)) => {
            bail!("{BACKEND_ENV_VAR} is set but is not valid UTF-8")
        }
    }
}

fn backends_from_name(name: &str) -> Result<wgpu::Backends> {
    match name.to_ascii_lowercase().as_str() {
        "vulkan" => Ok(wgpu::Backends::VULKAN),
        "metal" => Ok(wgpu::Backends::METAL),
        "dx12" => Ok(wgpu::Backends::DX12),
        "gl" => Ok(wgpu::Backends::GL),
        "webgpu" => Ok(wgpu::Backends::BROWSER_WEBGPU),
        other => bail!(
            "Unrecognized graphics backend '{other}' \
             (expected vulkan, metal, dx12, gl, or webgpu)"
        ),
    }
}
