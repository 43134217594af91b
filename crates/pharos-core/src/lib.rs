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

//! # Pharos Core
//!
//! Runtime core of an interactive application host: application lifecycle,
//! frame/input pacing, bounded input buffering, and presentation-surface
//! reconciliation. Rendering pipelines, asset management, and windowing
//! toolkits live above or beside this crate; this is only the control
//! loop that drives them.

pub mod core;
pub mod event;
pub mod graphics;
pub mod input;
pub mod platform;
pub mod window;

pub use crate::core::config::{CoreConfig, LoopMode};
pub use crate::core::engine::{Engine, LifecycleState, TickContext};
pub use crate::core::frequency::FrequencyGovernor;
pub use crate::core::schedule::{ExitRequest, NullScheduler, Scheduler, Signal};
pub use event::{Event, EventQueue};
pub use graphics::surface::{PresentMode, SurfaceDescriptor, SyncMode};
pub use graphics::wgpu_impl::{WgpuBackend, BACKEND_ENV_VAR};
pub use graphics::GraphicsBackend;
pub use input::{InputState, MouseButton};
pub use platform::winit::WinitHost;
pub use window::Window;
