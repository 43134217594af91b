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

//! `graphics` module – the presentation seam.
//!
//! Contents:
//! * [`surface`]: engine-owned swapchain description and release tracing
//! * [`traits`]: the [`GraphicsBackend`] seam the engine sequences calls into
//! * [`error`]: presentation error tiers
//! * [`wgpu_impl`]: the shipped wgpu backend

pub mod error;
pub mod surface;
pub mod traits;
pub mod wgpu_impl;

pub use traits::GraphicsBackend;
