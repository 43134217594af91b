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

//! winit integration.
//!
//! [`PlatformWindow`] wraps the native window; [`translate_window_event`]
//! adapts winit's events into the engine's [`Event`] format; [`WinitHost`]
//! collapses the frame and input contexts into winit's single cooperative
//! loop: window events are pushed into the shared queue (input-context
//! work), `about_to_wait` advances one frame step (frame-context work).

use std::sync::Arc;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::error::OsError;
use winit::event::{ElementState, MouseButton as WinitMouseButton, MouseScrollDelta, StartCause, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Fullscreen, Window as NativeWindow, WindowId};

use crate::core::config::{CoreConfig, LoopMode};
use crate::core::engine::{Engine, LifecycleState, TickContext};
use crate::core::frequency::FrequencyGovernor;
use crate::core::schedule::{ExitRequest, Scheduler};
use crate::event::Event;
use crate::graphics::wgpu_impl::WgpuBackend;
use crate::input::MouseButton;

/// A wrapper around a winit window, providing controlled access and
/// engine-specific utilities.
#[derive(Debug, Clone)]
pub struct PlatformWindow {
    inner: Arc<NativeWindow>,
}

impl PlatformWindow {
    /// Builds and wraps the native window described by the config.
    ///
    /// ## Arguments
    /// * `event_loop` - The active winit event loop needed to create windows.
    /// * `config` - Title, logical size, and fullscreen flag.
    /// ## Returns
    /// A `Result` containing the new `PlatformWindow` or an `OsError`.
    pub fn new(event_loop: &ActiveEventLoop, config: &CoreConfig) -> Result<Self, OsError> {
        log::info!("Creating application window...");

        let mut attributes = NativeWindow::default_attributes()
            .with_title(&config.title)
            .with_inner_size(LogicalSize::new(config.width, config.height))
            .with_visible(true);
        if config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop.create_window(attributes)?;
        log::info!("Window created successfully (id: {:?}).", window.id());
        Ok(Self {
            inner: Arc::new(window),
        })
    }

    /// The unique identifier of the underlying window.
    pub fn id(&self) -> WindowId {
        self.inner.id()
    }

    /// Requests that a redraw event be emitted for this window.
    pub fn request_redraw(&self) {
        self.inner.request_redraw();
    }

    /// Physical size of the window's client area.
    pub fn inner_size(&self) -> PhysicalSize<u32> {
        self.inner.inner_size()
    }

    /// The display scale factor associated with this window.
    pub fn scale_factor(&self) -> f64 {
        self.inner.scale_factor()
    }

    /// Pushes a new title to the native window.
    pub fn set_title(&self, title: &str) {
        self.inner.set_title(title);
    }

    /// The window handle associated with this window.
    pub fn raw_window_handle(
        &self,
    ) -> Result<raw_window_handle::RawWindowHandle, raw_window_handle::HandleError> {
        self.inner.window_handle().map(|h| h.as_raw())
    }

    /// The display handle associated with this window.
    pub fn raw_display_handle(
        &self,
    ) -> Result<raw_window_handle::RawDisplayHandle, raw_window_handle::HandleError> {
        self.inner.display_handle().map(|h| h.as_raw())
    }

    /// Refresh rate of the monitor the window currently sits on, in Hz.
    pub fn refresh_rate(&self) -> Option<u32> {
        self.inner
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
            .map(|millihertz| (millihertz + 500) / 1000)
    }

    pub(crate) fn winit_window_arc(&self) -> &Arc<NativeWindow> {
        &self.inner
    }
}

/// Translates a `winit::event::WindowEvent` into the engine's [`Event`].
///
/// Window events that carry no engine meaning (redraws, scale factor
/// changes, IME traffic) translate to `None`. Key repeats are filtered: the
/// press set already holds the key.
pub fn translate_window_event(event: &WindowEvent) -> Option<Event> {
    match event {
        WindowEvent::KeyboardInput {
            event: key_event, ..
        } => {
            if let PhysicalKey::Code(keycode) = key_event.physical_key {
                let key_code = map_keycode_to_string(keycode);
                match key_event.state {
                    ElementState::Pressed if !key_event.repeat => {
                        Some(Event::KeyPressed { key_code })
                    }
                    ElementState::Released => Some(Event::KeyReleased { key_code }),
                    _ => None,
                }
            } else {
                None
            }
        }
        WindowEvent::CursorMoved { position, .. } => Some(Event::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            match state {
                ElementState::Pressed => Some(Event::MouseButtonPressed { button }),
                ElementState::Released => Some(Event::MouseButtonReleased { button }),
            }
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (delta_x, delta_y): (f32, f32) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(position) => (position.x as f32, position.y as f32),
            };
            if delta_x != 0.0 || delta_y != 0.0 {
                Some(Event::MouseWheelScrolled { delta_x, delta_y })
            } else {
                None
            }
        }
        WindowEvent::Resized(size) => Some(Event::WindowResized {
            width: size.width,
            height: size.height,
        }),
        WindowEvent::Focused(true) => Some(Event::FocusGained),
        WindowEvent::Focused(false) => Some(Event::FocusLost),
        WindowEvent::CloseRequested => Some(Event::CloseRequested),
        _ => None,
    }
}

/// (Internal) Maps a `winit::keyboard::KeyCode` to a string representation.
fn map_keycode_to_string(keycode: winit::keyboard::KeyCode) -> String {
    format!("{keycode:?}")
}

/// (Internal) Maps a `winit::event::MouseButton` to the engine's enum.
fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

type HookFn = Box<dyn FnMut(&mut TickContext<'_>)>;

/// Drives the engine inside winit's event loop.
///
/// winit owns the thread, so this host is the cooperative single-loop
/// collapse of the two execution contexts described by the concurrency
/// model: every loop iteration interleaves input work (event translation
/// into the queue) and frame work (one engine step).
pub struct WinitHost {
    config: CoreConfig,
    on_tick: Option<HookFn>,
    on_exit: Option<HookFn>,
    scheduler: Option<Box<dyn Scheduler>>,
    exit: ExitRequest,
    engine: Option<Engine>,
    window: Option<PlatformWindow>,
    input_governor: FrequencyGovernor,
    applied_title: String,
    fatal: Option<anyhow::Error>,
}

impl WinitHost {
    /// Creates a host for the given configuration.
    ///
    /// The host is the external driver of the frame loop, so the loop mode
    /// is forced to [`LoopMode::External`].
    pub fn new(mut config: CoreConfig) -> Self {
        if config.loop_mode != LoopMode::External {
            log::debug!("winit drives the loop; overriding loop mode to External.");
            config.loop_mode = LoopMode::External;
        }
        let input_governor = FrequencyGovernor::new(config.input_rate);
        let applied_title = config.title.clone();
        Self {
            config,
            on_tick: None,
            on_exit: None,
            scheduler: None,
            exit: ExitRequest::new(),
            engine: None,
            window: None,
            input_governor,
            applied_title,
            fatal: None,
        }
    }

    /// Registers the per-frame application callback.
    pub fn on_tick<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TickContext<'_>) + 'static,
    {
        self.on_tick = Some(Box::new(callback));
        self
    }

    /// Registers the exit callback.
    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&mut TickContext<'_>) + 'static,
    {
        self.on_exit = Some(Box::new(callback));
        self
    }

    /// Attaches an external scheduler for the engine's named signals.
    pub fn with_scheduler(mut self, scheduler: Box<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// A cloneable exit handle, available before the engine exists (e.g.
    /// for a Ctrl-C handler).
    pub fn exit_request(&self) -> ExitRequest {
        self.exit.clone()
    }

    /// Iterations the input pump completed in the last measured second.
    pub fn input_rate(&self) -> u32 {
        self.input_governor.rate()
    }

    /// Runs the event loop to completion.
    ///
    /// Returns the fatal error when startup or a frame failed; the caller
    /// (usually `main`) terminates with the diagnostic.
    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.run_app(&mut self)?;
        match self.fatal.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = PlatformWindow::new(event_loop, &self.config)?;
        let backend = WgpuBackend::new(&window)?;
        let mut engine = Engine::new(self.config.clone(), Box::new(backend), self.exit.clone());

        let size = window.inner_size();
        if let Some(state) = engine.window_mut() {
            state.set_size(size.width, size.height);
            state.set_refresh_rate(window.refresh_rate());
        }
        if let Some(on_tick) = self.on_tick.take() {
            engine.on_tick(on_tick);
        }
        if let Some(on_exit) = self.on_exit.take() {
            engine.on_exit(on_exit);
        }
        if let Some(scheduler) = self.scheduler.take() {
            engine.set_scheduler(scheduler);
        }

        engine.start()?;
        self.input_governor.start();
        self.engine = Some(engine);
        self.window = Some(window);
        Ok(())
    }

    /// Mirrors core-side window attributes back to the native window.
    fn sync_window(&mut self) {
        let (Some(engine), Some(window)) = (self.engine.as_ref(), self.window.as_ref()) else {
            return;
        };
        if let Some(state) = engine.window() {
            if state.title() != self.applied_title {
                self.applied_title = state.title().to_string();
                window.set_title(&self.applied_title);
            }
        }
        window.request_redraw();
    }
}

impl ApplicationHandler for WinitHost {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            log::error!("Fatal startup error: {error:#}");
            self.fatal = Some(error);
            event_loop.exit();
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, _cause: StartCause) {
        // One input-pump iteration begins.
        if self.engine.is_some() {
            self.input_governor.tick();
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(engine) = self.engine.as_ref() else {
            return;
        };
        if let Some(translated) = translate_window_event(&event) {
            engine.events().push(translated);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        if let Err(error) = engine.step() {
            log::error!("Fatal frame error: {error:#}");
            self.fatal = Some(error);
            event_loop.exit();
            return;
        }
        if engine.state() == LifecycleState::Deinitializing {
            engine.deinit();
        }
        if engine.is_exited() {
            event_loop.exit();
            return;
        }

        let deadline = engine.frame_deadline();
        self.sync_window();
        match deadline {
            Some(deadline) => event_loop.set_control_flow(ControlFlow::WaitUntil(deadline)),
            None => event_loop.set_control_flow(ControlFlow::Poll),
        }
    }
}

impl std::fmt::Debug for WinitHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WinitHost")
            .field("engine", &self.engine)
            .field("applied_title", &self.applied_title)
            .finish_non_exhaustive()
    }
}
