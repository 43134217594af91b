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

//! The engine orchestrator.
//!
//! [`Engine`] owns the lifecycle state machine, advances one frame per
//! [`step`], reconciles the presentation surface after each present, and
//! releases everything in a fixed order at teardown. It can drive its own
//! blocking loop ([`run`]) or be stepped by an external driver; both
//! produce identical state-machine behavior.
//!
//! [`step`]: Engine::step
//! [`run`]: Engine::run

use std::sync::Arc;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};

use crate::core::config::{CoreConfig, LoopMode};
use crate::core::frequency::FrequencyGovernor;
use crate::core::schedule::{ExitRequest, NullScheduler, Scheduler, Signal};
use crate::event::{Event, EventQueue};
use crate::graphics::error::PresentError;
use crate::graphics::surface::{ReleaseTrace, SurfaceDescriptor, SurfaceUsage, SyncMode};
use crate::graphics::traits::GraphicsBackend;
use crate::input::InputState;
use crate::window::Window;

/// Overall run state of the core.
///
/// The machine starts in `Running` when [`Engine::start`] succeeds and is
/// terminal in `Exited`. Every transition happens on the frame context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Ticking normally.
    Running,
    /// Exit was observed; the in-flight frame is draining.
    Exiting,
    /// The exit callback has run; waiting for the application's
    /// teardown-complete signal ([`Engine::deinit`]).
    Deinitializing,
    /// All resources released. Terminal.
    Exited,
}

/// What a tick or exit callback gets to see and touch.
pub struct TickContext<'a> {
    /// The events drained from the queue this frame, in FIFO order.
    pub events: &'a [Event],
    /// Snapshot of the input state derived from every pushed event.
    pub input: &'a InputState,
    /// The application window's core-owned attributes.
    pub window: &'a mut Window,
    /// Frames measured in the last completed second.
    pub frame_rate: u32,
    /// Handle for requesting a cooperative shutdown.
    pub exit: &'a ExitRequest,
}

type HookFn = Box<dyn FnMut(&mut TickContext<'_>)>;

enum Hook {
    Tick,
    Exit,
}

/// The runtime core: lifecycle, pacing, input draining, presentation.
pub struct Engine {
    config: CoreConfig,
    state: LifecycleState,
    started: bool,
    backend: Box<dyn GraphicsBackend>,
    scheduler: Box<dyn Scheduler>,
    on_tick: Option<HookFn>,
    on_exit: Option<HookFn>,
    events: Arc<EventQueue>,
    frame_governor: FrequencyGovernor,
    windows: Vec<Window>,
    surface: SurfaceDescriptor,
    surface_dirty: bool,
    sync_mode: SyncMode,
    exit: ExitRequest,
    release_trace: ReleaseTrace,
    drained: Vec<Event>,
}

impl Engine {
    /// Creates the core around an acquired graphics backend.
    ///
    /// ## Arguments
    /// * `config` - Static configuration, including the loop mode.
    /// * `backend` - The already-acquired graphics backend (the GPU
    ///   acquisition sequence runs before the core exists).
    /// * `exit` - The shared exit-request handle.
    pub fn new(config: CoreConfig, backend: Box<dyn GraphicsBackend>, exit: ExitRequest) -> Self {
        let events = Arc::new(EventQueue::new(config.event_queue_capacity));
        let window = Window::new(
            config.title.clone(),
            config.width,
            config.height,
            config.fullscreen,
        );
        let surface = SurfaceDescriptor {
            width: config.width,
            height: config.height,
            format: backend.preferred_format(),
            present_mode: config.sync_mode.present_mode(),
            usage: SurfaceUsage::RENDER_ATTACHMENT,
        };
        Self {
            sync_mode: config.sync_mode,
            config,
            state: LifecycleState::Running,
            started: false,
            backend,
            scheduler: Box::new(NullScheduler),
            on_tick: None,
            on_exit: None,
            events,
            frame_governor: FrequencyGovernor::new(0),
            windows: vec![window],
            surface,
            surface_dirty: false,
            exit,
            release_trace: ReleaseTrace::new(),
            drained: Vec::new(),
        }
    }

    /// Registers the per-frame application callback. Required before
    /// [`start`](Engine::start).
    pub fn on_tick<F>(&mut self, callback: F)
    where
        F: FnMut(&mut TickContext<'_>) + 'static,
    {
        self.on_tick = Some(Box::new(callback));
    }

    /// Registers the exit callback, invoked once after the final frame has
    /// presented. Required before [`start`](Engine::start).
    pub fn on_exit<F>(&mut self, callback: F)
    where
        F: FnMut(&mut TickContext<'_>) + 'static,
    {
        self.on_exit = Some(Box::new(callback));
    }

    /// Attaches the external dispatch substrate the core schedules its
    /// named signals into.
    pub fn set_scheduler(&mut self, scheduler: Box<dyn Scheduler>) {
        self.scheduler = scheduler;
    }

    /// Finishes startup: applies the pacing policy, creates the initial
    /// swapchain, opens the measurement window, and begins scheduling
    /// ticks.
    ///
    /// ## Returns
    /// An error when either application callback is missing (a fatal
    /// configuration error) or the initial swapchain cannot be created.
    pub fn start(&mut self) -> Result<()> {
        assert!(!self.started, "Engine::start called twice");
        if self.on_tick.is_none() || self.on_exit.is_none() {
            bail!("Both the on-tick and on-exit callbacks must be registered before start()");
        }

        self.surface.present_mode = self.sync_mode.present_mode();
        self.frame_governor
            .set_target(self.sync_mode.target_rate(self.refresh_rate()));

        let (width, height) = self.windows.first().map(Window::size).unwrap_or((0, 0));
        self.surface.width = width.max(1);
        self.surface.height = height.max(1);
        self.backend
            .create_swapchain(&self.surface)
            .context("Failed to create the initial swapchain")?;
        if let Some(window) = self.windows.first_mut() {
            window.mirror_framebuffer(&self.surface);
        }

        self.frame_governor.start();
        self.state = LifecycleState::Running;
        self.started = true;
        self.scheduler.schedule(Signal::Started);
        self.scheduler.schedule(Signal::PresentFrame);
        log::info!("Core started ({width}x{height}, {:?}).", self.sync_mode);
        Ok(())
    }

    /// Advances exactly one frame on the frame context.
    ///
    /// Drains the event queue, runs the tick callback, presents, reconciles
    /// the surface, advances the governor, and walks the lifecycle
    /// transition table for "frame completed".
    ///
    /// Panics when called past `Exiting`: that is a broken driver
    /// contract, not an environmental failure.
    pub fn step(&mut self) -> Result<()> {
        assert!(self.started, "Engine::step called before start()");
        match self.state {
            LifecycleState::Exited => panic!(
                "Frame advanced after the lifecycle reached Exited; the driver must stop stepping"
            ),
            LifecycleState::Deinitializing => panic!(
                "Frame advanced while deinitializing; deinit() must run before anything else"
            ),
            LifecycleState::Running | LifecycleState::Exiting => {}
        }

        self.drain_events();
        if self.events.check_and_clear_oom() {
            log::warn!("Input event queue overflowed; events may have been dropped.");
        }

        self.run_hook(Hook::Tick);

        assert!(
            self.windows.len() == 1,
            "Exactly one window is supported at presentation time (found {})",
            self.windows.len()
        );
        match self.backend.present() {
            Ok(()) => {}
            Err(PresentError::Outdated) | Err(PresentError::Lost) => {
                log::warn!("Swapchain lost or outdated; scheduling a surface rebuild.");
                self.surface_dirty = true;
            }
            Err(PresentError::Timeout) => {
                log::warn!("Timed out acquiring a presentation texture; skipping the frame.");
            }
            Err(error) => {
                return Err(anyhow!(error).context("Fatal presentation failure"));
            }
        }

        self.reconcile_surface()?;
        self.frame_governor.tick();
        self.finish_frame();
        Ok(())
    }

    /// The application's teardown-complete signal.
    ///
    /// Releases every owned resource in the fixed order (swapchain,
    /// queue, device, surface, adapter, instance, platform/window, event
    /// storage) and moves the machine to `Exited`. Legal only in
    /// `Deinitializing`; anything else is a broken caller invariant and
    /// panics.
    pub fn deinit(&mut self) {
        assert!(
            self.state == LifecycleState::Deinitializing,
            "deinit() is only legal in the Deinitializing state (current: {:?})",
            self.state
        );
        let mut trace = ReleaseTrace::new();
        self.backend.shutdown(&mut trace);
        self.windows.clear();
        trace.record("platform");
        self.events.release_storage();
        trace.record("events");
        self.release_trace = trace;
        self.state = LifecycleState::Exited;
        log::info!(
            "Teardown complete; release order: {:?}.",
            self.release_trace.entries()
        );
    }

    /// Drives the blocking dispatch loop until the machine reaches
    /// `Exited`, pacing against the frame governor's deadline.
    ///
    /// Requires [`LoopMode::Blocking`]; an external driver calls
    /// [`step`](Engine::step) and [`deinit`](Engine::deinit) itself
    /// instead.
    pub fn run(&mut self) -> Result<()> {
        if self.config.loop_mode != LoopMode::Blocking {
            bail!(
                "run() drives the blocking loop; configure LoopMode::Blocking \
                 or call step() from an external driver"
            );
        }
        if !self.started {
            self.start()?;
        }
        loop {
            self.step()?;
            if self.state == LifecycleState::Deinitializing {
                // The exit callback is synchronous, so its return is the
                // application's teardown-complete moment in blocking mode.
                self.deinit();
            }
            if self.state == LifecycleState::Exited {
                break;
            }
            if let Some(deadline) = self.frame_governor.next_deadline() {
                let now = Instant::now();
                if deadline > now {
                    thread::sleep(deadline - now);
                }
            }
        }
        Ok(())
    }

    /// Entry point for signals consumed from the external scheduler.
    pub fn dispatch(&mut self, signal: Signal) -> Result<()> {
        match signal {
            Signal::Start => self.start(),
            Signal::Update => Ok(()),
            Signal::PresentFrame => self.step(),
            Signal::Exit => {
                self.exit.request();
                Ok(())
            }
            Signal::Deinit => {
                self.deinit();
                Ok(())
            }
            Signal::Started | Signal::FrameFinished => {
                log::warn!("Signal {signal:?} is emitted by the core, never consumed.");
                Ok(())
            }
        }
    }

    /// Changes the presentation sync mode; the swapchain is rebuilt lazily
    /// on the next frame.
    pub fn set_sync_mode(&mut self, mode: SyncMode) {
        if self.sync_mode != mode {
            log::info!("Sync mode changed: {:?} -> {mode:?}.", self.sync_mode);
        }
        self.sync_mode = mode;
        self.surface_dirty = true;
    }

    /// The current sync mode.
    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    /// The current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the machine has reached its terminal state.
    pub fn is_exited(&self) -> bool {
        self.state == LifecycleState::Exited
    }

    /// The shared event queue; clone the `Arc` into input producers.
    pub fn events(&self) -> Arc<EventQueue> {
        Arc::clone(&self.events)
    }

    /// A cloneable handle for requesting shutdown from anywhere.
    pub fn exit_request(&self) -> ExitRequest {
        self.exit.clone()
    }

    /// The application window, until teardown releases it.
    pub fn window(&self) -> Option<&Window> {
        self.windows.first()
    }

    /// Mutable access to the application window.
    pub fn window_mut(&mut self) -> Option<&mut Window> {
        self.windows.first_mut()
    }

    /// Frames measured in the last completed second.
    pub fn frame_rate(&self) -> u32 {
        self.frame_governor.rate()
    }

    /// The frame governor's current target (0 = unlimited).
    pub fn frame_target(&self) -> u32 {
        self.frame_governor.target()
    }

    /// The instant the next frame should wait for, if the loop is paced.
    pub fn frame_deadline(&self) -> Option<Instant> {
        self.frame_governor.next_deadline()
    }

    /// The live surface description the presentation step reads.
    pub fn surface_descriptor(&self) -> &SurfaceDescriptor {
        &self.surface
    }

    /// The release order recorded by the last teardown.
    pub fn release_trace(&self) -> &ReleaseTrace {
        &self.release_trace
    }

    /// Pops every queued event, reacting to the window-level ones.
    fn drain_events(&mut self) {
        self.drained.clear();
        while let Some(event) = self.events.pop() {
            match &event {
                Event::WindowResized { width, height } => {
                    if let Some(window) = self.windows.first_mut() {
                        window.set_size(*width, *height);
                    }
                    self.surface_dirty = true;
                }
                Event::SyncModeChanged { mode } => {
                    self.sync_mode = *mode;
                    self.surface_dirty = true;
                }
                Event::CloseRequested => self.exit.request(),
                _ => {}
            }
            self.drained.push(event);
        }
    }

    /// Walks the "frame completed" row of the transition table.
    fn finish_frame(&mut self) {
        self.scheduler.schedule(Signal::FrameFinished);
        match self.state {
            LifecycleState::Running => {
                if self.exit.is_requested() {
                    log::info!("Exit requested; draining the in-flight frame before teardown.");
                    self.state = LifecycleState::Exiting;
                }
                self.scheduler.schedule(Signal::PresentFrame);
            }
            LifecycleState::Exiting => {
                self.state = LifecycleState::Deinitializing;
                // The exit callback is scheduled instead of the next tick:
                // it must observe a fully drained frame.
                self.scheduler.schedule(Signal::Exit);
                self.run_hook(Hook::Exit);
            }
            LifecycleState::Deinitializing | LifecycleState::Exited => {
                unreachable!("guarded at step entry")
            }
        }
    }

    /// Rebuilds the swapchain lazily when something invalidated it.
    fn reconcile_surface(&mut self) -> Result<()> {
        if !self.surface_dirty {
            return Ok(());
        }
        self.surface_dirty = false;

        self.surface.present_mode = self.sync_mode.present_mode();
        self.frame_governor
            .set_target(self.sync_mode.target_rate(self.refresh_rate()));

        let (width, height) = self.windows.first().map(Window::size).unwrap_or((0, 0));
        if width == 0 || height == 0 {
            // Zero-sized swapchains are backend errors; keep the stale one
            // until a usable size shows up.
            log::debug!("Window size is {width}x{height}; deferring swapchain rebuild.");
            return Ok(());
        }

        self.surface.width = width;
        self.surface.height = height;
        self.backend.release_swapchain();
        self.backend
            .create_swapchain(&self.surface)
            .context("Failed to rebuild the swapchain")?;
        if let Some(window) = self.windows.first_mut() {
            window.mirror_framebuffer(&self.surface);
        }
        log::info!(
            "Swapchain rebuilt: {width}x{height} ({:?}, {:?}).",
            self.surface.format,
            self.surface.present_mode
        );
        Ok(())
    }

    fn refresh_rate(&self) -> u32 {
        self.windows
            .first()
            .and_then(Window::refresh_rate)
            .unwrap_or(self.config.fallback_refresh_rate)
    }

    fn run_hook(&mut self, which: Hook) {
        let mut hook = match which {
            Hook::Tick => self.on_tick.take(),
            Hook::Exit => self.on_exit.take(),
        };
        if let Some(callback) = hook.as_mut() {
            let input = self.events.input_state();
            let frame_rate = self.frame_governor.rate();
            if let Some(window) = self.windows.first_mut() {
                let mut context = TickContext {
                    events: &self.drained,
                    input: &input,
                    window,
                    frame_rate,
                    exit: &self.exit,
                };
                callback(&mut context);
            }
        }
        match which {
            Hook::Tick => self.on_tick = hook,
            Hook::Exit => self.on_exit = hook,
        }
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("started", &self.started)
            .field("sync_mode", &self.sync_mode)
            .field("surface", &self.surface)
            .field("windows", &self.windows.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::surface::{PresentMode, SurfaceFormat};
    use crate::input::MouseButton;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;
    use std::sync::Mutex;

    /// Backend double that records every call and can inject present
    /// failures.
    #[derive(Debug, Default)]
    struct RecordingBackend {
        calls: Arc<Mutex<Vec<String>>>,
        present_failures: Arc<Mutex<VecDeque<PresentError>>>,
    }

    impl RecordingBackend {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let backend = Self::default();
            let calls = Arc::clone(&backend.calls);
            (backend, calls)
        }
    }

    impl GraphicsBackend for RecordingBackend {
        fn preferred_format(&self) -> SurfaceFormat {
            SurfaceFormat::Bgra8UnormSrgb
        }

        fn create_swapchain(&mut self, descriptor: &SurfaceDescriptor) -> Result<()> {
            self.calls.lock().unwrap().push(format!(
                "create {}x{} {:?}",
                descriptor.width, descriptor.height, descriptor.present_mode
            ));
            Ok(())
        }

        fn release_swapchain(&mut self) {
            self.calls.lock().unwrap().push("release".to_string());
        }

        fn present(&mut self) -> Result<(), PresentError> {
            self.calls.lock().unwrap().push("present".to_string());
            match self.present_failures.lock().unwrap().pop_front() {
                Some(error) => Err(error),
                None => Ok(()),
            }
        }

        fn shutdown(&mut self, trace: &mut ReleaseTrace) {
            for resource in ["swapchain", "queue", "device", "surface", "adapter", "instance"] {
                trace.record(resource);
            }
            self.calls.lock().unwrap().push("shutdown".to_string());
        }
    }

    struct RecordingScheduler(Arc<Mutex<Vec<Signal>>>);

    impl Scheduler for RecordingScheduler {
        fn schedule(&mut self, signal: Signal) {
            self.0.lock().unwrap().push(signal);
        }
    }

    fn test_config() -> CoreConfig {
        CoreConfig {
            title: "test".to_string(),
            ..CoreConfig::default()
        }
    }

    fn engine_with_hooks() -> (Engine, Arc<Mutex<Vec<String>>>) {
        let (backend, calls) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        engine.on_tick(|_| {});
        engine.on_exit(|_| {});
        (engine, calls)
    }

    /// Omitting either application callback is a fatal configuration error
    /// at start time.
    #[test]
    fn start_requires_both_hooks() {
        let (backend, _) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        assert!(engine.start().is_err());

        engine.on_tick(|_| {});
        assert!(engine.start().is_err(), "on_exit is still missing");

        engine.on_exit(|_| {});
        assert!(engine.start().is_ok());
    }

    /// Requesting exit leaves the state untouched until the current frame
    /// completes, then walks Exiting -> Deinitializing -> Exited.
    #[test]
    fn lifecycle_walks_exit_sequence() {
        let (backend, _) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        let ticks = Rc::new(Cell::new(0u32));
        let exits = Rc::new(Cell::new(0u32));
        engine.on_tick({
            let ticks = Rc::clone(&ticks);
            move |_| ticks.set(ticks.get() + 1)
        });
        engine.on_exit({
            let exits = Rc::clone(&exits);
            move |_| exits.set(exits.get() + 1)
        });
        engine.start().unwrap();
        engine.step().unwrap();
        assert_eq!(engine.state(), LifecycleState::Running);

        engine.exit_request().request();
        assert_eq!(
            engine.state(),
            LifecycleState::Running,
            "The request alone must not change state"
        );

        engine.step().unwrap();
        assert_eq!(engine.state(), LifecycleState::Exiting);
        assert_eq!(exits.get(), 0);

        engine.step().unwrap();
        assert_eq!(engine.state(), LifecycleState::Deinitializing);
        assert_eq!(exits.get(), 1, "The exit callback runs exactly once");
        assert_eq!(ticks.get(), 3, "Every frame up to teardown still ticks");

        engine.deinit();
        assert_eq!(engine.state(), LifecycleState::Exited);
        assert!(engine.is_exited());
    }

    /// Advancing a frame past Exited is a broken driver contract.
    #[test]
    #[should_panic(expected = "after the lifecycle reached Exited")]
    fn step_after_exited_panics() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.exit_request().request();
        engine.step().unwrap(); // -> Exiting
        engine.step().unwrap(); // -> Deinitializing
        engine.deinit();
        let _ = engine.step();
    }

    /// The teardown-complete signal is only legal while deinitializing.
    #[test]
    #[should_panic(expected = "only legal in the Deinitializing state")]
    fn deinit_outside_deinitializing_panics() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.deinit();
    }

    /// Teardown releases in the fixed order, backend resources first, then
    /// platform and event storage.
    #[test]
    fn teardown_releases_in_fixed_order() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.exit_request().request();
        engine.step().unwrap();
        engine.step().unwrap();
        engine.deinit();

        assert_eq!(
            engine.release_trace().entries(),
            &[
                "swapchain",
                "queue",
                "device",
                "surface",
                "adapter",
                "instance",
                "platform",
                "events"
            ]
        );
        assert!(engine.window().is_none(), "Window state is released");
    }

    /// The core emits Started once, FrameFinished per frame, and schedules
    /// the exit signal instead of a tick once the drain frame completes.
    #[test]
    fn signal_trace_matches_lifecycle() {
        let (backend, _) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        engine.on_tick(|_| {});
        engine.on_exit(|_| {});
        let signals = Arc::new(Mutex::new(Vec::new()));
        engine.set_scheduler(Box::new(RecordingScheduler(Arc::clone(&signals))));

        engine.start().unwrap();
        engine.step().unwrap();
        assert_eq!(
            signals.lock().unwrap().as_slice(),
            &[
                Signal::Started,
                Signal::PresentFrame,
                Signal::FrameFinished,
                Signal::PresentFrame
            ]
        );

        engine.exit_request().request();
        engine.step().unwrap(); // Running -> Exiting, still schedules a tick
        engine.step().unwrap(); // Exiting -> Deinitializing, schedules Exit
        assert_eq!(
            signals.lock().unwrap().as_slice(),
            &[
                Signal::Started,
                Signal::PresentFrame,
                Signal::FrameFinished,
                Signal::PresentFrame,
                Signal::FrameFinished,
                Signal::PresentFrame,
                Signal::FrameFinished,
                Signal::Exit
            ]
        );
    }

    /// Triple buffering on a 60 Hz display pins the frame target to 120;
    /// the present mode follows the sync mode.
    #[test]
    fn triple_buffering_pins_frame_target() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine
            .window_mut()
            .expect("window exists while running")
            .set_refresh_rate(Some(60));

        engine.set_sync_mode(SyncMode::Triple);
        engine.step().unwrap();
        assert_eq!(engine.frame_target(), 120);
        assert_eq!(engine.surface_descriptor().present_mode, PresentMode::Mailbox);

        engine.set_sync_mode(SyncMode::None);
        engine.step().unwrap();
        assert_eq!(engine.frame_target(), 0);
        assert_eq!(
            engine.surface_descriptor().present_mode,
            PresentMode::Immediate
        );
    }

    /// A degenerate (zero) size defers the rebuild and leaves the prior
    /// swapchain dimensions in place; a usable size catches up later.
    #[test]
    fn degenerate_resize_defers_swapchain_rebuild() {
        let (mut engine, calls) = engine_with_hooks();
        engine.start().unwrap();
        assert_eq!(engine.surface_descriptor().width, 1024);

        engine.events().push(Event::WindowResized {
            width: 0,
            height: 600,
        });
        engine.step().unwrap();
        assert_eq!(
            engine.surface_descriptor().width,
            1024,
            "Prior swapchain dimensions stay while minimized"
        );
        assert_eq!(
            calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| c.starts_with("create"))
                .count(),
            1,
            "Only the initial swapchain was created"
        );

        engine.events().push(Event::WindowResized {
            width: 800,
            height: 600,
        });
        engine.step().unwrap();
        assert_eq!(engine.surface_descriptor().width, 800);
        assert_eq!(engine.surface_descriptor().height, 600);
        assert_eq!(
            engine
                .window()
                .expect("window exists while running")
                .framebuffer_size(),
            (800, 600),
            "Framebuffer attributes mirror the new swapchain"
        );
    }

    /// A sync-mode-change event through the queue triggers the same lazy
    /// reconciliation as the direct setter.
    #[test]
    fn sync_mode_event_reconciles_surface() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.events().push(Event::SyncModeChanged {
            mode: SyncMode::None,
        });
        engine.step().unwrap();
        assert_eq!(engine.sync_mode(), SyncMode::None);
        assert_eq!(
            engine.surface_descriptor().present_mode,
            PresentMode::Immediate
        );
        assert_eq!(engine.frame_target(), 0);
    }

    /// A close request flows through the queue into the exit flag and is
    /// consumed at the same frame's completion.
    #[test]
    fn close_request_starts_exit_sequence() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.events().push(Event::CloseRequested);
        engine.step().unwrap();
        assert_eq!(engine.state(), LifecycleState::Exiting);
    }

    /// The tick callback observes the frame's drained events and the input
    /// snapshot.
    #[test]
    fn tick_context_exposes_events_and_input() {
        let (backend, _) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        let observed = Rc::new(Cell::new(false));
        engine.on_tick({
            let observed = Rc::clone(&observed);
            move |ctx| {
                if ctx
                    .events
                    .iter()
                    .any(|e| matches!(e, Event::MouseButtonPressed { .. }))
                    && ctx.input.is_button_pressed(MouseButton::Left)
                {
                    observed.set(true);
                }
            }
        });
        engine.on_exit(|_| {});
        engine.start().unwrap();

        engine.events().push(Event::MouseButtonPressed {
            button: MouseButton::Left,
        });
        engine.step().unwrap();
        assert!(observed.get());
    }

    /// An outdated swapchain at present time re-raises the reconcile flag
    /// and the surface is rebuilt the same frame.
    #[test]
    fn outdated_present_triggers_rebuild() {
        let (backend, calls) = RecordingBackend::new();
        backend
            .present_failures
            .lock()
            .unwrap()
            .push_back(PresentError::Outdated);
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        engine.on_tick(|_| {});
        engine.on_exit(|_| {});
        engine.start().unwrap();

        engine.step().unwrap();
        let recorded = calls.lock().unwrap();
        assert!(recorded.iter().any(|c| c == "release"));
        assert_eq!(
            recorded.iter().filter(|c| c.starts_with("create")).count(),
            2,
            "Initial creation plus the rebuild after the outdated present"
        );
    }

    /// Out-of-memory at present time is fatal, not retried.
    #[test]
    fn oom_present_is_fatal() {
        let (backend, _) = RecordingBackend::new();
        backend
            .present_failures
            .lock()
            .unwrap()
            .push_back(PresentError::OutOfMemory);
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        engine.on_tick(|_| {});
        engine.on_exit(|_| {});
        engine.start().unwrap();
        assert!(engine.step().is_err());
    }

    /// Presenting with more than one title-bearing window is a fatal
    /// invariant violation.
    #[test]
    #[should_panic(expected = "Exactly one window")]
    fn multiple_windows_at_presentation_panic() {
        let (mut engine, _) = engine_with_hooks();
        engine.start().unwrap();
        engine.windows.push(Window::new("second", 100, 100, false));
        let _ = engine.step();
    }

    /// The blocking loop runs start-to-exit on its own and invokes the
    /// callbacks the expected number of times.
    #[test]
    fn blocking_run_completes_lifecycle() {
        let (backend, _) = RecordingBackend::new();
        let mut engine = Engine::new(test_config(), Box::new(backend), ExitRequest::new());
        let ticks = Rc::new(Cell::new(0u32));
        let exits = Rc::new(Cell::new(0u32));
        engine.on_tick({
            let ticks = Rc::clone(&ticks);
            move |ctx| {
                ticks.set(ticks.get() + 1);
                if ticks.get() == 3 {
                    ctx.exit.request();
                }
            }
        });
        engine.on_exit({
            let exits = Rc::clone(&exits);
            move |_| exits.set(exits.get() + 1)
        });

        engine.run().unwrap();
        assert!(engine.is_exited());
        // The request lands during frame 3; that frame completes into
        // Exiting, frame 4 drains, then the exit callback runs.
        assert_eq!(ticks.get(), 4);
        assert_eq!(exits.get(), 1);
    }

    /// run() refuses to drive the loop when an external driver owns it.
    #[test]
    fn run_requires_blocking_mode() {
        let (backend, _) = RecordingBackend::new();
        let config = CoreConfig {
            loop_mode: LoopMode::External,
            ..test_config()
        };
        let mut engine = Engine::new(config, Box::new(backend), ExitRequest::new());
        engine.on_tick(|_| {});
        engine.on_exit(|_| {});
        assert!(engine.run().is_err());
    }

    /// The dispatch entry point maps consumed signals onto core
    /// operations.
    #[test]
    fn dispatch_maps_signals() {
        let (mut engine, _) = engine_with_hooks();
        engine.dispatch(Signal::Start).unwrap();
        engine.dispatch(Signal::Update).unwrap();
        engine.dispatch(Signal::PresentFrame).unwrap();
        engine.dispatch(Signal::Exit).unwrap();
        engine.dispatch(Signal::PresentFrame).unwrap(); // -> Exiting
        engine.dispatch(Signal::PresentFrame).unwrap(); // -> Deinitializing
        engine.dispatch(Signal::Deinit).unwrap();
        assert!(engine.is_exited());
    }
}
