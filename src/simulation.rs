//! Windowed runner.
//!
//! [`Simulation`] owns the configuration; [`Simulation::run`] opens a window,
//! sets up the GPU passes and drives one simulation step per redraw.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::config::ChainConfig;
use crate::error::ChainError;
use crate::gpu::{FrameInput, GpuState};
use crate::input::{Pointer, Viewport};
use crate::time::FrameClock;

const TITLE: &str = "ropeline";

/// A rope chain following the pointer.
///
/// ```ignore
/// use ropeline::{ChainConfig, Simulation};
///
/// Simulation::new(ChainConfig::default().with_point_count(201)).run()?;
/// ```
pub struct Simulation {
    config: ChainConfig,
}

impl Simulation {
    /// Create a simulation. Out-of-range settings are repaired here.
    pub fn new(config: ChainConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Open the window and run until it is closed.
    pub fn run(self) -> Result<(), ChainError> {
        log::info!(
            "Starting chain: {} points, {} ribbon segments, spacing {}",
            self.config.point_count,
            self.config.render_points,
            self.config.spacing
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config);
        event_loop.run_app(&mut app)?;

        match app.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(ChainConfig::default())
    }
}

struct App {
    config: ChainConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    pointer: Pointer,
    clock: FrameClock,
    show_debug: bool,
    last_title_fps: f32,
    /// Startup error raised inside the event loop, returned from `run`.
    failure: Option<ChainError>,
}

impl App {
    fn new(config: ChainConfig) -> Self {
        let clock = match config.fixed_delta {
            Some(delta) => FrameClock::with_fixed_delta(delta),
            None => FrameClock::new(),
        };
        Self {
            show_debug: config.debug_view,
            config,
            window: None,
            gpu_state: None,
            pointer: Pointer::default(),
            clock,
            last_title_fps: 0.0,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), ChainError> {
        let window_attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(winit::dpi::LogicalSize::new(800, 800));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let size = window.inner_size();
        self.pointer.set_viewport(Viewport::new(size.width, size.height));

        let gpu_state = pollster::block_on(GpuState::new(window.clone(), self.config.clone()))?;
        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::KeyD) => {
                self.show_debug = !self.show_debug;
                log::debug!("Debug strip {}", if self.show_debug { "on" } else { "off" });
            }
            PhysicalKey::Code(KeyCode::Space) => {
                self.clock.toggle_pause();
                log::info!("{}", if self.clock.is_paused() { "Paused" } else { "Resumed" });
            }
            PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let tick = self.clock.advance();
        let input = FrameInput {
            pointer: self.pointer.state(),
            time: tick.map(|t| t.elapsed),
            show_debug: self.show_debug,
        };

        match gpu_state.render(&input) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu_state.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, exiting");
                event_loop.exit();
            }
            Err(e) => log::warn!("Dropped frame: {e:?}"),
        }

        if let Some(tick) = tick {
            if tick.frame % 600 == 0 {
                log::debug!(
                    "frame {} at {:.2}s, {} steps on GPU",
                    tick.frame,
                    tick.elapsed,
                    gpu_state.frame()
                );
            }
        }

        let fps = self.clock.fps();
        if fps != self.last_title_fps {
            self.last_title_fps = fps;
            if let Some(window) = &self.window {
                window.set_title(&format!("{TITLE} - {fps:.0} fps"));
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if self.pointer.handle_event(&event) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.handle_key(event_loop, &event);
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
