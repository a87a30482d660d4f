//! GPU side of the chain: surface, device, and the passes recorded each frame.

mod debug_pass;
mod ribbon_pass;
mod simulate_pass;
mod state_store;

use std::sync::Arc;

use winit::window::Window;

use debug_pass::DebugPass;
use ribbon_pass::RibbonPass;
use simulate_pass::SimulatePass;
use state_store::StateStore;

use crate::config::ChainConfig;
use crate::error::GpuError;
use crate::input::{PointerState, Viewport};
use crate::state::{seed_positions, to_texels};
use crate::uniforms::{DebugParams, RibbonParams, SimParams};

/// Per-frame inputs to [`GpuState::render`].
#[derive(Debug, Clone, Copy)]
pub struct FrameInput {
    pub pointer: PointerState,
    /// Elapsed seconds for the idle motion. `None` skips the simulation
    /// step and redraws the current state.
    pub time: Option<f32>,
    pub show_debug: bool,
}

pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    chain: ChainConfig,
    state: StateStore,
    simulate: SimulatePass,
    ribbon: RibbonPass,
    debug: DebugPass,
}

impl GpuState {
    pub async fn new(window: Arc<Window>, chain: ChainConfig) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::IncompatibleSurface)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        log::info!("Surface format {surface_format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let texels = to_texels(&seed_positions(&chain));
        let state = StateStore::new(&device, &queue, &texels)?;

        let viewport = Viewport::new(config.width, config.height);
        let simulate = SimulatePass::new(
            &device,
            &state,
            &SimParams::new(&chain, PointerState::default(), viewport, 0.0),
        );
        let ribbon = RibbonPass::new(&device, config.format, &state, &RibbonParams::new(&chain, viewport));
        let debug = DebugPass::new(&device, config.format, &state, &DebugParams::new(&chain));

        Ok(Self {
            surface,
            device,
            queue,
            config,
            chain,
            state,
            simulate,
            ribbon,
            debug,
        })
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.config.width, self.config.height)
    }

    /// Simulation steps submitted so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.state.buffers().frame()
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface with its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Record and submit one frame: simulation step, ribbon, debug strip.
    ///
    /// The state buffers are swapped only once the step has been submitted,
    /// so a failed surface acquisition leaves the chain untouched.
    pub fn render(&mut self, input: &FrameInput) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let viewport = self.viewport();
        let roles = self.state.buffers().roles();
        self.ribbon
            .update(&self.queue, &RibbonParams::new(&self.chain, viewport));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Draw what the step writes, or the current state while paused
        let draw_slot = match input.time {
            Some(time) => {
                let params = SimParams::new(&self.chain, input.pointer, viewport, time);
                self.simulate.update(&self.queue, &params);
                self.simulate
                    .encode(&mut encoder, roles.current, self.state.point_count());
                roles.next
            }
            None => roles.current,
        };

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.ribbon
                .draw(&mut render_pass, draw_slot, self.chain.render_vertex_count());
            if input.show_debug {
                self.debug
                    .draw(&mut render_pass, draw_slot, self.config.width, self.config.height);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if input.time.is_some() {
            self.state.swap();
        }

        Ok(())
    }
}
