//! Optional strip showing the raw state texture.

use wgpu::util::DeviceExt;

use super::state_store::{sampled_state_entry, uniform_entry, StateStore};
use crate::uniforms::DebugParams;

/// Height of the debug band in pixels for a surface `height` pixels tall.
pub fn band_height(height: u32) -> u32 {
    let scaled = (height as f32 * 0.04).round() as u32;
    scaled.max(8).min(height)
}

pub struct DebugPass {
    pipeline: wgpu::RenderPipeline,
    bind_groups: [wgpu::BindGroup; 2],
    // Written once; kept alive for the bind groups.
    _params_buffer: wgpu::Buffer,
}

impl DebugPass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        state: &StateStore,
        params: &DebugParams,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Debug Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("debug.wgsl").into()),
        });

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Debug Params"),
            contents: bytemuck::bytes_of(params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Debug Bind Group Layout"),
            entries: &[
                sampled_state_entry(0, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
            ],
        });

        let buffers = state.buffers();
        let bind_groups = [0, 1].map(|slot| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Debug Bind Group"),
                layout: &layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&buffers.slot(slot).view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: params_buffer.as_entire_binding(),
                    },
                ],
            })
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Debug Pipeline Layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Debug Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            pipeline,
            bind_groups,
            _params_buffer: params_buffer,
        }
    }

    /// Draw the strip into the bottom band of a `width`×`height` target.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, slot: usize, width: u32, height: u32) {
        let band = band_height(height);
        if width == 0 || band == 0 {
            return;
        }
        pass.set_viewport(0.0, (height - band) as f32, width as f32, band as f32, 0.0, 1.0);
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[slot], &[]);
        pass.draw(0..3, 0..1);
    }
}
