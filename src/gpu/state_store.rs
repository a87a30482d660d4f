//! The two 1×N state textures.

use crate::error::GpuError;
use crate::state::{DoubleBuffer, Texel};

pub const STATE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// View of one state texture. The view keeps its texture alive.
pub struct StateSlot {
    pub view: wgpu::TextureView,
}

/// Double-buffered chain state on the GPU.
///
/// Both textures start with the same seeded contents, so the first frame
/// may read either of them.
pub struct StateStore {
    buffers: DoubleBuffer<StateSlot>,
    point_count: u32,
}

impl StateStore {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, texels: &[Texel]) -> Result<Self, GpuError> {
        let point_count = texels.len() as u32;
        let limit = device.limits().max_texture_dimension_2d;
        if point_count > limit {
            return Err(GpuError::StateTooLarge {
                points: point_count,
                limit,
            });
        }

        let data: &[u8] = bytemuck::cast_slice(texels);
        let first = create_slot(device, queue, point_count, data, "State Texture A");
        let second = create_slot(device, queue, point_count, data, "State Texture B");

        Ok(Self {
            buffers: DoubleBuffer::new(first, second),
            point_count,
        })
    }

    #[inline]
    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    #[inline]
    pub fn buffers(&self) -> &DoubleBuffer<StateSlot> {
        &self.buffers
    }

    /// Advance the frame parity after the step has been submitted.
    pub fn swap(&mut self) {
        self.buffers.swap();
    }
}

fn create_slot(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    point_count: u32,
    data: &[u8],
    label: &str,
) -> StateSlot {
    use wgpu::util::DeviceExt;

    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: point_count,
                height: 1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        data,
    );
    StateSlot {
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
    }
}

/// Layout entry for reading a state texture with `textureLoad`.
pub(crate) fn sampled_state_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

/// Layout entry for a uniform block.
pub(crate) fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}
