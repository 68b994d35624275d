//! Render pipelines and the bind group layouts they share.
//!
//! Every shader a scene uses is compiled against the same two layouts:
//!
//! - group 0: the per-draw [`DrawUniform`](crate::render::DrawUniform), bound
//!   with a dynamic offset
//! - group 1: the colour texture and its sampler

pub mod shape;

use crate::{render::DrawUniform, resources::texture::texture_layout};

#[derive(Debug)]
pub struct Layouts {
    pub draw: wgpu::BindGroupLayout,
    pub texture: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            draw: draw_layout(device),
            texture: texture_layout(device),
        }
    }
}

pub fn draw_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: wgpu::BufferSize::new(DrawUniform::SIZE),
            },
            count: None,
        }],
        label: Some("draw_bind_group_layout"),
    })
}
