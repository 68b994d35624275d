//! Draw calls and their encoding into a wgpu render pass.
//!
//! Traversing a scene produces a [`Frame`]: the ordered list of every
//! [`DrawCall`] the scene issued. Frames are plain data, so the traversal can be
//! inspected without a GPU. The [`Renderer`] turns a frame into GPU work: it
//! writes one [`DrawUniform`] per call into a dynamic-offset uniform buffer and
//! then replays the calls in order, switching pipelines and textures only when
//! they change.

use std::rc::Rc;

use cgmath::Matrix4;
use log::{trace, warn};

use crate::data_structures::{
    material::MaterialState,
    shape::{Geometry, Shape},
    state::{ShaderId, State},
};

/// One geometry drawn with one snapshot of the traversal state.
#[derive(Clone, Debug)]
pub struct DrawCall {
    pub geometry: Rc<Geometry>,
    pub shader: ShaderId,
    pub world: Matrix4<f32>,
    pub view_projection: Matrix4<f32>,
    pub material: MaterialState,
}

impl DrawCall {
    pub fn model_view_projection(&self) -> Matrix4<f32> {
        self.view_projection * self.world
    }
}

/// Comparable digest of a draw call, without the geometry handle.
pub type DrawSummary = (Shape, ShaderId, Matrix4<f32>, MaterialState);

#[derive(Clone, Debug, Default)]
pub struct Frame {
    calls: Vec<DrawCall>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, geometry: &Rc<Geometry>, state: &State) {
        self.calls.push(DrawCall {
            geometry: Rc::clone(geometry),
            shader: state.shader,
            world: state.world,
            view_projection: state.view_projection,
            material: state.material,
        });
    }

    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCall> {
        self.calls.iter()
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn summary(&self) -> Vec<DrawSummary> {
        self.calls
            .iter()
            .map(|call| (call.geometry.shape(), call.shader, call.world, call.material))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Frame {
    type Item = &'a DrawCall;
    type IntoIter = std::slice::Iter<'a, DrawCall>;

    fn into_iter(self) -> Self::IntoIter {
        self.calls.iter()
    }
}

/// Per-draw uniform block, bound at group 0 with a dynamic offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniform {
    pub mvp: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl DrawUniform {
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<DrawUniform>() as wgpu::BufferAddress;
}

impl From<&DrawCall> for DrawUniform {
    fn from(call: &DrawCall) -> Self {
        Self {
            mvp: call.model_view_projection().into(),
            color: call.material.color.0,
        }
    }
}

/// Distance between two uniforms in the buffer, honouring the device's offset alignment.
pub fn uniform_stride(alignment: u32) -> wgpu::BufferAddress {
    let alignment = alignment.max(1) as wgpu::BufferAddress;
    DrawUniform::SIZE.div_ceil(alignment) * alignment
}

/// GPU resources a frame is drawn with.
pub struct Library<'a> {
    pub pipelines: &'a [wgpu::RenderPipeline],
    pub textures: &'a [wgpu::BindGroup],
    pub white: &'a wgpu::BindGroup,
}

pub struct Renderer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: wgpu::BufferAddress,
    capacity: usize,
}

impl Renderer {
    const INITIAL_CAPACITY: usize = 64;

    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout) -> Self {
        let stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let (buffer, bind_group) =
            Self::allocate(device, layout, stride, Self::INITIAL_CAPACITY);
        Self {
            buffer,
            bind_group,
            stride,
            capacity: Self::INITIAL_CAPACITY,
        }
    }

    fn allocate(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: wgpu::BufferAddress,
        capacity: usize,
    ) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Draw Uniform Buffer"),
            size: stride * capacity as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DrawUniform::SIZE),
                }),
            }],
            label: Some("draw_bind_group"),
        });
        (buffer, bind_group)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Upload the uniforms of every call in `frame`, growing the buffer when needed.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        frame: &Frame,
    ) {
        if frame.is_empty() {
            return;
        }
        if frame.len() > self.capacity {
            let capacity = frame.len().next_power_of_two();
            trace!("growing draw uniforms from {} to {capacity}", self.capacity);
            (self.buffer, self.bind_group) = Self::allocate(device, layout, self.stride, capacity);
            self.capacity = capacity;
        }
        let stride = self.stride as usize;
        let mut bytes = vec![0u8; stride * frame.len()];
        for (chunk, call) in bytes.chunks_exact_mut(stride).zip(frame) {
            let uniform = DrawUniform::from(call);
            chunk[..DrawUniform::SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniform));
        }
        queue.write_buffer(&self.buffer, 0, &bytes);
    }

    /// Replay `frame` into `pass`. [`prepare`](Self::prepare) must have seen the
    /// same frame.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame: &Frame, library: &Library) {
        let mut bound_shader = None;
        for (i, call) in frame.iter().enumerate() {
            let Some(buffers) = call.geometry.buffers() else {
                warn!("skipping {:?}: geometry was never uploaded", call.geometry.shape());
                continue;
            };
            let Some(pipeline) = library.pipelines.get(call.shader.0) else {
                warn!("skipping draw with unknown shader {:?}", call.shader);
                continue;
            };
            if bound_shader != Some(call.shader) {
                pass.set_pipeline(pipeline);
                bound_shader = Some(call.shader);
            }
            let offset = (i as wgpu::BufferAddress * self.stride) as wgpu::DynamicOffset;
            pass.set_bind_group(0, &self.bind_group, &[offset]);
            let texture = match call.material.texture {
                Some(id) => library.textures.get(id.0).unwrap_or_else(|| {
                    warn!("unknown texture {id:?}, drawing untextured");
                    library.white
                }),
                None => library.white,
            };
            pass.set_bind_group(1, texture, &[]);
            pass.set_vertex_buffer(0, buffers.vertex.slice(..));
            match (&buffers.index, call.geometry.index_count()) {
                (Some(index), Some(count)) => {
                    pass.set_index_buffer(index.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..count, 0, 0..1);
                }
                _ => pass.draw(0..call.geometry.vertex_count(), 0..1),
            }
        }
    }
}
