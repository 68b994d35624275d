//! Geometry primitives: disks, squares and triangles.
//!
//! A [`Shape`] only describes *which* primitive to build. [`Shape::mesh`] turns it
//! into CPU-side [`MeshData`] and [`Geometry::upload`] moves that data into static
//! GPU buffers once. Geometry carries no material; whatever the owning node has
//! bound is used when it is drawn.

use std::f32::consts::TAU;

use log::debug;
use wgpu::util::DeviceExt;

use crate::error::SceneError;

/// Number of slices used by [`Shape::default_disk`].
pub const DEFAULT_DISK_SLICES: u32 = 64;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Unit-square texture mapping: [-1, 1] becomes [0, 1] with v pointing down.
    fn at(x: f32, y: f32) -> Self {
        Self {
            position: [x, y],
            tex_coords: [0.5 + 0.5 * x, 0.5 - 0.5 * y],
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// Vertices and (optional) triangle-list indices of one shape.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Option<Vec<u32>>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len() / 3,
            None => self.vertices.len() / 3,
        }
    }

    pub fn triangle(&self, i: usize) -> Option<[u32; 3]> {
        match &self.indices {
            Some(indices) => indices
                .get(i * 3..i * 3 + 3)
                .map(|tri| [tri[0], tri[1], tri[2]]),
            None => {
                let first = (i * 3) as u32;
                (i < self.triangle_count()).then_some([first, first + 1, first + 2])
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Triangle fan around the origin approximating the unit circle.
    Disk { slices: u32 },
    /// The [-1, 1] square made of two triangles.
    Square,
    Triangle,
}

impl Shape {
    pub fn disk(slices: u32) -> Result<Self, SceneError> {
        if slices < 3 {
            return Err(SceneError::TooFewSlices(slices));
        }
        Ok(Shape::Disk { slices })
    }

    pub fn default_disk() -> Self {
        Shape::Disk {
            slices: DEFAULT_DISK_SLICES,
        }
    }

    pub fn mesh(&self) -> MeshData {
        match *self {
            Shape::Disk { slices } => {
                let step = TAU / slices as f32;
                // center, then slices + 1 rim points; the last one closes the fan
                let vertices = std::iter::once(Vertex::at(0.0, 0.0))
                    .chain((0..=slices).map(|i| {
                        let angle = i as f32 * step;
                        Vertex::at(angle.cos(), angle.sin())
                    }))
                    .collect();
                let indices = (1..=slices).flat_map(|i| [0, i, i + 1]).collect();
                MeshData {
                    vertices,
                    indices: Some(indices),
                }
            }
            Shape::Square => MeshData {
                vertices: [
                    (-1.0, -1.0),
                    (1.0, -1.0),
                    (1.0, 1.0),
                    (1.0, 1.0),
                    (-1.0, 1.0),
                    (-1.0, -1.0),
                ]
                .into_iter()
                .map(|(x, y)| Vertex::at(x, y))
                .collect(),
                indices: None,
            },
            Shape::Triangle => MeshData {
                vertices: vec![
                    Vertex::at(-1.0, -1.0),
                    Vertex::at(1.0, -1.0),
                    Vertex::at(0.0, 1.0),
                ],
                indices: None,
            },
        }
    }
}

/// Static GPU buffers of an uploaded shape.
#[derive(Debug)]
pub struct MeshBuffers {
    pub vertex: wgpu::Buffer,
    pub index: Option<wgpu::Buffer>,
}

/**
 * A drawable primitive. Share it between nodes with `Rc<Geometry>`; the GPU
 * buffers are released when the last reference goes away.
 */
#[derive(Debug)]
pub struct Geometry {
    shape: Shape,
    vertex_count: u32,
    index_count: Option<u32>,
    buffers: Option<MeshBuffers>,
}

impl Geometry {
    /// Generate the mesh of `shape` and upload it into static GPU buffers.
    pub fn upload(shape: Shape, device: &wgpu::Device) -> Self {
        let mesh = shape.mesh();
        let vertex = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", shape)),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index = mesh.indices.as_ref().map(|indices| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", shape)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        });
        debug!(
            "uploaded {:?}: {} vertices, {} triangles",
            shape,
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        let mut geometry = Self::from_mesh(shape, &mesh);
        geometry.buffers = Some(MeshBuffers { vertex, index });
        geometry
    }

    /// Geometry without GPU buffers. It takes part in traversal like any other
    /// geometry, but renderers skip it.
    pub fn headless(shape: Shape) -> Self {
        Self::from_mesh(shape, &shape.mesh())
    }

    fn from_mesh(shape: Shape, mesh: &MeshData) -> Self {
        Self {
            shape,
            vertex_count: mesh.vertices.len() as u32,
            index_count: mesh.indices.as_ref().map(|indices| indices.len() as u32),
            buffers: None,
        }
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> Option<u32> {
        self.index_count
    }

    pub fn buffers(&self) -> Option<&MeshBuffers> {
        self.buffers.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disk_has_n_triangles_and_n_plus_two_vertices() {
        for n in [3, 8, 32, 64] {
            let mesh = Shape::disk(n).unwrap().mesh();
            assert_eq!(mesh.vertices.len(), n as usize + 2);
            assert_eq!(mesh.triangle_count(), n as usize);
        }
    }

    #[test]
    fn disk_triangles_fan_around_the_center() {
        let mesh = Shape::disk(8).unwrap().mesh();
        for i in 1..=8u32 {
            assert_eq!(mesh.triangle(i as usize - 1), Some([0, i, i + 1]));
        }
        assert_eq!(mesh.triangle(7), Some([0, 8, 9]));
        assert_eq!(mesh.triangle(8), None);
    }

    #[test]
    fn disk_vertices_lie_on_the_unit_circle() {
        let mesh = Shape::disk(16).unwrap().mesh();
        assert_eq!(mesh.vertices[0].position, [0.0, 0.0]);
        for v in &mesh.vertices[1..] {
            let [x, y] = v.position;
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-5);
        }
        // closing duplicate of the first rim vertex
        let first = mesh.vertices[1].position;
        let last = mesh.vertices[17].position;
        assert!((first[0] - last[0]).abs() < 1e-5 && (first[1] - last[1]).abs() < 1e-5);
    }

    #[test]
    fn disk_rejects_degenerate_slice_counts() {
        assert_eq!(Shape::disk(0), Err(SceneError::TooFewSlices(0)));
        assert_eq!(Shape::disk(2), Err(SceneError::TooFewSlices(2)));
        assert!(Shape::disk(3).is_ok());
    }

    #[test]
    fn square_is_two_unindexed_triangles() {
        let mesh = Shape::Square.mesh();
        assert_eq!(mesh.vertices.len(), 6);
        assert!(mesh.indices.is_none());
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangle(1), Some([3, 4, 5]));
    }

    #[test]
    fn texture_coordinates_span_the_unit_square() {
        let mesh = Shape::Square.mesh();
        let bottom_left = mesh.vertices[0];
        let top_right = mesh.vertices[2];
        assert_eq!(bottom_left.tex_coords, [0.0, 1.0]);
        assert_eq!(top_right.tex_coords, [1.0, 0.0]);
    }

    #[test]
    fn headless_geometry_keeps_counts_without_buffers() {
        let disk = Geometry::headless(Shape::disk(32).unwrap());
        assert_eq!(disk.vertex_count(), 34);
        assert_eq!(disk.index_count(), Some(96));
        assert!(disk.buffers().is_none());

        let triangle = Geometry::headless(Shape::Triangle);
        assert_eq!(triangle.vertex_count(), 3);
        assert_eq!(triangle.index_count(), None);
    }
}
