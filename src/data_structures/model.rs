//! Mesh and material data as it comes out of the decoder, before upload.

use std::collections::HashMap;

/// Surface response of one part. Shared by every instance of the asset it belongs to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub diffuse: [f32; 3],
    pub ambient: [f32; 3],
    pub emissive: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    pub opacity: f32,
}

impl Material {
    /// Fixed look of the ground plane.
    pub const FLOOR: Material = Material {
        diffuse: [1.0, 1.0, 1.0],
        ambient: [0.1, 0.1, 0.1],
        emissive: [0.0, 0.0, 0.0],
        specular: [0.3, 0.3, 0.3],
        shininess: 30.0,
        opacity: 1.0,
    };
}

/// Values an MTL statement falls back to when it is absent.
impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: [1.0, 1.0, 1.0],
            ambient: [0.0, 0.0, 0.0],
            emissive: [0.0, 0.0, 0.0],
            specular: [1.0, 1.0, 1.0],
            shininess: 400.0,
            opacity: 1.0,
        }
    }
}

pub type MaterialTable = HashMap<String, Material>;

/// Per-vertex colour attribute, either real data or one value for every vertex.
#[derive(Clone, Debug, PartialEq)]
pub enum VertexColors {
    PerVertex(Vec<[f32; 3]>),
    Constant([f32; 4]),
}

impl VertexColors {
    pub const OPAQUE_WHITE: VertexColors = VertexColors::Constant([1.0, 1.0, 1.0, 1.0]);

    /// Keeps `rgb` as a true attribute only when it carries one triple per position.
    ///
    /// `rgb` and `positions` are flat component arrays, so the lengths compare directly.
    pub fn from_components(rgb: &[f32], positions: &[f32]) -> Self {
        if !rgb.is_empty() && rgb.len() == positions.len() {
            VertexColors::PerVertex(rgb.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect())
        } else {
            VertexColors::OPAQUE_WHITE
        }
    }

    pub fn at(&self, index: usize) -> [f32; 4] {
        match self {
            VertexColors::PerVertex(colors) => colors
                .get(index)
                .map_or([1.0; 4], |[r, g, b]| [*r, *g, *b, 1.0]),
            VertexColors::Constant(color) => *color,
        }
    }
}

/// Flat attribute arrays of one drawable piece of geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub colors: VertexColors,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Interleaves the attribute arrays. Missing normals or texcoords read as zero.
    pub fn vertices(&self) -> Vec<ModelVertex> {
        (0..self.vertex_count())
            .map(|i| ModelVertex {
                position: [
                    self.positions[i * 3],
                    self.positions[i * 3 + 1],
                    self.positions[i * 3 + 2],
                ],
                normal: [
                    self.normals.get(i * 3).map_or(0.0, |f| *f),
                    self.normals.get(i * 3 + 1).map_or(0.0, |f| *f),
                    self.normals.get(i * 3 + 2).map_or(0.0, |f| *f),
                ],
                tex_coords: [
                    self.tex_coords.get(i * 2).map_or(0.0, |f| *f),
                    self.tex_coords.get(i * 2 + 1).map_or(0.0, |f| *f),
                ],
                color: self.colors.at(i),
            })
            .collect()
    }

    /// Square ground plane in the xz-plane facing +Y, textured once across its whole extent.
    pub fn floor_plane(half_extent: f32) -> Self {
        let h = half_extent;
        Self {
            positions: vec![-h, 0.0, -h, h, 0.0, -h, -h, 0.0, h, h, 0.0, h],
            normals: [0.0, 1.0, 0.0].repeat(4),
            tex_coords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            colors: VertexColors::OPAQUE_WHITE,
            indices: vec![0, 1, 2, 2, 1, 3],
        }
    }
}

/// One decoded piece of a mesh and the name of the material it is drawn with.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedGeometry {
    pub material: String,
    pub mesh: MeshData,
}

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 6]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}
