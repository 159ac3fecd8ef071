//! The seam between scene logic and the graphics API.
//!
//! [`GraphicsDevice`] is everything the renderer and the asset loader need from a
//! GPU: resource creation at startup and a small, ordered command vocabulary per
//! frame. [`crate::context::Context`] implements it on top of wgpu; tests implement
//! it with a recorder.

use cgmath::{Matrix4, Point3, Vector3};

use crate::data_structures::model::{Material, MeshData};

/// Sampling policy of a texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureFilter {
    pub mag: wgpu::FilterMode,
    pub min: wgpu::FilterMode,
}

impl TextureFilter {
    /// Every scene texture is magnified with nearest and minified with linear filtering.
    pub const SCENE: TextureFilter = TextureFilter {
        mag: wgpu::FilterMode::Nearest,
        min: wgpu::FilterMode::Linear,
    };
}

/// Output area in pixels. Never smaller than 1x1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Clamps a (possibly zero) display size into a usable viewport.
    pub fn fit(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// Values shared by every draw call of one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    /// Unit vector pointing towards the light.
    pub light_direction: Vector3<f32>,
    pub ambient_light: [f32; 3],
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    pub view_world_position: Point3<f32>,
}

/// Complete per-draw state. Nothing carries over from the previous draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawUniforms {
    pub world: Matrix4<f32>,
    pub material: Material,
}

pub trait GraphicsDevice {
    /// Uploaded geometry of one part.
    type Buffer;
    type Texture;

    fn create_buffer(&mut self, label: &str, mesh: &MeshData) -> Self::Buffer;

    fn create_texture(
        &mut self,
        label: &str,
        image: &image::DynamicImage,
        filter: TextureFilter,
    ) -> Self::Texture;

    /// Current size of the output surface, possibly zero while minimized.
    fn display_size(&self) -> (u32, u32);

    fn fit_viewport(&mut self, viewport: Viewport);

    /// Must be called before the first draw of a frame.
    fn enable_depth_test(&mut self);

    /// Binds the single shader program used by every draw of the frame.
    fn use_program(&mut self);

    fn set_shared_uniforms(&mut self, uniforms: &FrameUniforms);

    fn bind_buffer(&mut self, buffer: &Self::Buffer);

    /// Draws the bound buffer.
    fn draw(&mut self, texture: &Self::Texture, uniforms: &DrawUniforms);

    /// Submits the frame's work and presents it.
    fn end_frame(&mut self);
}
