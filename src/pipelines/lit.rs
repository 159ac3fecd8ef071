//! The one pipeline every draw call of a frame goes through.
//!
//! Bind groups:
//! - `0`: [`FrameUniformRaw`], written once per frame
//! - `1`: [`DrawUniformRaw`] slots in one buffer, picked per draw with a dynamic offset
//! - `2`: the part's texture and sampler

use std::num::NonZeroU64;

use crate::{
    data_structures::{
        model::{ModelVertex, Vertex},
        texture::Texture,
    },
    device::{DrawUniforms, FrameUniforms},
};

/// Distance between two draw slots. Covers every `min_uniform_buffer_offset_alignment` wgpu allows.
pub const DRAW_SLOT_STRIDE: wgpu::BufferAddress = 256;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniformRaw {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_world_position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
    light_direction: [f32; 3],
    _padding2: u32,
    ambient_light: [f32; 3],
    _padding3: u32,
}

impl From<&FrameUniforms> for FrameUniformRaw {
    fn from(uniforms: &FrameUniforms) -> Self {
        Self {
            view: uniforms.view.into(),
            projection: uniforms.projection.into(),
            view_world_position: uniforms.view_world_position.into(),
            _padding: 0,
            light_direction: uniforms.light_direction.into(),
            _padding2: 0,
            ambient_light: uniforms.ambient_light,
            _padding3: 0,
        }
    }
}

/// Field order follows WGSL packing: a trailing scalar fills the gap after each vec3.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawUniformRaw {
    world: [[f32; 4]; 4],
    diffuse: [f32; 3],
    shininess: f32,
    ambient: [f32; 3],
    opacity: f32,
    emissive: [f32; 3],
    _padding: u32,
    specular: [f32; 3],
    _padding2: u32,
}

impl From<&DrawUniforms> for DrawUniformRaw {
    fn from(uniforms: &DrawUniforms) -> Self {
        let m = &uniforms.material;
        Self {
            world: uniforms.world.into(),
            diffuse: m.diffuse,
            shininess: m.shininess,
            ambient: m.ambient,
            opacity: m.opacity,
            emissive: m.emissive,
            _padding: 0,
            specular: m.specular,
            _padding2: 0,
        }
    }
}

/// One [`DrawUniformRaw`] padded out to [`DRAW_SLOT_STRIDE`].
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawSlot {
    pub uniforms: DrawUniformRaw,
    _padding: [u32; 32],
}

impl DrawSlot {
    pub fn new(uniforms: DrawUniformRaw) -> Self {
        Self {
            uniforms,
            _padding: [0; 32],
        }
    }
}

fn uniform_entry(has_dynamic_offset: bool, min_binding_size: Option<NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset,
            min_binding_size,
        },
        count: None,
    }
}

pub fn frame_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(false, None)],
        label: Some("frame_bind_group_layout"),
    })
}

pub fn draw_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[uniform_entry(true, NonZeroU64::new(draw_uniform_size()))],
        label: Some("draw_bind_group_layout"),
    })
}

pub fn texture_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("texture_bind_group_layout"),
    })
}

pub fn draw_uniform_size() -> wgpu::BufferAddress {
    std::mem::size_of::<DrawUniformRaw>() as wgpu::BufferAddress
}

/// Creates the lit pipeline.
///
/// No blending and no culling: alpha is written as computed and both sides of every
/// triangle are drawn. Overlapping translucent parts therefore depend on draw order.
pub fn mk_lit_pipeline(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    frame_layout: &wgpu::BindGroupLayout,
    draw_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Lit Pipeline Layout"),
        bind_group_layouts: &[frame_layout, draw_layout, texture_layout],
        ..Default::default()
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Lit Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("lit.wgsl").into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Lit Pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[ModelVertex::desc()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: Texture::DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
