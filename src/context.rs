//! The wgpu implementation of [`GraphicsDevice`].
//!
//! [`Context`] owns the window surface, the device and queue, the lit pipeline and
//! every buffer and texture the scene uploads. Handles given out to the scene are
//! indices into those tables; nothing is freed while the window is open.
//!
//! Draw calls are recorded while the renderer walks the scene and encoded into a
//! single render pass in [`GraphicsDevice::end_frame`]. Each recorded draw owns a
//! uniform slot, so no draw depends on state left behind by the previous one.

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::{
    data_structures::{model::MeshData, texture::Texture},
    device::{DrawUniforms, FrameUniforms, GraphicsDevice, TextureFilter, Viewport},
    error::SceneError,
    pipelines::lit::{self, DRAW_SLOT_STRIDE, DrawSlot, DrawUniformRaw, FrameUniformRaw},
};

/// Index of an uploaded mesh in [`Context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(usize);

/// Index of an uploaded texture in [`Context`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

#[derive(Debug)]
struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_elements: u32,
}

#[derive(Debug)]
struct GpuTexture {
    #[allow(dead_code)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

#[derive(Debug)]
struct DrawCommand {
    mesh: MeshHandle,
    texture: TextureHandle,
    slot: u32,
}

/// State collected between the first command of a frame and `end_frame`.
#[derive(Debug, Default)]
struct FrameRecording {
    program_bound: bool,
    depth_test: bool,
    bound_mesh: Option<MeshHandle>,
    slots: Vec<DrawSlot>,
    commands: Vec<DrawCommand>,
}

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    depth_texture: Texture,
    pipeline: wgpu::RenderPipeline,
    texture_layout: wgpu::BindGroupLayout,
    draw_layout: wgpu::BindGroupLayout,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: usize,
    meshes: Vec<GpuMesh>,
    textures: Vec<GpuTexture>,
    recording: FrameRecording,
}

impl Context {
    pub async fn new(window: Arc<Window>) -> Result<Self, SceneError> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            #[cfg(not(target_arch = "wasm32"))]
            backends: wgpu::Backends::PRIMARY,
            #[cfg(target_arch = "wasm32")]
            backends: wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| SceneError::GraphicsContextUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::GraphicsContextUnavailable(e.to_string()))?;
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                // WebGL doesn't support all of wgpu's features, so if
                // we're building for the web we'll have to disable some.
                required_limits: if cfg!(target_arch = "wasm32") {
                    wgpu::Limits::downlevel_webgl2_defaults()
                } else {
                    wgpu::Limits::default()
                },
                ..Default::default()
            })
            .await
            .map_err(|e| SceneError::GraphicsContextUnavailable(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader outputs display-ready values, so prefer a surface that stores them as is.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                SceneError::GraphicsContextUnavailable("surface supports no formats".into())
            })?;
        let viewport = Viewport::fit(size.width, size.height);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: viewport.width,
            height: viewport.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let frame_layout = lit::frame_layout(&device);
        let draw_layout = lit::draw_layout(&device);
        let texture_layout = lit::texture_layout(&device);
        let pipeline = lit::mk_lit_pipeline(
            &device,
            config.format,
            &frame_layout,
            &draw_layout,
            &texture_layout,
        );

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniform Buffer"),
            size: std::mem::size_of::<FrameUniformRaw>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
            label: Some("frame_bind_group"),
        });

        // Room for the floor plus a handful of instanced parts; grows on demand.
        let draw_capacity = 64;
        let (draw_buffer, draw_bind_group) = mk_draw_buffer(&device, &draw_layout, draw_capacity);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            clear_colour: wgpu::Color::TRANSPARENT,
            depth_texture,
            pipeline,
            texture_layout,
            draw_layout,
            frame_buffer,
            frame_bind_group,
            draw_buffer,
            draw_bind_group,
            draw_capacity,
            meshes: Vec::new(),
            textures: Vec::new(),
            recording: FrameRecording::default(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    fn ensure_draw_capacity(&mut self, slots: usize) {
        if slots <= self.draw_capacity {
            return;
        }
        let capacity = slots.next_power_of_two();
        log::debug!("Growing draw uniform buffer to {capacity} slots.");
        let (buffer, bind_group) = mk_draw_buffer(&self.device, &self.draw_layout, capacity);
        self.draw_buffer = buffer;
        self.draw_bind_group = bind_group;
        self.draw_capacity = capacity;
    }

    fn encode_frame(&mut self, recording: FrameRecording) {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated; reconfiguring and skipping this frame.");
                self.reconfigure();
                return;
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.ensure_draw_capacity(recording.slots.len());
        if !recording.slots.is_empty() {
            self.queue
                .write_buffer(&self.draw_buffer, 0, bytemuck::cast_slice(&recording.slots));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_colour),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
            for command in &recording.commands {
                let mesh = &self.meshes[command.mesh.0];
                let texture = &self.textures[command.texture.0];
                let offset = (command.slot as wgpu::BufferAddress * DRAW_SLOT_STRIDE) as u32;
                render_pass.set_bind_group(1, &self.draw_bind_group, &[offset]);
                render_pass.set_bind_group(2, &texture.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }
}

fn mk_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: capacity as wgpu::BufferAddress * DRAW_SLOT_STRIDE,
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
                size: wgpu::BufferSize::new(lit::draw_uniform_size()),
            }),
        }],
        label: Some("draw_bind_group"),
    });
    (buffer, bind_group)
}

impl GraphicsDevice for Context {
    type Buffer = MeshHandle;
    type Texture = TextureHandle;

    fn create_buffer(&mut self, label: &str, mesh: &MeshData) -> MeshHandle {
        let vertices = mesh.vertices();
        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            num_elements: mesh.indices.len() as u32,
        });
        MeshHandle(self.meshes.len() - 1)
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &image::DynamicImage,
        filter: TextureFilter,
    ) -> TextureHandle {
        let texture = Texture::from_image(&self.device, &self.queue, image, Some(label), filter);
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some(&format!("{label} texture_bind_group")),
        });
        self.textures.push(GpuTexture {
            texture,
            bind_group,
        });
        TextureHandle(self.textures.len() - 1)
    }

    fn display_size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn fit_viewport(&mut self, viewport: Viewport) {
        if self.config.width != viewport.width || self.config.height != viewport.height {
            log::debug!("Resizing surface to {}x{}", viewport.width, viewport.height);
            self.config.width = viewport.width;
            self.config.height = viewport.height;
            self.reconfigure();
        }
    }

    fn enable_depth_test(&mut self) {
        let size = [self.config.width, self.config.height];
        if self.depth_texture.size() != size {
            self.depth_texture = Texture::create_depth_texture(&self.device, size, "depth_texture");
        }
        self.recording.depth_test = true;
    }

    fn use_program(&mut self) {
        self.recording.program_bound = true;
    }

    fn set_shared_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::cast_slice(&[FrameUniformRaw::from(uniforms)]),
        );
    }

    fn bind_buffer(&mut self, buffer: &MeshHandle) {
        self.recording.bound_mesh = Some(*buffer);
    }

    fn draw(&mut self, texture: &TextureHandle, uniforms: &DrawUniforms) {
        let recording = &mut self.recording;
        if !(recording.program_bound && recording.depth_test) {
            log::warn!("Draw issued before the program and depth test were set up; skipping it.");
            return;
        }
        let Some(mesh) = recording.bound_mesh else {
            log::warn!("Draw issued without a bound buffer; skipping it.");
            return;
        };
        recording.commands.push(DrawCommand {
            mesh,
            texture: *texture,
            slot: recording.slots.len() as u32,
        });
        recording
            .slots
            .push(DrawSlot::new(DrawUniformRaw::from(uniforms)));
    }

    fn end_frame(&mut self) {
        let recording = std::mem::take(&mut self.recording);
        self.encode_frame(recording);
    }
}
