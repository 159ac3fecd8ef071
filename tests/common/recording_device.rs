use forest_ngin::{
    data_structures::model::MeshData,
    device::{DrawUniforms, FrameUniforms, GraphicsDevice, TextureFilter, Viewport},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    CreateBuffer { label: String, handle: usize },
    CreateTexture {
        label: String,
        handle: usize,
        filter: TextureFilter,
    },
    FitViewport(Viewport),
    EnableDepthTest,
    UseProgram,
    SetSharedUniforms(FrameUniforms),
    BindBuffer(usize),
    Draw {
        buffer: Option<usize>,
        texture: usize,
        uniforms: DrawUniforms,
    },
    EndFrame,
}

/// A [`GraphicsDevice`] that only remembers what it was asked to do.
///
/// Buffers and textures are plain indices into the upload lists.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub display_size: (u32, u32),
    pub events: Vec<Event>,
    pub meshes: Vec<MeshData>,
    pub textures: Vec<(u32, u32)>,
    bound: Option<usize>,
}

impl RecordingDevice {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            display_size: (width, height),
            ..Default::default()
        }
    }

    /// Every `Draw` event as `(buffer, texture, uniforms)`.
    pub fn draws(&self) -> Vec<(Option<usize>, usize, DrawUniforms)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                Event::Draw {
                    buffer,
                    texture,
                    uniforms,
                } => Some((*buffer, *texture, *uniforms)),
                _ => None,
            })
            .collect()
    }

    /// Events recorded since the last `EndFrame` before them, i.e. the last frame.
    pub fn last_frame(&self) -> &[Event] {
        let end = self.events.len();
        let start = self.events[..end.saturating_sub(1)]
            .iter()
            .rposition(|event| *event == Event::EndFrame)
            .map_or(0, |idx| idx + 1);
        &self.events[start..end]
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.iter().filter(|event| *event == wanted).count()
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl GraphicsDevice for RecordingDevice {
    type Buffer = usize;
    type Texture = usize;

    fn create_buffer(&mut self, label: &str, mesh: &MeshData) -> usize {
        let handle = self.meshes.len();
        self.meshes.push(mesh.clone());
        self.events.push(Event::CreateBuffer {
            label: label.to_string(),
            handle,
        });
        handle
    }

    fn create_texture(
        &mut self,
        label: &str,
        image: &image::DynamicImage,
        filter: TextureFilter,
    ) -> usize {
        let handle = self.textures.len();
        self.textures.push((image.width(), image.height()));
        self.events.push(Event::CreateTexture {
            label: label.to_string(),
            handle,
            filter,
        });
        handle
    }

    fn display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn fit_viewport(&mut self, viewport: Viewport) {
        self.events.push(Event::FitViewport(viewport));
    }

    fn enable_depth_test(&mut self) {
        self.events.push(Event::EnableDepthTest);
    }

    fn use_program(&mut self) {
        self.events.push(Event::UseProgram);
    }

    fn set_shared_uniforms(&mut self, uniforms: &FrameUniforms) {
        self.events.push(Event::SetSharedUniforms(*uniforms));
    }

    fn bind_buffer(&mut self, buffer: &usize) {
        self.bound = Some(*buffer);
        self.events.push(Event::BindBuffer(*buffer));
    }

    fn draw(&mut self, texture: &usize, uniforms: &DrawUniforms) {
        self.events.push(Event::Draw {
            buffer: self.bound,
            texture: *texture,
            uniforms: *uniforms,
        });
    }

    fn end_frame(&mut self) {
        self.bound = None;
        self.events.push(Event::EndFrame);
    }
}
