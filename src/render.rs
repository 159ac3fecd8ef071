//! Per-frame draw sequencing.
//!
//! [`FrameRenderer`] turns a [`Scene`] into an ordered command stream on a
//! [`GraphicsDevice`]: shared state once, then the floor, every tree and every rock.
//! Groups are never interleaved, sorted or batched by material; the depth buffer
//! alone resolves visibility.

use cgmath::SquareMatrix;

use crate::{
    camera::CameraController,
    config::SceneConfig,
    data_structures::{model::Material, scene::{PlacedAsset, Scene}},
    device::{DrawUniforms, FrameUniforms, GraphicsDevice, Viewport},
    pipelines::light::DirectionalLight,
};

/// What one call of [`FrameRenderer::render_frame`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub viewport: Option<Viewport>,
    pub draw_calls: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameRenderer {
    light: DirectionalLight,
    floor_material: Material,
}

impl FrameRenderer {
    pub fn new(light: DirectionalLight) -> Self {
        Self {
            light,
            floor_material: Material::FLOOR,
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(DirectionalLight::new(
            config.light_direction,
            config.ambient_light,
        ))
    }

    /// Renders one frame: floor, then all trees, then all rocks.
    pub fn render_frame<D: GraphicsDevice>(
        &self,
        device: &mut D,
        scene: &Scene<D>,
        camera: &CameraController,
    ) -> FrameStats {
        let (width, height) = device.display_size();
        let viewport = Viewport::fit(width, height);
        device.fit_viewport(viewport);
        device.enable_depth_test();

        let camera_frame = camera.compute_frame(viewport.aspect_ratio());
        let shared = FrameUniforms {
            light_direction: self.light.direction,
            ambient_light: self.light.ambient,
            view: camera_frame.view,
            projection: camera_frame.projection,
            view_world_position: camera_frame.position,
        };
        device.use_program();
        device.set_shared_uniforms(&shared);

        let mut stats = FrameStats {
            viewport: Some(viewport),
            draw_calls: 0,
        };

        device.bind_buffer(&scene.floor.buffer);
        device.draw(
            &scene.floor.texture,
            &DrawUniforms {
                world: cgmath::Matrix4::identity(),
                material: self.floor_material,
            },
        );
        stats.draw_calls += 1;

        stats.draw_calls += draw_instances(device, &scene.trees);
        stats.draw_calls += draw_instances(device, &scene.rocks);

        device.end_frame();
        log::trace!(
            "Frame at zoom {} issued {} draw calls into {}x{}.",
            camera.zoom(),
            stats.draw_calls,
            viewport.width,
            viewport.height
        );
        stats
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(DirectionalLight::default())
    }
}

/// Every part of the asset at every position, positions outermost.
fn draw_instances<D: GraphicsDevice>(device: &mut D, placed: &PlacedAsset<D>) -> usize {
    let mut draws = 0;
    for position in &placed.positions {
        let world = position.to_matrix();
        for part in &placed.asset.parts {
            device.bind_buffer(&part.buffer);
            device.draw(
                &placed.asset.texture,
                &DrawUniforms {
                    world,
                    material: part.material,
                },
            );
            draws += 1;
        }
    }
    draws
}
