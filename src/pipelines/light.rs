use cgmath::{InnerSpace, Vector3};

use crate::data_structures::model::Material;

/// The scene's single directional light plus its ambient term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub direction: Vector3<f32>,
    pub ambient: [f32; 3],
}

impl DirectionalLight {
    pub fn new(direction: [f32; 3], ambient: [f32; 3]) -> Self {
        Self {
            direction: Vector3::from(direction).normalize(),
            ambient,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new([-1.0, 3.0, 5.0], [0.0; 3])
    }
}

/// Inputs of one fragment of the lit shader.
#[derive(Clone, Copy, Debug)]
pub struct Fragment {
    pub normal: Vector3<f32>,
    pub surface_to_view: Vector3<f32>,
    pub vertex_color: [f32; 4],
    pub tex_color: [f32; 4],
}

/// CPU mirror of `fs_main` in `lit.wgsl`.
///
/// Half-Lambert diffuse (`dot(l, n) * 0.5 + 0.5`) plus a Blinn-Phong highlight; alpha
/// is material opacity times vertex alpha.
pub fn shade(light: &DirectionalLight, material: &Material, fragment: &Fragment) -> [f32; 4] {
    let normal = fragment.normal.normalize();
    let surface_to_view = fragment.surface_to_view.normalize();
    let half_vector = (light.direction + surface_to_view).normalize();

    let fake_light = light.direction.dot(normal) * 0.5 + 0.5;
    let specular_light = normal.dot(half_vector).clamp(0.0, 1.0);
    let specular = specular_light.powf(material.shininess);

    let mut rgb = [0.0; 3];
    for (i, out) in rgb.iter_mut().enumerate() {
        let effective_diffuse = material.diffuse[i] * fragment.vertex_color[i];
        *out = material.emissive[i]
            + material.ambient[i] * light.ambient[i]
            + effective_diffuse * fake_light * fragment.tex_color[i]
            + material.specular[i] * specular;
    }
    [
        rgb[0],
        rgb[1],
        rgb[2],
        material.opacity * fragment.vertex_color[3],
    ]
}
