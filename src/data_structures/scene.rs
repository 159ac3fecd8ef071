//! Renderable scene: uploaded assets and where their instances stand.
//!
//! All of it is built once at startup and only read afterwards.

use crate::{
    data_structures::{
        instance::InstancePosition,
        model::{DecodedGeometry, Material, MaterialTable, MeshData},
    },
    device::{GraphicsDevice, TextureFilter},
    error::SceneError,
};

/// One contiguous drawable piece of a mesh and its material.
#[derive(Clone, Debug, PartialEq)]
pub struct Part<B> {
    pub buffer: B,
    pub material: Material,
}

/// A loaded mesh (its parts in file order) plus the texture every part samples.
pub struct SceneAsset<D: GraphicsDevice> {
    pub name: String,
    pub parts: Vec<Part<D::Buffer>>,
    pub texture: D::Texture,
}

impl<D: GraphicsDevice> SceneAsset<D> {
    /// Uploads decoded geometry and its texture.
    ///
    /// Material names are resolved before anything reaches the device, so an unknown
    /// name fails with [`SceneError::MissingMaterial`] without creating any resource.
    pub fn load(
        device: &mut D,
        name: &str,
        geometries: Vec<DecodedGeometry>,
        materials: &MaterialTable,
        texture: &image::DynamicImage,
    ) -> Result<Self, SceneError> {
        let resolved = geometries
            .into_iter()
            .map(|geometry| match materials.get(&geometry.material) {
                Some(material) => Ok((geometry.mesh, *material)),
                None => Err(SceneError::MissingMaterial {
                    asset: name.to_string(),
                    material: geometry.material,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let parts = resolved
            .into_iter()
            .enumerate()
            .map(|(idx, (mesh, material))| Part {
                buffer: device.create_buffer(&format!("{name} part {idx}"), &mesh),
                material,
            })
            .collect::<Vec<_>>();
        let texture = device.create_texture(name, texture, TextureFilter::SCENE);
        log::info!("Loaded asset {name} with {} parts.", parts.len());

        Ok(Self {
            name: name.to_string(),
            parts,
            texture,
        })
    }
}

pub struct Floor<D: GraphicsDevice> {
    pub buffer: D::Buffer,
    pub texture: D::Texture,
}

impl<D: GraphicsDevice> Floor<D> {
    pub fn new(device: &mut D, half_extent: f32, texture: &image::DynamicImage) -> Self {
        let buffer = device.create_buffer("floor", &MeshData::floor_plane(half_extent));
        let texture = device.create_texture("floor", texture, TextureFilter::SCENE);
        Self { buffer, texture }
    }
}

/// An asset and every position it is instanced at.
pub struct PlacedAsset<D: GraphicsDevice> {
    pub asset: SceneAsset<D>,
    pub positions: Vec<InstancePosition>,
}

impl<D: GraphicsDevice> PlacedAsset<D> {
    pub fn draw_count(&self) -> usize {
        self.asset.parts.len() * self.positions.len()
    }
}

pub struct Scene<D: GraphicsDevice> {
    pub floor: Floor<D>,
    pub trees: PlacedAsset<D>,
    pub rocks: PlacedAsset<D>,
}

impl<D: GraphicsDevice> Scene<D> {
    /// Draw calls one frame of this scene issues.
    pub fn draw_count(&self) -> usize {
        1 + self.trees.draw_count() + self.rocks.draw_count()
    }
}
