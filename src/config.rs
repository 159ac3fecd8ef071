//! Scene configuration.
//!
//! [`SceneConfig::default`] reproduces the stock forest: 30 trees and 20 rocks
//! scattered over a 200x200 patch of grass.

/// The three files that make up one instanced asset.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetSource {
    pub name: String,
    pub obj: String,
    pub mtl: String,
    pub texture: String,
}

impl AssetSource {
    pub fn new(name: &str, obj: &str, mtl: &str, texture: &str) -> Self {
        Self {
            name: name.to_string(),
            obj: obj.to_string(),
            mtl: mtl.to_string(),
            texture: texture.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    /// Directory (native) or URL path below the page origin (web) that asset names are resolved against.
    pub asset_root: String,
    pub tree: AssetSource,
    pub rock: AssetSource,
    pub floor_texture: String,
    pub tree_count: usize,
    pub rock_count: usize,
    /// Side length of the square the instances are scattered over.
    pub placement_extent: f32,
    /// The floor spans `[-floor_half_extent, floor_half_extent]` on x and z.
    pub floor_half_extent: f32,
    /// World-space direction towards the light; normalized before use.
    pub light_direction: [f32; 3],
    pub ambient_light: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            asset_root: "assets".to_string(),
            tree: AssetSource::new("tree", "fatTree.obj", "fatTree.mtl", "TreeTex.png"),
            rock: AssetSource::new("rock", "Rock.obj", "Rock.mtl", "rock.png"),
            floor_texture: "grass.jpg".to_string(),
            tree_count: 30,
            rock_count: 20,
            placement_extent: 200.0,
            floor_half_extent: 100.0,
            light_direction: [-1.0, 3.0, 5.0],
            // The stock scene never lights the ambient term.
            ambient_light: [0.0; 3],
        }
    }
}
