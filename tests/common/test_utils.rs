use forest_ngin::{
    data_structures::{
        instance::InstancePosition,
        model::{DecodedGeometry, Material, MaterialTable, MeshData, VertexColors},
        scene::{Floor, PlacedAsset, Scene, SceneAsset},
    },
    device::GraphicsDevice,
};

/// A single triangle with `colors` as its vertex colour attribute.
pub fn triangle(colors: VertexColors) -> MeshData {
    MeshData {
        positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        tex_coords: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
        colors,
        indices: vec![0, 1, 2],
    }
}

/// Distinct material per part so draws can be told apart by their uniforms.
pub fn part_material(idx: usize) -> Material {
    Material {
        shininess: 10.0 + idx as f32,
        ..Material::default()
    }
}

/// An asset of `parts` triangles named `part0`, `part1`, ...
pub fn asset<D: GraphicsDevice>(device: &mut D, name: &str, parts: usize) -> SceneAsset<D> {
    let geometries = (0..parts)
        .map(|idx| DecodedGeometry {
            material: format!("part{idx}"),
            mesh: triangle(VertexColors::OPAQUE_WHITE),
        })
        .collect::<Vec<_>>();
    let materials: MaterialTable = (0..parts)
        .map(|idx| (format!("part{idx}"), part_material(idx)))
        .collect();
    SceneAsset::load(device, name, geometries, &materials, &texture_image())
        .expect("every part material is defined")
}

pub fn texture_image() -> image::DynamicImage {
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        2,
        2,
        image::Rgba([40, 120, 40, 255]),
    ))
}

/// A scene with the given tree and rock layouts.
pub fn scene<D: GraphicsDevice>(
    device: &mut D,
    tree_parts: usize,
    trees: Vec<InstancePosition>,
    rock_parts: usize,
    rocks: Vec<InstancePosition>,
) -> Scene<D> {
    let floor = Floor::new(device, 100.0, &texture_image());
    let tree = asset(device, "tree", tree_parts);
    let rock = asset(device, "rock", rock_parts);
    Scene {
        floor,
        trees: PlacedAsset {
            asset: tree,
            positions: trees,
        },
        rocks: PlacedAsset {
            asset: rock,
            positions: rocks,
        },
    }
}
