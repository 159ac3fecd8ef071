//! Mesh and material decoding.
//!
//! [`AssetDecoder`] turns raw OBJ/MTL text into [`DecodedGeometry`] and a
//! [`MaterialTable`]. [`ObjDecoder`] is the `tobj`-backed implementation used by the
//! application; anything else that yields the same records can stand in for it.

use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use crate::{
    data_structures::model::{DecodedGeometry, Material, MaterialTable, MeshData, VertexColors},
    error::SceneError,
};

/// Material name of geometry that never selects one with `usemtl`.
pub const DEFAULT_MATERIAL: &str = "default";

// Library name the decoder declares itself; never read from disk.
const NAME_LIBRARY: &str = "forest-ngin-usemtl-names.mtl";

pub trait AssetDecoder {
    /// Decodes mesh text into its parts, in file order. `path` only labels errors.
    fn decode_geometry(&self, path: &str, text: &str) -> Result<Vec<DecodedGeometry>, SceneError>;

    fn decode_materials(&self, path: &str, text: &str) -> Result<MaterialTable, SceneError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ObjDecoder;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Names selected by `usemtl`, first occurrence first.
fn referenced_materials(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for line in text.lines() {
        let mut words = line.split_whitespace();
        if words.next() != Some("usemtl") {
            continue;
        }
        let name = words.collect::<Vec<_>>().join(" ");
        if !name.is_empty() && !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

fn parse_triple(value: &str) -> Option<[f32; 3]> {
    let mut floats = value.split_whitespace().map(str::parse::<f32>);
    match (floats.next(), floats.next(), floats.next()) {
        (Some(Ok(r)), Some(Ok(g)), Some(Ok(b))) => Some([r, g, b]),
        _ => None,
    }
}

impl AssetDecoder for ObjDecoder {
    fn decode_geometry(&self, path: &str, text: &str) -> Result<Vec<DecodedGeometry>, SceneError> {
        // tobj only resolves `usemtl` against a loaded material library. Materials
        // are decoded separately, so a synthetic library declares every referenced
        // name and the material index maps straight back to it. The asset's own
        // `mtllib` statements must not add to that table.
        let names = referenced_materials(text);
        let source = format!("mtllib {NAME_LIBRARY}\n{text}");
        let mut reader = BufReader::new(Cursor::new(source));

        let (models, _) = tobj::load_obj_buf(&mut reader, &load_options(), |library| {
            if library != Path::new(NAME_LIBRARY) {
                return Err(tobj::LoadError::OpenFileFailed);
            }
            let materials = names
                .iter()
                .map(|name| tobj::Material {
                    name: name.clone(),
                    ..Default::default()
                })
                .collect();
            let index = names
                .iter()
                .enumerate()
                .map(|(idx, name)| (name.clone(), idx))
                .collect();
            Ok((materials, index))
        })
        .map_err(|e| SceneError::decode(path, e))?;

        let geometries = models
            .into_iter()
            .map(|model| {
                let mesh = model.mesh;
                let material = mesh
                    .material_id
                    .and_then(|id| names.get(id).cloned())
                    .unwrap_or_else(|| DEFAULT_MATERIAL.to_string());
                let colors = VertexColors::from_components(&mesh.vertex_color, &mesh.positions);
                DecodedGeometry {
                    material,
                    mesh: MeshData {
                        positions: mesh.positions,
                        normals: mesh.normals,
                        tex_coords: mesh.texcoords,
                        colors,
                        indices: mesh.indices,
                    },
                }
            })
            .collect::<Vec<_>>();
        log::debug!("Decoded {} parts from {path}.", geometries.len());
        Ok(geometries)
    }

    fn decode_materials(&self, path: &str, text: &str) -> Result<MaterialTable, SceneError> {
        let (materials, _) = tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(text)))
            .map_err(|e| SceneError::decode(path, e))?;
        let defaults = Material::default();

        Ok(materials
            .into_iter()
            .map(|m| {
                let emissive = m
                    .unknown_param
                    .get("Ke")
                    .and_then(|value| parse_triple(value))
                    .unwrap_or(defaults.emissive);
                let material = Material {
                    diffuse: m.diffuse.unwrap_or(defaults.diffuse),
                    ambient: m.ambient.unwrap_or(defaults.ambient),
                    emissive,
                    specular: m.specular.unwrap_or(defaults.specular),
                    shininess: m.shininess.unwrap_or(defaults.shininess),
                    opacity: m.dissolve.unwrap_or(defaults.opacity),
                };
                (m.name, material)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE_OBJ: &str = "\
mtllib tree.mtl
o Trunk
v 0 0 0
v 1 0 0
v 0 1 0
v 0 0 1
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
usemtl Bark
f 1/1/1 2/2/1 3/3/1
o Crown
usemtl Leaf
f 2/2/1 3/3/1 4/1/1
";

    const TREE_MTL: &str = "\
newmtl Bark
Ka 0.1 0.1 0.1
Kd 0.5 0.3 0.1
Ks 0 0 0
Ke 0.2 0 0
Ns 10
d 0.75

newmtl Leaf
Kd 0 1 0
";

    #[test]
    fn parts_keep_file_order_and_material_names() {
        let parts = ObjDecoder.decode_geometry("tree.obj", TREE_OBJ).unwrap();
        let names: Vec<_> = parts.iter().map(|p| p.material.as_str()).collect();
        assert_eq!(names, ["Bark", "Leaf"]);
        for part in &parts {
            assert_eq!(part.mesh.vertex_count(), 3);
            assert_eq!(part.mesh.indices.len(), 3);
            assert_eq!(part.mesh.tex_coords.len(), 6);
            assert_eq!(part.mesh.colors, VertexColors::OPAQUE_WHITE);
        }
        assert_eq!(&parts[0].mesh.positions[3..6], &[1.0, 0.0, 0.0]);
    }

    #[test]
    fn mtllib_statements_do_not_shift_material_names() {
        let obj = "\
mtllib first.mtl
mtllib second.mtl third.mtl
v 0 0 0
v 1 0 0
v 0 1 0
o A
usemtl Bark
f 1 2 3
mtllib late.mtl
o B
usemtl Leaf
f 1 2 3
o C
usemtl Bark
f 1 2 3
";
        let parts = ObjDecoder.decode_geometry("tree.obj", obj).unwrap();
        let names: Vec<_> = parts.iter().map(|p| p.material.as_str()).collect();
        assert_eq!(names, ["Bark", "Leaf", "Bark"]);
    }

    #[test]
    fn geometry_without_usemtl_uses_default_material() {
        let parts = ObjDecoder
            .decode_geometry("plain.obj", "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n")
            .unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].material, DEFAULT_MATERIAL);
        // The quad is triangulated.
        assert_eq!(parts[0].mesh.indices.len(), 6);
    }

    #[test]
    fn materials_fill_unset_statements_with_defaults() {
        let table = ObjDecoder.decode_materials("tree.mtl", TREE_MTL).unwrap();
        assert_eq!(table.len(), 2);

        let bark = table["Bark"];
        assert_eq!(bark.ambient, [0.1, 0.1, 0.1]);
        assert_eq!(bark.diffuse, [0.5, 0.3, 0.1]);
        assert_eq!(bark.specular, [0.0; 3]);
        assert_eq!(bark.emissive, [0.2, 0.0, 0.0]);
        assert_eq!(bark.shininess, 10.0);
        assert_eq!(bark.opacity, 0.75);

        let leaf = table["Leaf"];
        assert_eq!(leaf.diffuse, [0.0, 1.0, 0.0]);
        assert_eq!(leaf, Material { diffuse: [0.0, 1.0, 0.0], ..Material::default() });
    }

    #[test]
    fn usemtl_names_are_collected_once() {
        let names = referenced_materials("usemtl A\nf 1 2 3\nusemtl B\nusemtl A\nusemtl\n");
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn emissive_triples_need_three_numbers() {
        assert_eq!(parse_triple("0.5 0.25 1"), Some([0.5, 0.25, 1.0]));
        assert_eq!(parse_triple("0.5 x 1"), None);
        assert_eq!(parse_triple("0.5"), None);
    }
}
