//! Asset loading: fetching raw bytes, decoding them and assembling the scene.
//!
//! Native builds read from the filesystem through tokio; web builds fetch relative to
//! the page origin through reqwest. Everything funnels into [`load_scene`], which
//! fetches both assets and the floor texture concurrently and fails on the first error.

use crate::{
    config::{AssetSource, SceneConfig},
    data_structures::{
        instance::PlacementGenerator,
        scene::{Floor, PlacedAsset, Scene, SceneAsset},
    },
    device::GraphicsDevice,
    error::SceneError,
    resources::{decode::AssetDecoder, texture::load_image},
};

pub mod decode;
pub mod texture;

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> Result<reqwest::Url, SceneError> {
    let origin = web_sys::window()
        .ok_or_else(|| SceneError::fetch(file_name, "no browser window"))?
        .location()
        .origin()
        .map_err(|_| SceneError::fetch(file_name, "page origin unavailable"))?;
    let base = reqwest::Url::parse(&format!("{}/{}/", origin, root.trim_matches('/')))
        .map_err(|e| SceneError::fetch(file_name, e))?;
    base.join(file_name).map_err(|e| SceneError::fetch(file_name, e))
}

#[cfg(not(target_arch = "wasm32"))]
fn asset_path(root: &str, file_name: &str) -> std::path::PathBuf {
    std::path::Path::new(root).join(file_name)
}

pub async fn load_string(root: &str, file_name: &str) -> Result<String, SceneError> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(root, file_name)?;
        let fetch = async { reqwest::get(url).await?.error_for_status()?.text().await };
        fetch.await.map_err(|e| SceneError::fetch(file_name, e))?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = tokio::fs::read_to_string(asset_path(root, file_name))
        .await
        .map_err(|e| SceneError::fetch(file_name, e))?;

    Ok(txt)
}

pub async fn load_binary(root: &str, file_name: &str) -> Result<Vec<u8>, SceneError> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        let fetch = async { reqwest::get(url).await?.error_for_status()?.bytes().await };
        fetch.await.map_err(|e| SceneError::fetch(file_name, e))?.to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(asset_path(root, file_name))
        .await
        .map_err(|e| SceneError::fetch(file_name, e))?;

    Ok(data)
}

/// Undecoded files of one asset.
#[derive(Debug)]
pub struct RawAsset {
    pub source: AssetSource,
    pub obj: String,
    pub mtl: String,
    pub texture: image::DynamicImage,
}

pub async fn fetch_asset(root: &str, source: &AssetSource) -> Result<RawAsset, SceneError> {
    let (obj, mtl, texture) = futures::try_join!(
        load_string(root, &source.obj),
        load_string(root, &source.mtl),
        load_image(root, &source.texture),
    )?;
    Ok(RawAsset {
        source: source.clone(),
        obj,
        mtl,
        texture,
    })
}

/// Decodes a fetched asset and uploads it.
pub fn upload_asset<D: GraphicsDevice>(
    device: &mut D,
    decoder: &impl AssetDecoder,
    raw: RawAsset,
) -> Result<SceneAsset<D>, SceneError> {
    let geometries = decoder.decode_geometry(&raw.source.obj, &raw.obj)?;
    let materials = decoder.decode_materials(&raw.source.mtl, &raw.mtl)?;
    SceneAsset::load(device, &raw.source.name, geometries, &materials, &raw.texture)
}

/// Builds the complete scene: both assets, the floor and every instance position.
///
/// Nothing is returned unless every fetch, decode and upload succeeded.
pub async fn load_scene<D, R>(
    device: &mut D,
    config: &SceneConfig,
    decoder: &impl AssetDecoder,
    placement: &mut PlacementGenerator<R>,
) -> Result<Scene<D>, SceneError>
where
    D: GraphicsDevice,
    R: rand::Rng,
{
    let root = config.asset_root.as_str();
    log::info!("Fetching scene assets from {root}.");
    let (tree, rock, floor_image) = futures::try_join!(
        fetch_asset(root, &config.tree),
        fetch_asset(root, &config.rock),
        load_image(root, &config.floor_texture),
    )?;

    let tree = upload_asset(device, decoder, tree)?;
    let rock = upload_asset(device, decoder, rock)?;
    let floor = Floor::new(device, config.floor_half_extent, &floor_image);

    let scene = Scene {
        floor,
        trees: PlacedAsset {
            asset: tree,
            positions: placement.generate(config.tree_count, config.placement_extent),
        },
        rocks: PlacedAsset {
            asset: rock,
            positions: placement.generate(config.rock_count, config.placement_extent),
        },
    };
    log::info!(
        "Scene ready: {} trees, {} rocks, {} draw calls per frame.",
        scene.trees.positions.len(),
        scene.rocks.positions.len(),
        scene.draw_count()
    );
    Ok(scene)
}
