//! forest-ngin
//!
//! A small forest scene renderer for native and WASM targets. It loads a tree
//! and a rock model (OBJ + MTL + texture), scatters instances of both over a
//! textured ground plane and redraws the scene every frame through a single
//! lit pipeline, with a mouse-wheel zoom camera.
//!
//! High-level modules
//! - `camera`: zoom controller and per-frame view/projection
//! - `config`: scene parameters and asset file names
//! - `context`: wgpu device/surface implementation of [`device::GraphicsDevice`]
//! - `data_structures`: meshes, materials, instances, textures and the scene
//! - `device`: the graphics device seam used by the renderer
//! - `error`: the crate error type
//! - `flow`: window lifecycle and the frame loop
//! - `pipelines`: the lit pipeline and its shading law
//! - `resources`: fetching and decoding assets into a scene
//! - `render`: per-frame draw sequence
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod device;
pub mod error;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath;
pub use config::SceneConfig;
pub use error::SceneError;
pub use wgpu;
pub use winit;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Web entry point, started by the wasm-bindgen glue once the module loads.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    flow::run(SceneConfig::default()).map_err(|e| JsValue::from_str(&e.to_string()))
}
