//! Engine data structures: meshes, materials, instances, textures and the scene.
//!
//! - `model` holds decoded meshes and materials before upload
//! - `instance` places instances on the ground plane
//! - `scene` ties uploaded assets and their positions together
//! - `texture` is the GPU texture wrapper used by the wgpu device

pub mod instance;
pub mod model;
pub mod scene;
pub mod texture;
