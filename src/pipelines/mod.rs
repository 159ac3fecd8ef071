//! Render pipeline definitions.
//!
//! - `lit` builds the single textured, lit pipeline and its uniform layouts
//! - `light` holds the directional light and a CPU mirror of the shading law

pub mod light;
pub mod lit;
