use crate::{error::SceneError, resources::load_binary};

/// Fetches and decodes an image. The format is guessed from the bytes.
pub async fn load_image(root: &str, file_name: &str) -> Result<image::DynamicImage, SceneError> {
    let data = load_binary(root, file_name).await?;
    decode_image(file_name, &data)
}

pub fn decode_image(file_name: &str, bytes: &[u8]) -> Result<image::DynamicImage, SceneError> {
    image::load_from_memory(bytes).map_err(|e| SceneError::decode(file_name, e))
}
