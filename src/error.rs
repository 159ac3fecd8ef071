//! Startup failures.
//!
//! Every variant aborts scene startup. Once the frame loop runs there is no error
//! channel left: per-frame faults are clamped or logged instead.

use thiserror::Error;

pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum SceneError {
    /// Raw asset bytes could not be obtained from disk or the network.
    #[error("could not fetch asset `{path}`: {source}")]
    AssetFetch {
        path: String,
        #[source]
        source: BoxedError,
    },
    /// The bytes arrived but are not a readable mesh, material table or image.
    #[error("could not decode asset `{path}`: {reason}")]
    Decode { path: String, reason: String },
    /// A geometry names a material its material table does not define.
    #[error("asset `{asset}` references undefined material `{material}`")]
    MissingMaterial { asset: String, material: String },
    #[error("no capable rendering surface: {0}")]
    GraphicsContextUnavailable(String),
}

impl SceneError {
    pub(crate) fn fetch(path: &str, source: impl Into<BoxedError>) -> Self {
        Self::AssetFetch {
            path: path.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn decode(path: &str, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
