use thiserror::Error;

use surface_model::BuildError;
use surface_openapi::DocumentError;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("failed to decode plugin request: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("plugin request carries no document")]
    MissingDocument,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("generation failed with {count} error(s)")]
    Reported { count: usize },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
