use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading an OpenAPI document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to parse OpenAPI document as JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse OpenAPI document as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
