//! Capture errors.

/// Errors raised while mounting or running a dispatcher.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("input tracking requires a tokio runtime")]
    NoRuntime,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors parsing tracking options.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid tracking options JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("invalid tracking options YAML: {0}")]
    Yaml(#[source] serde_yaml::Error),
}
