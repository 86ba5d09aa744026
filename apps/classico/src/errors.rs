use std::path::PathBuf;

use thiserror::Error;

/// Application-level error type.
/// The layout core never fails; these cover configuration, report output, and task plumbing.
#[derive(Debug, Error)]
pub enum ClassicoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file {}: {reason}", .path.display())]
    ConfigFile { path: PathBuf, reason: String },

    #[error("Config file parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
