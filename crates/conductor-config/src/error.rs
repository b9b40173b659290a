use std::path::PathBuf;

use thiserror::Error;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read config '{path}': {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("invalid JSON config: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid YAML config: {0}")]
  Yaml(#[from] serde_yaml::Error),
}
