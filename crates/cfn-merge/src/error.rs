//! Error types for configuration loading and batch merging.
//!
//! The merge engine itself cannot fail; these errors come from the file
//! system and from parsing templates or configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading, merging and writing template files.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: cfn_yaml::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
}

impl MergeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while loading a classification file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid classification config: {0}")]
    Parse(#[from] serde_yaml::Error),
}
