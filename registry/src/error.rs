//! Registry errors

use std::path::PathBuf;

/// Result alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors raised while maintaining the model registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Filesystem error
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be read or written
    #[error("JSON error at {}: {source}", .path.display())]
    Json {
        /// Offending file
        path: PathBuf,
        /// Underlying serde error
        #[source]
        source: serde_json::Error,
    },

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl RegistryError {
    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON error bound to a path
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
