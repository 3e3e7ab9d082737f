//! Error types for stresstest-core

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::traits::{SamplerError, StorageError, VendorError};

/// Classification tag attached to a failed [`QuestionResult`](crate::QuestionResult)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Request exceeded the configured timeout
    Timeout,
    /// Connection refused, reset, or otherwise unreachable
    Connection,
    /// Server answered with a non-success status
    Server,
    /// Server answered, but the body was not a usable chat completion
    MalformedResponse,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Whether this kind halts further scheduling
    pub fn is_timeout(&self) -> bool {
        matches!(self, ErrorKind::Timeout)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Timeout => write!(f, "timeout"),
            ErrorKind::Connection => write!(f, "connection"),
            ErrorKind::Server => write!(f, "server"),
            ErrorKind::MalformedResponse => write!(f, "malformed_response"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Run-level error: every variant aborts the stress test
#[derive(Error, Debug)]
pub enum StressError {
    /// Configuration missing or invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Question file missing or invalid
    #[error("question loading failed: {0}")]
    Questions(#[from] SamplerError),

    /// Connection test against the server failed
    #[error("connection test against {url} failed: {source}")]
    Connection {
        /// Base URL that was tested
        url: String,
        /// Underlying transport error
        #[source]
        source: VendorError,
    },

    /// An existing result file would be overwritten and the user declined
    #[error("refusing to overwrite existing result file {}", .0.display())]
    OverwriteDeclined(PathBuf),

    /// Artifact could not be written, not even as an emergency dump
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A builder was finalized without a required component
    #[error("missing required component: {0}")]
    MissingComponent(&'static str),
}

impl StressError {
    /// Create a connection error
    pub fn connection(url: impl Into<String>, source: VendorError) -> Self {
        Self::Connection {
            url: url.into(),
            source,
        }
    }

    /// Create a missing-component error
    pub fn missing_component(name: &'static str) -> Self {
        Self::MissingComponent(name)
    }
}

/// Result type alias
pub type StressResult<T> = std::result::Result<T, StressError>;
