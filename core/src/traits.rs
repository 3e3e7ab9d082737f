//! Core traits for the run's collaborators
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (vendors/, samplers/,
//! quality/, storage/) or in the binary.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ErrorKind;
use crate::metrics::{ModelMetadata, RunArtifact};
use crate::request::ChatRequest;
use crate::response::{ChatCompletion, QualityReport};

// ============================================================================
// Chat Client Trait
// ============================================================================

/// Client bound to one OpenAI-compatible endpoint
///
/// One client is created per run and shared by every request of that run.
/// Implementations own the connection pool and enforce the request timeout.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Vendor identifier (e.g., "openai-compatible")
    fn vendor_name(&self) -> &str;

    /// Base URL requests are sent to
    fn base_url(&self) -> &str;

    /// List the models the server exposes; doubles as the connection test
    async fn list_models(&self) -> Result<Vec<String>, VendorError>;

    /// Send one chat completion request and wait for the full answer
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, VendorError>;

    /// Best-effort model introspection
    ///
    /// Servers without an introspection endpoint return empty metadata.
    async fn model_metadata(&self, _model: &str) -> Result<ModelMetadata, VendorError> {
        Ok(ModelMetadata::default())
    }
}

/// Vendor-specific errors
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("Server error: {status} - {message}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Model not available
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Body was not a usable chat completion
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl VendorError {
    /// Whether the request exceeded its timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            VendorError::Timeout(_) => true,
            VendorError::Http(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Convert to ErrorKind for result tagging
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            VendorError::Timeout(_) => ErrorKind::Timeout,
            VendorError::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            VendorError::Http(e) if e.is_decode() => ErrorKind::MalformedResponse,
            VendorError::Http(e) if e.is_status() => ErrorKind::Server,
            VendorError::Http(e) if e.is_connect() || e.is_request() => ErrorKind::Connection,
            VendorError::Http(_) => ErrorKind::Unknown,
            VendorError::ServerError { .. } | VendorError::ModelNotFound(_) => ErrorKind::Server,
            VendorError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            VendorError::Config(_) => ErrorKind::Unknown,
        }
    }
}

// ============================================================================
// Quality Evaluator Trait
// ============================================================================

/// Scores an answer for a given question
///
/// Synchronous and pure. Callers treat both an error return and a panic as
/// "no score".
pub trait QualityEvaluator: Send + Sync {
    /// Evaluator name for logging
    fn name(&self) -> &str;

    /// Produce the full heuristic report
    fn evaluate(&self, question: &str, answer: &str) -> Result<QualityReport, QualityError>;
}

/// Quality evaluation errors
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    /// Input could not be scored
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Similarity backend failed
    #[error("Backend error: {0}")]
    Backend(String),
}

// ============================================================================
// Question Source Trait
// ============================================================================

/// Provides the ordered list of prompts for a run
pub trait QuestionSource: Send + Sync {
    /// Source name for identification
    fn name(&self) -> &str;

    /// Load up to `limit` questions in source order
    ///
    /// Returns `SamplerError::Empty` when the source holds no question.
    fn load(&self, limit: usize) -> Result<Vec<String>, SamplerError>;
}

/// Question loading errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// Question file does not exist
    #[error("question file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// IO error (e.g., reading the question file)
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("invalid JSON in question file: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Expected key is absent or does not hold a list
    #[error("question file has no list under {0:?}")]
    MissingKey(String),

    /// List entry at this index is not a string
    #[error("question {0} is not a string")]
    InvalidEntry(usize),

    /// Source holds no question
    #[error("question list is empty")]
    Empty,
}

// ============================================================================
// Artifact Store Trait
// ============================================================================

/// Persists run artifacts
pub trait ArtifactStore: Send + Sync {
    /// Deterministic artifact location for a server/model pair
    fn artifact_path(&self, server: &str, model: &str) -> PathBuf;

    /// Whether an artifact already exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Write the artifact to `path`, replacing any previous one
    fn persist(&self, path: &Path, artifact: &RunArtifact) -> Result<PathBuf, StorageError>;

    /// Fallback write to a timestamped emergency location
    fn emergency_dump(&self, artifact: &RunArtifact) -> Result<PathBuf, StorageError>;
}

/// Artifact storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem error
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Artifact could not be serialized or parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    /// Create an IO error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

// ============================================================================
// Post-Run Hook Trait
// ============================================================================

/// Job launched after the artifact is persisted
///
/// The orchestrator bounds it with a timeout and only logs its outcome.
#[async_trait]
pub trait PostRunHook: Send + Sync {
    /// Hook name for logging
    fn name(&self) -> &str;

    /// Run the hook to completion
    async fn run(&self) -> Result<HookOutcome, HookError>;
}

/// What a finished hook reported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookOutcome {
    /// Exit code, if the hook was a process that exited normally
    pub exit_code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl HookOutcome {
    /// Whether the hook reported success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Post-run hook errors
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// Hook could not be started
    #[error("failed to spawn hook: {0}")]
    Spawn(#[from] std::io::Error),

    /// Hook did not finish in time
    #[error("hook timed out after {0:?}")]
    TimedOut(Duration),

    /// Hook ran but failed
    #[error("hook failed: {0}")]
    Failed(String),
}
