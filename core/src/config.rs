//! Run configuration types
//!
//! A [`RunConfig`] is loaded once from `config.json` at the start of a run
//! and never mutated afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::request::SamplingParams;

/// Idle connections kept per host when the config does not say otherwise
pub const DEFAULT_MAX_KEEPALIVE_CONNECTIONS: usize = 20;

/// Fields that must be present in the config file
pub const REQUIRED_FIELDS: [&str; 5] = ["questions", "concurrent", "url", "model", "timeout"];

/// Immutable per-run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of questions to send (truncated to what the question file holds)
    pub questions: usize,

    /// Concurrency level, also the batch size
    pub concurrent: usize,

    /// Base URL of the OpenAI-compatible server
    pub url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Request timeout in seconds
    pub timeout: f64,

    /// Display name of the server, used for the artifact file name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,

    /// Size of the idle connection pool
    #[serde(default = "default_max_keepalive")]
    pub max_keepalive_connections: usize,

    /// Bearer token, omitted from requests when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Completion token cap
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_max_keepalive() -> usize {
    DEFAULT_MAX_KEEPALIVE_CONNECTIONS
}

fn default_temperature() -> f32 {
    SamplingParams::default().temperature
}

fn default_max_tokens() -> u32 {
    SamplingParams::default().max_tokens
}

impl RunConfig {
    /// Create a config for the given server and model with one question,
    /// sequential execution and a 60 second timeout
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            questions: 1,
            concurrent: 1,
            url: url.into(),
            model: model.into(),
            timeout: 60.0,
            server_name: None,
            max_keepalive_connections: DEFAULT_MAX_KEEPALIVE_CONNECTIONS,
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    /// Set the question count
    pub fn with_questions(mut self, questions: usize) -> Self {
        self.questions = questions;
        self
    }

    /// Set the concurrency level
    pub fn with_concurrency(mut self, concurrent: usize) -> Self {
        self.concurrent = concurrent;
        self
    }

    /// Set the request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: f64) -> Self {
        self.timeout = timeout_secs;
        self
    }

    /// Set the server display name
    pub fn with_server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = Some(name.into());
        self
    }

    /// Load and validate a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a config from JSON text
    ///
    /// Required fields are checked by name before typed deserialization so
    /// the error names the missing field.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;

        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(ConfigError::MissingField(field));
            }
        }

        let config: RunConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.questions == 0 {
            return Err(ConfigError::InvalidQuestionCount(
                "questions must be at least 1".into(),
            ));
        }

        if self.concurrent == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrent must be at least 1".into(),
            ));
        }

        if !self.timeout.is_finite() || self.timeout <= 0.0 {
            return Err(ConfigError::InvalidTimeout(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout
            )));
        }

        if Duration::try_from_secs_f64(self.timeout).is_err() {
            return Err(ConfigError::InvalidTimeout(format!(
                "timeout of {} seconds is out of range",
                self.timeout
            )));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel("model must not be empty".into()));
        }

        validate_url(&self.url)
    }

    /// Request timeout as a [`Duration`]
    ///
    /// Values `validate` would reject saturate: negative or NaN becomes
    /// zero, anything too large becomes [`Duration::MAX`].
    pub fn request_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout).unwrap_or(if self.timeout > 0.0 {
            Duration::MAX
        } else {
            Duration::ZERO
        })
    }

    /// Name used for display and for the artifact path: `server_name`, or
    /// the URL when no name is configured
    pub fn server_display_name(&self) -> &str {
        self.server_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.url)
    }

    /// Sampling parameters sent with every chat request
    pub fn sampling_params(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// Basic URL sanity: http(s) scheme, a host, no whitespace
fn validate_url(url: &str) -> Result<(), ConfigError> {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or_else(|| {
            ConfigError::InvalidUrl(format!("{url:?} must start with http:// or https://"))
        })?;

    if url.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidUrl(format!(
            "{url:?} must not contain whitespace"
        )));
    }

    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = host.rsplit('@').next().unwrap_or_default();
    let host_name = host.split(':').next().unwrap_or_default();
    if host_name.is_empty() && !host.starts_with('[') {
        return Err(ConfigError::InvalidUrl(format!("{url:?} has no host")));
    }

    Ok(())
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file does not exist
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Config file exists but could not be read
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid JSON or has wrongly typed fields
    #[error("invalid JSON in config: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Top-level JSON value is not an object
    #[error("config must be a JSON object")]
    NotAnObject,

    /// A required field is absent
    #[error("missing required field in config: {0}")]
    MissingField(&'static str),

    /// Invalid question count
    #[error("Invalid question count: {0}")]
    InvalidQuestionCount(String),

    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Invalid model identifier
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// URL failed the sanity check
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
}
