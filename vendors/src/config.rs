//! Client configuration

use std::time::Duration;

use stresstest_core::{RunConfig, VendorError};

/// Everything needed to build an [`OpenAiCompatClient`](crate::OpenAiCompatClient)
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Server URL as configured, with or without the `/v1` suffix
    pub endpoint: String,

    /// Bearer token, omitted when absent
    pub api_key: Option<String>,

    /// Whole-request timeout
    pub request_timeout: Duration,

    /// Connection establishment timeout
    pub connect_timeout: Duration,

    /// Idle connections kept per host
    pub max_idle_connections: usize,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

impl ClientConfig {
    /// Create a config with default timeouts
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: None,
            request_timeout: Duration::from_secs(300),
            connect_timeout: default_connect_timeout(),
            max_idle_connections: stresstest_core::config::DEFAULT_MAX_KEEPALIVE_CONNECTIONS,
        }
    }

    /// Derive the client settings of a run
    pub fn from_run_config(config: &RunConfig) -> Self {
        let request_timeout = config.request_timeout();
        Self {
            endpoint: config.url.clone(),
            api_key: config.api_key.clone(),
            request_timeout,
            connect_timeout: default_connect_timeout().min(request_timeout),
            max_idle_connections: config.max_keepalive_connections,
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), VendorError> {
        if self.endpoint.trim().is_empty() {
            return Err(VendorError::Config("endpoint must not be empty".into()));
        }
        if self.request_timeout.is_zero() {
            return Err(VendorError::Config("request timeout must be positive".into()));
        }
        if self.connect_timeout.is_zero() {
            return Err(VendorError::Config("connect timeout must be positive".into()));
        }
        Ok(())
    }
}

/// Append `/v1` to a server URL unless it already ends with it
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}

/// Server root without the `/v1` suffix
pub fn root_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_string()
}
