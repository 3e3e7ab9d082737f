//! Run summary types and the persisted artifact layout

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::response::QuestionResult;

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Summary statistics computed once after all questions complete
///
/// Runtime and token figures cover successful results only, quality figures
/// cover results with a positive quality score only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunAggregate {
    /// Sum of latencies (ms)
    pub runtime_sum: f64,
    /// Mean latency (ms)
    pub runtime_avg: f64,
    /// Fastest request (ms)
    pub runtime_min: f64,
    /// Slowest request (ms)
    pub runtime_max: f64,

    /// Sum of completion tokens
    pub token_sum: u64,
    /// Mean completion tokens, rounded to a whole token
    pub token_avg: f64,
    /// Fewest completion tokens
    pub token_min: u32,
    /// Most completion tokens
    pub token_max: u32,

    /// Sum of quality scores
    pub quality_sum: f64,
    /// Mean quality score
    pub quality_avg: f64,
    /// Lowest quality score
    pub quality_min: f64,
    /// Highest quality score
    pub quality_max: f64,

    /// Estimated model load time (ms)
    pub llm_load_time: f64,
    /// `llm_load_time / runtime_avg`, 0 when either is 0
    pub cold_start_factor: f64,

    /// Results recorded
    #[serde(default)]
    pub total_requests: usize,
    /// Results without error and with positive latency
    #[serde(default)]
    pub successful_requests: usize,
    /// Results carrying an error tag
    #[serde(default)]
    pub failed_requests: usize,
    /// Results that timed out
    #[serde(default)]
    pub timeout_requests: usize,
}

/// Model details reported by the server, all optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// e.g. "8.0B"
    pub parameter_size: Option<String>,
    /// e.g. "Q4_K_M"
    pub quantization_level: Option<String>,
    /// e.g. "llama"
    pub family: Option<String>,
}

impl ModelMetadata {
    /// Whether nothing is known
    pub fn is_empty(&self) -> bool {
        self.parameter_size.is_none() && self.quantization_level.is_none() && self.family.is_none()
    }
}

/// Date format of the `*_date` meta fields
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time format of the `*_time` meta fields (millisecond precision)
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Run description stored next to the results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    /// Endpoint URL
    pub server: String,
    /// Display name of the server
    pub server_name: String,
    /// Model identifier
    pub model: String,
    /// Concurrency level
    pub concurrent: usize,
    /// Configured question count
    pub questions: usize,
    /// Request timeout (s)
    pub timeout: f64,
    /// Idle connection pool size
    pub max_keepalive_connections: usize,

    /// Local start date
    pub start_date: String,
    /// Local start time
    pub start_time: String,
    /// Local end date
    pub end_date: String,
    /// Local end time
    pub end_time: String,
    /// Wall-clock duration of the whole run (ms)
    pub total_duration_ms: f64,

    /// Results actually recorded
    #[serde(default)]
    pub questions_executed: usize,
    /// Whether scheduling stopped early on a timeout
    #[serde(default)]
    pub aborted_on_timeout: bool,

    /// Model details, null when unknown
    #[serde(flatten)]
    pub model_info: ModelMetadata,
}

impl RunMeta {
    /// Describe a run of `config` between `started` and `ended`
    pub fn new(
        config: &RunConfig,
        model_info: ModelMetadata,
        started: DateTime<Local>,
        ended: DateTime<Local>,
    ) -> Self {
        let elapsed_us = (ended - started).num_microseconds().unwrap_or(0).max(0);

        Self {
            server: config.url.clone(),
            server_name: config.server_display_name().to_string(),
            model: config.model.clone(),
            concurrent: config.concurrent,
            questions: config.questions,
            timeout: config.timeout,
            max_keepalive_connections: config.max_keepalive_connections,
            start_date: started.format(DATE_FORMAT).to_string(),
            start_time: started.format(TIME_FORMAT).to_string(),
            end_date: ended.format(DATE_FORMAT).to_string(),
            end_time: ended.format(TIME_FORMAT).to_string(),
            total_duration_ms: round_to(elapsed_us as f64 / 1000.0, 1),
            questions_executed: 0,
            aborted_on_timeout: false,
            model_info,
        }
    }

    /// Record how far execution got
    pub fn with_outcome(mut self, questions_executed: usize, aborted_on_timeout: bool) -> Self {
        self.questions_executed = questions_executed;
        self.aborted_on_timeout = aborted_on_timeout;
        self
    }
}

/// Everything persisted for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    /// Run description
    pub meta: RunMeta,
    /// One entry per executed question, in execution order
    pub results: Vec<QuestionResult>,
    /// Summary statistics
    pub aggregate: RunAggregate,
}
