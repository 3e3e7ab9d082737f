//! stresstest-core: the run loop of llm-stresstest
//!
//! This crate holds everything a stress test run needs apart from the
//! concrete collaborators:
//!
//! - Data model (config, questions results, aggregates, artifacts)
//! - Core traits (ChatClient, QualityEvaluator, QuestionSource,
//!   ArtifactStore, PostRunHook)
//! - Request execution, warmup, batch scheduling, aggregation
//! - Run orchestration and progress events
//! - Error handling

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod events;
pub mod metrics;
pub mod orchestrator;
pub mod request;
pub mod response;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod testing;

pub use channel::ChannelConfig;
pub use config::{ConfigError, RunConfig};
pub use error::*;
pub use events::{RunEvent, RunPhase};
pub use metrics::*;
pub use orchestrator::{
    aggregate_results, guard_overwrite, Orchestrator, OrchestratorBuilder, RunReport,
    SubprocessHook, DEFAULT_HOOK_TIMEOUT,
};
pub use request::*;
pub use response::*;
pub use traits::*;
pub use worker::RequestExecutor;
