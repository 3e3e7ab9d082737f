//! Run progress events
//!
//! The orchestrator reports its progress on an mpsc channel. Consumers (the
//! CLI progress bar) are optional: a closed or full channel never affects the
//! run.

use std::fmt;

use crate::error::ErrorKind;

/// States of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunPhase {
    /// Reading the config file
    LoadingConfig,
    /// Reading the question file
    LoadingQuestions,
    /// Connection test and metadata fetch
    Connecting,
    /// Probe plus hot measurement of the first question
    Warmup,
    /// Remaining questions in batches
    BatchExecution,
    /// Computing summary statistics
    Aggregating,
    /// Writing the artifact
    Persisting,
    /// Launching the registry update
    PostHook,
    /// Finished successfully
    Done,
    /// Stopped on an unrecoverable failure
    Aborted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunPhase::LoadingConfig => "LOADING_CONFIG",
            RunPhase::LoadingQuestions => "LOADING_QUESTIONS",
            RunPhase::Connecting => "CONNECTING",
            RunPhase::Warmup => "WARMUP",
            RunPhase::BatchExecution => "BATCH_EXECUTION",
            RunPhase::Aggregating => "AGGREGATING",
            RunPhase::Persisting => "PERSISTING",
            RunPhase::PostHook => "POST_HOOK",
            RunPhase::Done => "DONE",
            RunPhase::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// Progress notification sent by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// The run entered a new phase
    PhaseChanged(RunPhase),

    /// Warmup finished
    WarmupFinished {
        /// Cold request latency (ms)
        warmup_ms: f64,
        /// Hot request latency (ms)
        hot_ms: f64,
        /// Derived load time (ms)
        load_time_ms: f64,
    },

    /// One question produced its result
    QuestionCompleted {
        /// Results recorded so far
        completed: usize,
        /// Questions in the run
        total: usize,
        /// Latency of this question (ms)
        elapsed_ms: f64,
        /// Failure classification, if any
        error: Option<ErrorKind>,
    },

    /// Scheduling stopped after a timeout
    AbortedOnTimeout {
        /// Results recorded before stopping
        completed: usize,
    },
}
