//! Orchestrator for the run lifecycle
//!
//! The Orchestrator drives one stress test through its phases:
//!
//! `CONNECTING -> WARMUP -> BATCH_EXECUTION -> AGGREGATING -> PERSISTING
//! -> [POST_HOOK] -> DONE`, with `ABORTED` on unrecoverable failures.
//!
//! Config and question loading happen before the orchestrator is built; the
//! CLI reports those phases itself.
//!
//! - Warmup: the first question is sent twice; the cold answer is dropped
//!   and the difference gives the load-time estimate
//! - Batches: the remaining questions in chunks of `concurrent`, stopping
//!   after the first chunk containing a timeout
//! - Persisting: one JSON artifact per server/model pair, with an emergency
//!   fallback location
//! - Post hook: launched on its own task with a deadline; outcome only logged
//!
//! # Example
//!
//! ```ignore
//! use stresstest_core::OrchestratorBuilder;
//!
//! let (orchestrator, events_rx) = OrchestratorBuilder::new(config)
//!     .client(client)
//!     .evaluator(evaluator)
//!     .store(store)
//!     .build()?;
//!
//! let report = orchestrator.run(questions).await?;
//! ```

mod aggregator;
mod builder;
mod executor;
mod hook;
mod scheduler;
mod warmup;

pub use aggregator::aggregate_results;
pub use builder::OrchestratorBuilder;
pub use executor::{guard_overwrite, Orchestrator, RunReport};
pub use hook::{spawn_post_hook, SubprocessHook, DEFAULT_HOOK_TIMEOUT};
pub use scheduler::{BatchOutcome, BatchScheduler};
pub use warmup::{warm_up, WarmupOutcome};
