//! Orchestrator execution logic

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::RunConfig;
use crate::error::{StressError, StressResult};
use crate::events::{RunEvent, RunPhase};
use crate::metrics::{ModelMetadata, RunAggregate, RunArtifact, RunMeta};
use crate::response::QuestionResult;
use crate::traits::{ArtifactStore, ChatClient, PostRunHook};
use crate::worker::RequestExecutor;

use super::aggregator::aggregate_results;
use super::hook::spawn_post_hook;
use super::scheduler::BatchScheduler;
use super::warmup::warm_up;

/// What a finished run produced
#[derive(Debug)]
pub struct RunReport {
    /// Where the artifact was written
    pub artifact_path: PathBuf,
    /// Whether the artifact went to the emergency location
    pub emergency: bool,
    /// The persisted artifact
    pub artifact: RunArtifact,
    /// Running post-run hook, if one was configured; resolves once the hook
    /// finished or hit its deadline
    pub post_hook: Option<JoinHandle<()>>,
}

impl RunReport {
    /// Summary statistics of the run
    pub fn aggregate(&self) -> &RunAggregate {
        &self.artifact.aggregate
    }
}

/// Orchestrator owns everything scoped to one run
///
/// Created through [`OrchestratorBuilder`](super::OrchestratorBuilder).
pub struct Orchestrator {
    /// Run configuration
    pub(crate) config: RunConfig,

    /// Chat client (shared with the executor)
    pub(crate) client: Arc<dyn ChatClient>,

    /// Sends and scores single questions
    pub(crate) executor: RequestExecutor,

    /// Artifact persistence
    pub(crate) store: Arc<dyn ArtifactStore>,

    /// Job launched after persisting
    pub(crate) hook: Option<Arc<dyn PostRunHook>>,

    /// Bound on the hook
    pub(crate) hook_timeout: Duration,

    /// Progress events
    pub(crate) events: mpsc::Sender<RunEvent>,
}

impl Orchestrator {
    /// Get the run configuration
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Location the artifact of this run will be written to
    pub fn artifact_path(&self) -> PathBuf {
        self.store
            .artifact_path(self.config.server_display_name(), &self.config.model)
    }

    /// Run the stress test over `questions`
    ///
    /// Returns an error only for unrecoverable failures: connection test,
    /// or an artifact that could not be written anywhere. Request failures
    /// and timeouts end up in the artifact.
    pub async fn run(&self, questions: Vec<String>) -> StressResult<RunReport> {
        let started = Local::now();
        tracing::info!(
            server = self.config.server_display_name(),
            url = %self.config.url,
            model = %self.config.model,
            questions = questions.len(),
            concurrent = self.config.concurrent,
            "Starting stress test"
        );

        // CONNECTING
        self.enter(RunPhase::Connecting);
        let model_info = match self.connect().await {
            Ok(info) => info,
            Err(e) => {
                self.enter(RunPhase::Aborted);
                return Err(e);
            }
        };

        // WARMUP
        let total = questions.len();
        let mut results = Vec::with_capacity(total);
        let mut load_time_ms = 0.0;
        let mut aborted_on_timeout = false;

        if let Some(first) = questions.first() {
            self.enter(RunPhase::Warmup);
            let warmup = warm_up(&self.executor, first).await;
            self.emit(RunEvent::WarmupFinished {
                warmup_ms: warmup.warmup_ms,
                hot_ms: warmup.hot_ms,
                load_time_ms: warmup.load_time_ms,
            });
            self.emit_completed(&warmup.result, 1, total);

            load_time_ms = warmup.load_time_ms;
            aborted_on_timeout = warmup.timed_out();
            results.push(warmup.result);

            if aborted_on_timeout {
                tracing::warn!("Timeout during warmup, skipping remaining questions");
            }
        } else {
            tracing::warn!("No questions to run, skipping warmup");
        }

        // BATCH_EXECUTION
        if !aborted_on_timeout && total > 1 {
            self.enter(RunPhase::BatchExecution);
            let scheduler = BatchScheduler::new(&self.executor, self.config.concurrent);
            let mut completed = results.len();
            let batch = scheduler
                .run(&questions[1..], |result| {
                    completed += 1;
                    self.emit_completed(result, completed, total);
                })
                .await;

            aborted_on_timeout = batch.aborted_on_timeout;
            results.extend(batch.results);
        }

        if aborted_on_timeout {
            self.emit(RunEvent::AbortedOnTimeout {
                completed: results.len(),
            });
        }

        // AGGREGATING
        self.enter(RunPhase::Aggregating);
        let aggregate = aggregate_results(&results, load_time_ms);

        // PERSISTING
        self.enter(RunPhase::Persisting);
        let meta = RunMeta::new(&self.config, model_info, started, Local::now())
            .with_outcome(results.len(), aborted_on_timeout);
        let artifact = RunArtifact {
            meta,
            results,
            aggregate,
        };

        let (artifact_path, emergency) = match self.persist(&artifact) {
            Ok(saved) => saved,
            Err(e) => {
                self.enter(RunPhase::Aborted);
                return Err(e);
            }
        };

        tracing::info!(
            path = %artifact_path.display(),
            executed = artifact.meta.questions_executed,
            aborted_on_timeout,
            runtime_avg = artifact.aggregate.runtime_avg,
            quality_avg = artifact.aggregate.quality_avg,
            "Stress test finished"
        );

        // POST_HOOK, only when the artifact sits where the hook will look
        let post_hook = match &self.hook {
            Some(hook) if emergency => {
                tracing::warn!(
                    hook = hook.name(),
                    path = %artifact_path.display(),
                    "Skipping post-run hook, results only in emergency file"
                );
                None
            }
            Some(hook) => {
                self.enter(RunPhase::PostHook);
                Some(spawn_post_hook(Arc::clone(hook), self.hook_timeout))
            }
            None => None,
        };

        self.enter(RunPhase::Done);

        Ok(RunReport {
            artifact_path,
            emergency,
            artifact,
            post_hook,
        })
    }

    /// Connection test plus best-effort metadata fetch
    async fn connect(&self) -> StressResult<ModelMetadata> {
        let models = self
            .client
            .list_models()
            .await
            .map_err(|e| {
                tracing::error!(url = self.client.base_url(), error = %e, "Connection test failed");
                StressError::connection(self.client.base_url(), e)
            })?;

        tracing::info!(
            url = self.client.base_url(),
            available_models = models.len(),
            "Connection established"
        );
        if !models.is_empty() && !models.iter().any(|m| m == &self.config.model) {
            tracing::warn!(model = %self.config.model, "Model not listed by server");
        }

        match self.client.model_metadata(&self.config.model).await {
            Ok(info) => {
                tracing::debug!(?info, "Model metadata");
                Ok(info)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Model metadata unavailable");
                Ok(ModelMetadata::default())
            }
        }
    }

    /// Primary write, falling back to the emergency dump
    fn persist(&self, artifact: &RunArtifact) -> StressResult<(PathBuf, bool)> {
        let path = self.artifact_path();
        match self.store.persist(&path, artifact) {
            Ok(saved) => Ok((saved, false)),
            Err(primary) => {
                tracing::error!(path = %path.display(), error = %primary, "Failed to save results");
                match self.store.emergency_dump(artifact) {
                    Ok(saved) => {
                        tracing::warn!(path = %saved.display(), "Results saved to emergency file");
                        Ok((saved, true))
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Emergency save failed");
                        Err(e.into())
                    }
                }
            }
        }
    }

    fn enter(&self, phase: RunPhase) {
        tracing::debug!(%phase, "Entering phase");
        self.emit(RunEvent::PhaseChanged(phase));
    }

    fn emit_completed(&self, result: &QuestionResult, completed: usize, total: usize) {
        self.emit(RunEvent::QuestionCompleted {
            completed,
            total,
            elapsed_ms: result.elapsed_ms,
            error: result.error,
        });
    }

    fn emit(&self, event: RunEvent) {
        // Dropped when the channel is full or closed
        let _ = self.events.try_send(event);
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("client", &self.client.vendor_name())
            .field("executor", &self.executor)
            .field("hook", &self.hook.as_ref().map(|h| h.name().to_string()))
            .finish()
    }
}

/// Refuse to replace an existing artifact unless forced or confirmed
///
/// `confirm` is only asked when the file exists and `force` is false.
pub fn guard_overwrite<F>(
    store: &dyn ArtifactStore,
    path: &Path,
    force: bool,
    confirm: F,
) -> StressResult<()>
where
    F: FnOnce(&Path) -> bool,
{
    if force || !store.exists(path) {
        return Ok(());
    }

    if confirm(path) {
        tracing::info!(path = %path.display(), "Overwriting existing result file");
        Ok(())
    } else {
        tracing::info!(path = %path.display(), "Existing result file kept, aborting");
        Err(StressError::OverwriteDeclined(path.to_path_buf()))
    }
}
