//! Post-run hook execution

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::traits::{HookError, HookOutcome, PostRunHook};

/// Default bound on the registry update
pub const DEFAULT_HOOK_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs an external program as the post-run hook
#[derive(Debug, Clone)]
pub struct SubprocessHook {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl SubprocessHook {
    /// Hook running `program` with `args`
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[async_trait]
impl PostRunHook for SubprocessHook {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> Result<HookOutcome, HookError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(HookOutcome {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Launch a hook on its own task, bounded by `timeout`
///
/// The outcome is only logged. A hook still running at the deadline is
/// dropped, which kills a subprocess hook.
pub fn spawn_post_hook(hook: Arc<dyn PostRunHook>, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(hook = hook.name(), timeout_secs = timeout.as_secs_f64(), "Starting post-run hook");

        let outcome = match tokio::time::timeout(timeout, hook.run()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(HookError::TimedOut(timeout)),
        };

        match outcome {
            Ok(outcome) if outcome.success() => {
                tracing::info!(hook = hook.name(), "Post-run hook finished successfully");
                if !outcome.stdout.trim().is_empty() {
                    tracing::debug!(hook = hook.name(), stdout = %outcome.stdout.trim(), "Hook output");
                }
            }
            Ok(outcome) => {
                tracing::warn!(
                    hook = hook.name(),
                    exit_code = ?outcome.exit_code,
                    stderr = %outcome.stderr.trim(),
                    "Post-run hook failed"
                );
            }
            Err(e) => {
                tracing::warn!(hook = hook.name(), error = %e, "Post-run hook did not complete");
            }
        }
    })
}
