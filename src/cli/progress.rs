//! Progress bar fed by run events

use indicatif::{ProgressBar, ProgressStyle};
use stresstest_core::{RunEvent, RunPhase};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Drive a progress bar until the sender side is dropped
pub fn spawn(mut events: mpsc::Receiver<RunEvent>, total: usize) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }

        let mut failures = 0usize;
        while let Some(event) = events.recv().await {
            match event {
                RunEvent::PhaseChanged(phase) => {
                    bar.set_message(phase.to_string());
                    if phase == RunPhase::Aborted {
                        bar.abandon_with_message("ABORTED");
                    }
                }
                RunEvent::WarmupFinished { load_time_ms, .. } => {
                    bar.println(format!("Warmup done, estimated load time {load_time_ms:.1} ms"));
                }
                RunEvent::QuestionCompleted {
                    completed,
                    elapsed_ms,
                    error,
                    ..
                } => {
                    if error.is_some() {
                        failures += 1;
                    }
                    bar.set_position(completed as u64);
                    bar.set_message(format!("last {elapsed_ms:.0} ms, {failures} failed"));
                }
                RunEvent::AbortedOnTimeout { completed } => {
                    bar.println(format!("Timeout after {completed} questions, stopping early"));
                }
            }
        }

        if !bar.is_finished() {
            bar.finish_with_message(format!("done, {failures} failed"));
        }
    })
}
