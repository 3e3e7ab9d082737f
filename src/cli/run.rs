//! Stress test command

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stresstest_core::{
    guard_overwrite, ArtifactStore, OrchestratorBuilder, QuestionSource, RunConfig, RunPhase,
    RunReport, SubprocessHook, DEFAULT_HOOK_TIMEOUT,
};
use stresstest_quality::HeuristicEvaluator;
use stresstest_samplers::JsonQuestionFile;
use stresstest_storage::JsonFileStore;
use stresstest_vendors::{ClientConfig, OpenAiCompatClient};

use super::{progress, RunArgs};

/// Ask on the terminal whether an existing artifact may be replaced
fn confirm_overwrite(path: &Path) -> bool {
    eprint!("{} already exists. Overwrite? [y/N] ", path.display());
    let _ = io::stderr().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes" | "j" | "ja")
}

/// The registry update runs this same binary as a separate process
fn registry_hook(args: &RunArgs) -> anyhow::Result<SubprocessHook> {
    let exe = std::env::current_exe().context("locating own executable")?;
    Ok(SubprocessHook::new("update-registry", exe)
        .arg("update-registry")
        .arg("--results-dir")
        .arg(args.results_dir.to_string_lossy()))
}

pub async fn stress_test(args: &RunArgs) -> anyhow::Result<()> {
    tracing::info!(phase = %RunPhase::LoadingConfig, path = %args.config.display(), "Loading config");
    let config = RunConfig::from_file(&args.config)
        .with_context(|| format!("loading config {}", args.config.display()))?;

    tracing::info!(phase = %RunPhase::LoadingQuestions, path = %args.questions.display(), "Loading questions");
    let questions = JsonQuestionFile::new(&args.questions)
        .load(config.questions)
        .with_context(|| format!("loading questions {}", args.questions.display()))?;

    let store = Arc::new(JsonFileStore::new(&args.results_dir));
    let artifact_path = store.artifact_path(config.server_display_name(), &config.model);
    guard_overwrite(store.as_ref(), &artifact_path, args.force, confirm_overwrite)?;

    let client = OpenAiCompatClient::new(&ClientConfig::from_run_config(&config))
        .context("building HTTP client")?;

    let mut builder = OrchestratorBuilder::new(config)
        .client(Arc::new(client))
        .evaluator(Arc::new(HeuristicEvaluator::detect(None)))
        .store(store)
        .hook_timeout(
            Duration::try_from_secs_f64(args.registry_timeout).unwrap_or(DEFAULT_HOOK_TIMEOUT),
        );
    if !args.skip_registry_update {
        builder = builder.post_hook(Arc::new(registry_hook(args)?));
    }
    let (orchestrator, events) = builder.build()?;

    let progress = progress::spawn(events, questions.len());
    let outcome = orchestrator.run(questions).await;
    drop(orchestrator);
    let _ = progress.await;

    let mut report = outcome?;
    print_summary(&report);

    if let Some(hook) = report.post_hook.take() {
        let _ = hook.await;
    }
    Ok(())
}

fn print_summary(report: &RunReport) {
    let meta = &report.artifact.meta;
    let agg = report.aggregate();

    println!();
    println!("{:=<60}", "");
    println!("Server:      {} ({})", meta.server_name, meta.server);
    println!("Model:       {}", meta.model);
    println!(
        "Questions:   {} of {} executed, concurrency {}",
        meta.questions_executed, meta.questions, meta.concurrent
    );
    if meta.aborted_on_timeout {
        println!("             stopped early after a timeout");
    }
    println!(
        "Requests:    {} ok, {} failed, {} timed out",
        agg.successful_requests, agg.failed_requests, agg.timeout_requests
    );
    println!(
        "Runtime:     avg {:.1} ms, min {:.1} ms, max {:.1} ms",
        agg.runtime_avg, agg.runtime_min, agg.runtime_max
    );
    println!("Tokens:      {} total, avg {:.0}", agg.token_sum, agg.token_avg);
    println!("Quality:     avg {:.3}", agg.quality_avg);
    println!(
        "Load time:   {:.1} ms (cold start factor {:.2})",
        agg.llm_load_time, agg.cold_start_factor
    );
    println!("Duration:    {:.1} s", meta.total_duration_ms / 1000.0);
    if report.emergency {
        println!("Results:     {} (emergency location)", report.artifact_path.display());
    } else {
        println!("Results:     {}", report.artifact_path.display());
    }
    println!("{:=<60}", "");
}
