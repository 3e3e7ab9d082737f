//! `evaluate` command: score a result file again

use anyhow::Context;
use serde::Serialize;
use stresstest_core::RunMeta;
use stresstest_quality::{dataset_report, rescore_artifact, DatasetReport, HeuristicEvaluator};
use stresstest_storage::{quality_file_paths, read_artifact, write_json_atomic};

use super::EvaluateArgs;

/// Report as written to disk, with the run it describes
#[derive(Serialize)]
struct ReportFile<'a> {
    #[serde(flatten)]
    report: &'a DatasetReport,
    original_meta: &'a RunMeta,
    evaluation_timestamp: String,
}

pub fn evaluate(args: &EvaluateArgs) -> anyhow::Result<()> {
    let artifact = read_artifact(&args.result_file)
        .with_context(|| format!("loading result file {}", args.result_file.display()))?;
    tracing::info!(
        path = %args.result_file.display(),
        results = artifact.results.len(),
        "Loaded result file"
    );

    let (default_output, default_report) = quality_file_paths(&args.result_file);
    let output = args.output.clone().unwrap_or(default_output);
    let report_path = args.report.clone().unwrap_or(default_report);

    let evaluator = HeuristicEvaluator::detect(None);
    let rescored = rescore_artifact(&evaluator, artifact);

    write_json_atomic(&output, &rescored.artifact)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Re-scored results saved to {}", output.display());

    let meta = &rescored.artifact.meta;
    let Some(report) = dataset_report(&rescored.artifact.results) else {
        tracing::warn!(skipped = rescored.skipped, "No answer could be scored, report not written");
        println!("No scorable answers, no quality report written");
        return Ok(());
    };

    let file = ReportFile {
        report: &report,
        original_meta: meta,
        evaluation_timestamp: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
    };
    write_json_atomic(&report_path, &file)
        .with_context(|| format!("writing {}", report_path.display()))?;
    println!("Quality report saved to {}", report_path.display());

    print_summary(meta, &report, rescored.skipped);
    Ok(())
}

fn verdict(avg_quality: f64) -> &'static str {
    match avg_quality {
        q if q >= 0.8 => "Excellent model performance",
        q if q >= 0.6 => "Good model performance",
        q if q >= 0.4 => "Acceptable performance, room for improvement",
        _ => "Weak performance, check model or configuration",
    }
}

fn print_summary(meta: &RunMeta, report: &DatasetReport, skipped: usize) {
    let dist = &report.summary.quality_distribution;

    println!();
    println!("{:=<60}", "");
    println!("Server:      {} ({})", meta.server_name, meta.server);
    println!("Model:       {}", meta.model);
    println!(
        "Evaluated:   {} answers, {} skipped",
        report.summary.total_evaluated, skipped
    );
    println!("Quality:     avg {:.3}", report.summary.avg_quality);
    println!(
        "Efficiency:  {:.3} quality per second",
        report.performance_quality_analysis.quality_efficiency
    );
    println!("{:-<40}", "");
    println!("Excellent (>= 0.8):   {}", dist.excellent);
    println!("Good (0.6-0.8):       {}", dist.good);
    println!("Acceptable (0.4-0.6): {}", dist.acceptable);
    println!("Poor (< 0.4):         {}", dist.poor);
    println!("{:-<40}", "");
    println!("{}", verdict(report.summary.avg_quality));
    println!("{:=<60}", "");
}
