//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

mod evaluate;
mod progress;
mod registry;
mod run;

#[derive(Parser)]
#[command(name = "llm-stresstest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options of a stress test run
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Overwrite an existing result file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Run configuration
    #[arg(short, long, env = "STRESSTEST_CONFIG", default_value = "config.json")]
    pub config: PathBuf,

    /// Question file
    #[arg(short, long, env = "STRESSTEST_QUESTIONS", default_value = "questions.json")]
    pub questions: PathBuf,

    /// Directory for result artifacts
    #[arg(long, env = "STRESSTEST_RESULTS_DIR", default_value = stresstest_storage::DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Do not update the model registry after the run
    #[arg(long)]
    pub skip_registry_update: bool,

    /// Seconds to wait for the registry update
    #[arg(long, default_value_t = 60.0)]
    pub registry_timeout: f64,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan result files and update the model registry
    UpdateRegistry(RegistryArgs),

    /// Score the answers of a result file again and write a quality report
    Evaluate(EvaluateArgs),
}

/// Options of the quality re-evaluation
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Result file written by a stress test run
    pub result_file: PathBuf,

    /// Re-scored result file [default: <input>_quality.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Quality report [default: <input>_quality_report.json]
    #[arg(short, long)]
    pub report: Option<PathBuf>,
}

/// Options of the registry update
#[derive(Args, Debug, Clone)]
pub struct RegistryArgs {
    /// Directory with result artifacts
    #[arg(long, env = "STRESSTEST_RESULTS_DIR", default_value = stresstest_storage::DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Registry file
    #[arg(long, default_value = stresstest_registry::DEFAULT_MODELS_FILE)]
    pub models_file: PathBuf,

    /// Local Ollama endpoint
    #[arg(long, default_value = stresstest_registry::sources::DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Hugging Face endpoint
    #[arg(long, default_value = stresstest_registry::sources::DEFAULT_HUGGINGFACE_URL)]
    pub huggingface_url: String,

    /// Skip Hugging Face lookups
    #[arg(long)]
    pub offline: bool,
}

impl Cli {
    /// Prefix of the log file of this invocation
    pub fn log_file_prefix(&self) -> &'static str {
        match self.command {
            Some(Commands::UpdateRegistry(_)) => "update_registry",
            Some(Commands::Evaluate(_)) => "quality_evaluation",
            None => "llm_stresstest",
        }
    }

    /// Dispatch to the selected command
    pub async fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::UpdateRegistry(args)) => registry::update_registry(&args).await,
            Some(Commands::Evaluate(args)) => evaluate::evaluate(&args),
            None => run::stress_test(&self.run).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["llm-stresstest"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.run.force);
        assert_eq!(cli.run.results_dir, PathBuf::from("results"));
        assert_eq!(cli.run.registry_timeout, 60.0);
        assert_eq!(cli.log_file_prefix(), "llm_stresstest");
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "llm-stresstest",
            "--force",
            "--config",
            "lab.json",
            "--skip-registry-update",
            "--registry-timeout",
            "5",
            "-v",
        ])
        .unwrap();
        assert!(cli.run.force);
        assert!(cli.verbose);
        assert!(cli.run.skip_registry_update);
        assert_eq!(cli.run.config, PathBuf::from("lab.json"));
        assert_eq!(cli.run.registry_timeout, 5.0);
    }

    #[test]
    fn test_update_registry_subcommand() {
        let cli = Cli::try_parse_from([
            "llm-stresstest",
            "update-registry",
            "--models-file",
            "/tmp/models.json",
            "--ollama-url",
            "http://gpu:11434",
        ])
        .unwrap();
        let Some(Commands::UpdateRegistry(args)) = cli.command else {
            panic!("expected update-registry");
        };
        assert_eq!(args.models_file, PathBuf::from("/tmp/models.json"));
        assert_eq!(args.ollama_url, "http://gpu:11434");
        assert_eq!(args.huggingface_url, "https://huggingface.co");
    }

    #[test]
    fn test_evaluate_subcommand() {
        let cli = Cli::try_parse_from([
            "llm-stresstest",
            "evaluate",
            "results/result_local_qwen.json",
            "-r",
            "report.json",
        ])
        .unwrap();
        assert_eq!(cli.log_file_prefix(), "quality_evaluation");
        let Some(Commands::Evaluate(args)) = cli.command else {
            panic!("expected evaluate");
        };
        assert_eq!(args.result_file, PathBuf::from("results/result_local_qwen.json"));
        assert!(args.output.is_none());
        assert_eq!(args.report, Some(PathBuf::from("report.json")));
    }
}
