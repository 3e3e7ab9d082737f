//! llm-stresstest CLI
//!
//! Stress-tests an LLM inference server behind an OpenAI-compatible
//! endpoint and maintains the model registry.

use std::fs::File;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::Cli;

/// Console plus per-run log file; the file is skipped if it cannot be created
fn init_logging(verbose: bool, log_file_prefix: &str) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let file_name = format!(
        "{log_file_prefix}_{}.log",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let file_layer = match File::create(&file_name) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            eprintln!("warning: cannot create log file {file_name}: {e}");
            None
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_file_prefix());

    match cli.execute().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(phase = "ABORTED", "{e:#}");
            ExitCode::FAILURE
        }
    }
}
