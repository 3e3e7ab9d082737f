//! `update-registry` command

use anyhow::Context;
use stresstest_registry::{ModelSources, RegistryUpdater, SourcesConfig};

use super::RegistryArgs;

pub async fn update_registry(args: &RegistryArgs) -> anyhow::Result<()> {
    let sources = ModelSources::new(SourcesConfig {
        ollama_url: Some(args.ollama_url.clone()),
        huggingface_url: (!args.offline).then(|| args.huggingface_url.clone()),
        ..Default::default()
    })
    .context("building HTTP client")?;

    let updater = RegistryUpdater::new(&args.results_dir, &args.models_file, sources);
    let summary = updater
        .run()
        .await
        .with_context(|| format!("updating {}", args.models_file.display()))?;

    if !summary.saved {
        println!(
            "No models found in {} result files under {}",
            summary.scanned_files,
            args.results_dir.display()
        );
        return Ok(());
    }

    if summary.added.is_empty() {
        println!("Registry up to date ({} models)", summary.models_found);
    } else {
        println!("Added {} models to {}:", summary.added.len(), args.models_file.display());
        for model in &summary.added {
            println!("  - {model}");
        }
    }
    Ok(())
}
