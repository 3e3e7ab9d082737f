//! Artifact file names

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Make a server or model name safe for use in a file name
///
/// Whitespace becomes `-`, every run of other characters that are neither
/// alphanumeric nor `-`/`_` collapses into a single `_`.
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;

    for c in name.trim().chars() {
        if c.is_whitespace() {
            out.push('-');
            in_run = false;
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    out
}

/// `result_<server>_<model>.json`
pub fn artifact_file_name(server: &str, model: &str) -> String {
    format!("result_{}_{}.json", sanitize(server), sanitize(model))
}

/// `emergency_results_<YYYYmmdd_HHMMSS>.json`
pub fn emergency_file_name(at: DateTime<Local>) -> String {
    format!("emergency_results_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Siblings of a re-scored artifact: `<stem>_quality.json` and
/// `<stem>_quality_report.json`
pub fn quality_file_paths(artifact: &Path) -> (PathBuf, PathBuf) {
    let stem = artifact
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    (
        artifact.with_file_name(format!("{stem}_quality.json")),
        artifact.with_file_name(format!("{stem}_quality_report.json")),
    )
}
