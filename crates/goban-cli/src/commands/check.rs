//! Check command implementation.

use anyhow::{Context, Result};
use goban::BannedSymbols;
use goban_core::{Analyzer, Severity};
use std::path::Path;
use std::process::ExitCode;

use crate::config_resolver::{self, ConfigSource};
use crate::OutputFormat;

/// Runs the check command.
///
/// Returns exit code 1 when a violation at or above `fail_on` is reported.
pub fn run(
    path: &Path,
    ban_list: Option<&Path>,
    format: OutputFormat,
    exclude: Vec<String>,
    source: &ConfigSource,
) -> Result<ExitCode> {
    let config = source.load()?;
    let fail_on = config.fail_on.unwrap_or(Severity::Error);
    let ban_list = config_resolver::ban_list_path(ban_list, &config);

    tracing::debug!("Ban list: {}", ban_list.display());

    let analyzer = Analyzer::builder()
        .root(path)
        .config(config)
        .excludes(exclude)
        .rule(BannedSymbols::new(ban_list))
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!("Analyzing {}", analyzer.root().display());

    let result = analyzer
        .analyze()
        .with_context(|| format!("Analysis of {} failed", path.display()))?;

    super::output::print(&result, format)?;

    if result.has_violations_at(fail_on) {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
