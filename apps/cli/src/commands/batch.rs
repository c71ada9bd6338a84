//! Batch command implementation.
//!
//! Runs all four strategies on one problem and writes the combined JSON
//! document.

use crate::progress::BarSink;
use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use thoughtchain_orchestrator::{BatchDocument, Orchestrator, StrategyKind};

/// Execute batch command.
pub async fn execute(orchestrator: Orchestrator, problem: &str, output: &Path) -> Result<()> {
    let bar = Arc::new(BarSink::new(StrategyKind::ALL.len()));
    let orchestrator = orchestrator.with_progress(bar.clone());
    let report = orchestrator.run_all(problem).await?;
    bar.finish();

    let document = BatchDocument::from_report(&report);
    document
        .write_to(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let completed = report.envelopes().count();
    println!(
        "{} Wrote {} ({}/{} strategies)",
        "✓".green(),
        output.display().to_string().cyan(),
        completed,
        report.runs.len()
    );

    if !report.is_complete() {
        for (kind, error) in report.failures() {
            eprintln!("{} {}: {}", "✗".red(), kind.label().bold(), error);
        }
        bail!("{} of {} strategies failed", report.runs.len() - completed, report.runs.len());
    }
    Ok(())
}
