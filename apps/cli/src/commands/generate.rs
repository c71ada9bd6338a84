//! Generate command implementation.

use crate::progress::BarSink;
use crate::render::{OutputFormat, render};
use anyhow::{Result, bail};
use colored::Colorize;
use std::sync::Arc;
use thoughtchain_orchestrator::{Orchestrator, StrategyKind};

/// Runs the selected strategies and prints the rendering to stdout.
///
/// An empty selection means tree search only. Fails after printing if any
/// strategy failed.
pub async fn execute(
    orchestrator: Orchestrator,
    problem: &str,
    strategies: &[StrategyKind],
    format: OutputFormat,
) -> Result<()> {
    let selection: &[StrategyKind] =
        if strategies.is_empty() { &[StrategyKind::TreeSearch] } else { strategies };

    let bar = Arc::new(BarSink::new(selection.len()));
    let orchestrator = orchestrator.with_progress(bar.clone());
    let report = orchestrator.run(problem, selection).await?;
    bar.finish();

    println!("{}", render(&report, format)?);

    let failed: Vec<StrategyKind> = report.failures().map(|(kind, _)| kind).collect();
    if !failed.is_empty() {
        for kind in &failed {
            eprintln!("{} {} did not complete", "✗".red(), kind.label().bold());
        }
        bail!("{} of {} strategies failed", failed.len(), report.runs.len());
    }
    Ok(())
}
