//! Turns a generation report into text for the terminal.

use anyhow::Result;
use clap::ValueEnum;
use pulldown_cmark::{Options, Parser, html};
use thoughtchain_orchestrator::{GenerationReport, StrategyOutcome, StrategyRun};

/// Output format for `generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One markdown section per strategy
    #[default]
    Markdown,
    /// One `method-result` div per strategy
    Html,
    /// Merged envelopes as JSON
    Json,
}

/// Renders `report` in `format`.
pub fn render(report: &GenerationReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(report)),
        OutputFormat::Html => Ok(render_html(report)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report.merged_envelopes()?)?),
    }
}

fn run_markdown(run: &StrategyRun) -> String {
    match &run.outcome {
        StrategyOutcome::Completed(envelope) => envelope.to_markdown(),
        StrategyOutcome::Failed { error } => format!("**Failed:** `{}`\n", error.replace('`', "'")),
    }
}

/// Markdown with a `##` heading per strategy label.
pub fn render_markdown(report: &GenerationReport) -> String {
    report.runs.iter().fold(String::new(), |mut out, run| {
        out.push_str(&format!("## {}\n\n{}\n", run.kind.label(), run_markdown(run).trim_end()));
        out.push('\n');
        out
    })
}

/// HTML blocks, one per strategy, in selection order.
pub fn render_html(report: &GenerationReport) -> String {
    report.runs.iter().fold(String::new(), |mut out, run| {
        out.push_str(&format!(
            "<div class='method-result'><h2>{}</h2>{}</div>",
            run.kind.label(),
            markdown_to_html(&run_markdown(run))
        ));
        out
    })
}

/// CommonMark with tables and strikethrough.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
