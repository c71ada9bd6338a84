//! Thoughtchain CLI - long-form reasoning traces from a chat model
//!
//! This CLI provides a `thoughtchain` command that runs one or more reasoning
//! strategies over a problem and prints or saves the resulting traces.

mod commands;
mod config;
mod progress;
mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::CliConfig;
use render::OutputFormat;
use std::path::PathBuf;
use thoughtchain_orchestrator::{DEFAULT_BATCH_OUTPUT, StrategyKind};
use tracing::{Level, debug, warn};
use tracing_subscriber::FmtSubscriber;

/// Provider used when neither the flag nor a config file names one.
const DEFAULT_PROVIDER: &str = "deepseek";

/// Thoughtchain CLI - generate long-form reasoning traces
///
/// Runs tree search, propose-critique, multi-agent debate or human-annotation
/// strategies against a problem using a chat-completion model.
#[derive(Parser, Debug)]
#[command(
    name = "thoughtchain",
    author,
    version,
    about = "Thoughtchain - long-form reasoning traces from a chat model",
    long_about = "Thoughtchain turns a problem statement (code or math) into reasoning traces using four strategies.\nSet DEEPSEEK_API_KEY (environment or ./.env) for the deepseek provider, or use --provider mock to run offline."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Model provider (deepseek, mock)
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate reasoning traces and print them
    ///
    /// Runs the selected strategies in order (tree search when none is given)
    /// and prints one section per strategy.
    Generate {
        /// Problem text
        #[arg(required_unless_present = "file")]
        input: Option<String>,

        /// Read the problem from a file instead
        #[arg(long, conflicts_with = "input")]
        file: Option<PathBuf>,

        /// Strategy to run (tree-search, propose-critique, multi-agent, human-annotation); repeatable
        #[arg(short, long = "strategy", value_name = "STRATEGY")]
        strategies: Vec<StrategyKind>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },

    /// Run all four strategies and save the combined JSON document
    Batch {
        /// Problem text
        #[arg(required_unless_present = "file")]
        input: Option<String>,

        /// Read the problem from a file instead
        #[arg(long, conflicts_with = "input")]
        file: Option<PathBuf>,

        /// Output file (default: thought_chain_output.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List available strategies
    Strategies {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// `None` for names tracing does not know.
fn parse_level(level: &str) -> Option<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Variables already in the environment win over `.env`
    let dotenv = dotenvy::dotenv();

    // Load configuration before logging so the file can set the level
    let cli_config = CliConfig::discover_and_load().context("Failed to load configuration")?;

    let requested_level = args.log_level.as_deref().or(cli_config.log_level.as_deref());
    let level = requested_level.map_or(Some(Level::WARN), parse_level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level.unwrap_or(Level::INFO))
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if level.is_none() {
        warn!(level = requested_level, "Unrecognized log level, using info");
    }
    match dotenv {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) => debug!(error = %e, "No environment file loaded"),
    }

    let provider = args
        .provider
        .or_else(|| cli_config.provider.clone())
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let settings = cli_config.strategy_settings();

    match args.command {
        Command::Generate { input, file, strategies, format } => {
            let problem = commands::read_problem(input.as_deref(), file.as_deref())?;
            let orchestrator = commands::build_orchestrator(&provider, settings)?;
            commands::generate::execute(orchestrator, &problem, &strategies, format).await
        }
        Command::Batch { input, file, output } => {
            let problem = commands::read_problem(input.as_deref(), file.as_deref())?;
            let output = output
                .or_else(|| cli_config.output.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BATCH_OUTPUT));
            let orchestrator = commands::build_orchestrator(&provider, settings)?;
            commands::batch::execute(orchestrator, &problem, &output).await
        }
        Command::Strategies { json } => commands::strategies::execute(json),
    }
}
