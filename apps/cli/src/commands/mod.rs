//! Command implementations for the Thoughtchain CLI.

pub mod batch;
pub mod generate;
pub mod strategies;

use anyhow::{Context, Result, bail};
use std::path::Path;
use thoughtchain_models::{LlmClient, ModelFactory};
use thoughtchain_orchestrator::{Orchestrator, StrategySettings};
use tracing::debug;

/// Reads the problem from `file` if given, else from the positional argument.
pub fn read_problem(input: Option<&str>, file: Option<&Path>) -> Result<String> {
    let problem = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?,
        None => input.unwrap_or_default().to_string(),
    };

    if problem.trim().is_empty() {
        bail!("Input is empty: pass a problem or --file with a non-empty file");
    }
    Ok(problem)
}

/// Creates the orchestrator for `provider` with the given settings.
pub fn build_orchestrator(provider: &str, settings: StrategySettings) -> Result<Orchestrator> {
    let model = ModelFactory::create_from_str(provider)
        .with_context(|| format!("Failed to create model for provider '{provider}'"))?;
    debug!(provider, model_id = model.model_id(), "Model ready");

    Orchestrator::new(LlmClient::new(model), settings).context("Invalid generation settings")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_problem_prefers_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("problem.txt");
        std::fs::write(&path, "def fibonacci(n): ...").unwrap();

        let problem = read_problem(Some("ignored"), Some(&path)).unwrap();

        assert_eq!(problem, "def fibonacci(n): ...");
    }

    #[test]
    fn test_read_problem_rejects_blank_input() {
        assert!(read_problem(Some("  \n"), None).is_err());
        assert!(read_problem(None, None).is_err());
    }

    #[test]
    fn test_read_problem_missing_file() {
        let err = read_problem(None, Some(Path::new("/nonexistent/problem.txt"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read input file"));
    }

    #[test]
    fn test_build_orchestrator_rejects_unknown_provider() {
        let err = build_orchestrator("gpt-9", StrategySettings::default()).unwrap_err();
        assert!(err.to_string().contains("gpt-9"));
    }
}
