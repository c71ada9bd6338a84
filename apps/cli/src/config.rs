//! CLI configuration file support.
//!
//! Configuration precedence:
//! 1. CLI arguments (handled by clap)
//! 2. Local config file (./.thoughtchainrc)
//! 3. Global config file (~/.thoughtchain/config.toml)
//! 4. Defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use thoughtchain_orchestrator::StrategySettings;

/// CLI configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    /// Model provider (deepseek, mock)
    #[serde(default)]
    pub provider: Option<String>,

    /// Log level
    #[serde(default)]
    pub log_level: Option<String>,

    /// Batch output path
    #[serde(default)]
    pub output: Option<String>,

    /// Strategy tunables
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// `[generation]` table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Tree-search depth budget
    #[serde(default)]
    pub max_depth: Option<usize>,

    /// Propose-critique round limit
    #[serde(default)]
    pub max_iterations: Option<usize>,

    /// Number of debating agents
    #[serde(default)]
    pub num_agents: Option<usize>,

    /// Generation temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum CliConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),
}

/// Result type for configuration operations.
pub type CliConfigResult<T> = std::result::Result<T, CliConfigError>;

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> CliConfigResult<Self> {
        if !path.exists() {
            return Err(CliConfigError::NotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| CliConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        toml::from_str(&content)
            .map_err(|e| CliConfigError::ParseError(format!("{}: {}", path.display(), e)))
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".thoughtchain")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".thoughtchainrc")
    }

    /// Discover and load configuration files.
    ///
    /// Missing files are skipped. A file that exists but cannot be read or
    /// parsed is an error.
    pub fn discover_and_load() -> CliConfigResult<Self> {
        Self::load_layers(&[Self::default_global_path(), Self::default_local_path()])
    }

    /// Loads `paths` in order, later files overriding earlier ones.
    pub fn load_layers(paths: &[PathBuf]) -> CliConfigResult<Self> {
        let mut config = Self::default();
        for path in paths {
            match Self::load_from_file(path) {
                Ok(layer) => config.merge(&layer),
                Err(CliConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(config)
    }

    /// Merge another configuration into this one.
    ///
    /// Values from `other` override values in `self` if they are Some.
    pub fn merge(&mut self, other: &Self) {
        if let Some(ref provider) = other.provider {
            self.provider = Some(provider.clone());
        }
        if let Some(ref log_level) = other.log_level {
            self.log_level = Some(log_level.clone());
        }
        if let Some(ref output) = other.output {
            self.output = Some(output.clone());
        }

        let generation = other.generation;
        if generation.max_depth.is_some() {
            self.generation.max_depth = generation.max_depth;
        }
        if generation.max_iterations.is_some() {
            self.generation.max_iterations = generation.max_iterations;
        }
        if generation.num_agents.is_some() {
            self.generation.num_agents = generation.num_agents;
        }
        if generation.temperature.is_some() {
            self.generation.temperature = generation.temperature;
        }
    }

    /// Strategy settings with configured values over the defaults.
    pub fn strategy_settings(&self) -> StrategySettings {
        let defaults = StrategySettings::default();
        let generation = self.generation;
        StrategySettings {
            max_depth: generation.max_depth.unwrap_or(defaults.max_depth),
            max_iterations: generation.max_iterations.unwrap_or(defaults.max_iterations),
            num_agents: generation.num_agents.unwrap_or(defaults.num_agents),
            temperature: generation.temperature.unwrap_or(defaults.temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
provider = "mock"
log_level = "debug"

[generation]
num_agents = 5
temperature = 0.2
"#,
        )
        .unwrap();

        let config = CliConfig::load_from_file(&path).unwrap();

        assert_eq!(config.provider.as_deref(), Some("mock"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.generation.num_agents, Some(5));
        assert_eq!(config.generation.max_depth, None);
    }

    #[test]
    fn test_load_missing_file() {
        let result = CliConfig::load_from_file(Path::new("/nonexistent/.thoughtchainrc"));
        assert!(matches!(result, Err(CliConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "engine = \"gemini\"\n").unwrap();

        let result = CliConfig::load_from_file(&path);
        assert!(matches!(result, Err(CliConfigError::ParseError(_))));
    }

    #[test]
    fn test_merge_local_wins() {
        let mut config = CliConfig {
            provider: Some("deepseek".to_string()),
            output: Some("global.json".to_string()),
            generation: GenerationConfig { max_depth: Some(2), num_agents: Some(4), ..Default::default() },
            ..Default::default()
        };
        let local = CliConfig {
            provider: Some("mock".to_string()),
            generation: GenerationConfig { max_depth: Some(1), ..Default::default() },
            ..Default::default()
        };

        config.merge(&local);

        assert_eq!(config.provider.as_deref(), Some("mock"));
        assert_eq!(config.output.as_deref(), Some("global.json"));
        assert_eq!(config.generation.max_depth, Some(1));
        assert_eq!(config.generation.num_agents, Some(4));
    }

    #[test]
    fn test_load_layers_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("config.toml");
        let local = temp_dir.path().join(".thoughtchainrc");
        fs::write(&global, "provider = \"deepseek\"\noutput = \"a.json\"\n").unwrap();
        fs::write(&local, "provider = \"mock\"\n").unwrap();

        let config =
            CliConfig::load_layers(&[global, temp_dir.path().join("missing.toml"), local]).unwrap();

        assert_eq!(config.provider.as_deref(), Some("mock"));
        assert_eq!(config.output.as_deref(), Some("a.json"));
    }

    #[test]
    fn test_strategy_settings_fill_defaults() {
        let config = CliConfig {
            generation: GenerationConfig { max_iterations: Some(5), ..Default::default() },
            ..Default::default()
        };

        let settings = config.strategy_settings();

        assert_eq!(settings.max_iterations, 5);
        assert_eq!(settings.max_depth, StrategySettings::default().max_depth);
        assert_eq!(settings.num_agents, 3);
    }
}
