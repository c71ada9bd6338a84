// Error types for orchestration

use thiserror::Error;

/// Result type for orchestration operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Orchestration errors
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Model error that survived the client's retries
    #[error("Model error: {0}")]
    Model(#[from] thoughtchain_abstraction::ModelError),

    /// Strategy name that matches none of the four strategies
    #[error("Unknown strategy '{0}' (expected tree-search, propose-critique, multi-agent or human-annotation)")]
    UnknownStrategy(String),

    /// Strategy parameter outside its accepted range
    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting {
        /// Setting name
        name: &'static str,
        /// Why the value was rejected
        reason: String,
    },

    /// Nothing to run
    #[error("No strategies selected")]
    NoStrategies,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
