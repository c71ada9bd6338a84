//! Model factory for creating model instances from configuration.
//!
//! This module maps a provider name to a concrete `Model`, handling API key
//! loading from environment variables.

use crate::{DeepSeekModel, MockModel};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thoughtchain_abstraction::{Model, ModelError};
use tracing::{debug, error};

/// Model type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Deterministic offline model.
    Mock,
    /// DeepSeek chat completions API.
    DeepSeek,
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "deepseek" | "deepseek-chat" => Ok(Self::DeepSeek),
            _ => {
                error!(model_type = %s, "Unrecognized model type");
                Err(ModelError::UnsupportedModelProvider(format!("Unrecognized model type: {s}")))
            }
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mock => f.write_str("mock"),
            Self::DeepSeek => f.write_str("deepseek"),
        }
    }
}

/// Model configuration.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// The type of model to create.
    pub model_type: ModelType,
    /// Optional API key (if not provided, will be loaded from environment).
    pub api_key: Option<String>,
    /// Optional endpoint override for the DeepSeek provider.
    pub endpoint: Option<String>,
}

impl ModelConfig {
    /// Creates a new `ModelConfig` for the given type.
    #[must_use]
    pub const fn new(model_type: ModelType) -> Self {
        Self { model_type, api_key: None, endpoint: None }
    }

    /// Sets the API key for this configuration.
    #[must_use]
    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the endpoint URL for this configuration.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

/// Factory for creating model instances.
pub struct ModelFactory;

impl ModelFactory {
    /// Creates a model instance from the given configuration.
    ///
    /// # Errors
    /// Currently infallible for known types; the signature leaves room for
    /// providers whose construction can fail.
    pub fn create(config: ModelConfig) -> Result<Arc<dyn Model>, ModelError> {
        debug!(model_type = %config.model_type, "Creating model instance");

        match config.model_type {
            ModelType::Mock => Ok(Arc::new(MockModel::new("mock".to_string()))),
            ModelType::DeepSeek => {
                let mut model = match config.api_key {
                    Some(api_key) => DeepSeekModel::with_api_key(api_key),
                    None => DeepSeekModel::from_env(),
                };
                if let Some(endpoint) = config.endpoint {
                    model = model.with_endpoint(endpoint);
                }
                Ok(Arc::new(model))
            }
        }
    }

    /// Creates a model instance from a provider name.
    ///
    /// # Errors
    /// Returns a `ModelError` if the provider name is unrecognized.
    pub fn create_from_str(model_type_str: &str) -> Result<Arc<dyn Model>, ModelError> {
        let model_type = ModelType::from_str(model_type_str)?;
        Self::create(ModelConfig::new(model_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_from_str() {
        assert_eq!(ModelType::from_str("mock"), Ok(ModelType::Mock));
        assert_eq!(ModelType::from_str("MOCK"), Ok(ModelType::Mock));
        assert_eq!(ModelType::from_str("deepseek"), Ok(ModelType::DeepSeek));
        assert_eq!(ModelType::from_str("DeepSeek"), Ok(ModelType::DeepSeek));
        assert_eq!(ModelType::from_str("deepseek-chat"), Ok(ModelType::DeepSeek));
        assert!(matches!(
            ModelType::from_str("unknown"),
            Err(ModelError::UnsupportedModelProvider(_))
        ));
    }

    #[test]
    fn test_model_type_display_round_trips() {
        for model_type in [ModelType::Mock, ModelType::DeepSeek] {
            assert_eq!(ModelType::from_str(&model_type.to_string()), Ok(model_type));
        }
    }

    #[test]
    fn test_factory_create_mock() {
        let model = ModelFactory::create(ModelConfig::new(ModelType::Mock)).unwrap();
        assert_eq!(model.model_id(), "mock");
    }

    #[test]
    fn test_factory_create_deepseek_with_api_key() {
        let config = ModelConfig::new(ModelType::DeepSeek)
            .with_api_key("test-key".to_string())
            .with_endpoint("http://localhost:9/chat/completions".to_string());
        let model = ModelFactory::create(config).unwrap();
        assert_eq!(model.model_id(), "deepseek-chat");
    }

    #[test]
    fn test_factory_create_invalid_type() {
        assert!(ModelFactory::create_from_str("invalid").is_err());
    }
}
