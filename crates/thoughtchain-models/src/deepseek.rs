//! DeepSeek model implementation.
//!
//! This module provides an implementation of the `Model` trait for the DeepSeek
//! chat completions API. The model name is fixed. The bearer credential comes
//! from the environment, which may also point the model at another endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thoughtchain_abstraction::{
    ChatMessage, Completion, Model, ModelError, ModelParameters, ModelResponse, ModelUsage,
};
use tracing::{debug, error, warn};

/// Chat completions endpoint.
pub const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/chat/completions";

/// Model requested from the endpoint.
pub const DEEPSEEK_MODEL: &str = "deepseek-chat";

/// Environment variable holding the bearer credential.
pub const DEEPSEEK_API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Environment variable overriding [`DEEPSEEK_API_URL`].
pub const DEEPSEEK_ENDPOINT_ENV: &str = "DEEPSEEK_API_URL";

/// DeepSeek model implementation.
#[derive(Debug, Clone)]
pub struct DeepSeekModel {
    /// The model ID sent with each request.
    model_id: String,
    /// The API key for authentication.
    api_key: String,
    /// Full URL of the chat completions endpoint.
    endpoint: String,
    /// HTTP client for making requests.
    client: Client,
}

impl DeepSeekModel {
    /// Creates a `DeepSeekModel` whose credential is read from `DEEPSEEK_API_KEY`.
    ///
    /// A missing variable is not an error here: the request goes out with an
    /// empty token and the endpoint rejects it on the first call. A non-empty
    /// `DEEPSEEK_API_URL` replaces the default endpoint.
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = env::var(DEEPSEEK_API_KEY_ENV).unwrap_or_else(|_| {
            warn!(variable = DEEPSEEK_API_KEY_ENV, "API key not set; requests will be rejected");
            String::new()
        });
        let model = Self::with_api_key(api_key);
        match env::var(DEEPSEEK_ENDPOINT_ENV) {
            Ok(endpoint) if !endpoint.trim().is_empty() => {
                debug!(endpoint = %endpoint, "Using endpoint from environment");
                model.with_endpoint(endpoint)
            }
            _ => model,
        }
    }

    /// Creates a `DeepSeekModel` with an explicit API key.
    ///
    /// # Arguments
    /// * `api_key` - The API key for authentication
    #[must_use]
    pub fn with_api_key(api_key: String) -> Self {
        Self {
            model_id: DEEPSEEK_MODEL.to_string(),
            api_key,
            endpoint: DEEPSEEK_API_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Points the model at a different chat completions URL.
    ///
    /// Used against local stand-ins of the API.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }

    /// The URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Pulls the first choice's content out of a response body.
    ///
    /// Anything that does not have the expected shape is `Completion::Empty`.
    fn parse_body(body: &str) -> (Completion, Option<ModelUsage>) {
        let parsed: DeepSeekResponse = match serde_json::from_str(body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "DeepSeek response body is not the expected JSON");
                return (Completion::Empty, None);
            }
        };

        let usage = parsed.usage.map(|u| ModelUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        let text = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .and_then(|message| message.content);

        let completion = Completion::from_text(text);
        if completion.is_empty() {
            warn!("DeepSeek response carried no usable choices");
        }
        (completion, usage)
    }
}

#[async_trait]
impl Model for DeepSeekModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        debug!(
            model_id = %self.model_id,
            message_count = messages.len(),
            parameters = ?parameters,
            "DeepSeekModel generating chat completion"
        );

        let request_body = DeepSeekRequest {
            model: &self.model_id,
            messages,
            temperature: parameters.and_then(|p| p.temperature),
            stream: false,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send request to DeepSeek API");
                ModelError::Transport(format!("Network error: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                status = %status,
                error = %error_text,
                "DeepSeek API returned error status"
            );
            return Err(ModelError::Status { status: status.as_u16(), body: error_text });
        }

        let body = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read DeepSeek API response body");
            ModelError::Transport(format!("Failed to read response: {e}"))
        })?;

        let (completion, usage) = Self::parse_body(&body);

        Ok(ModelResponse { completion, model_id: Some(self.model_id.clone()), usage })
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// DeepSeek API request/response structures

#[derive(Debug, Serialize)]
struct DeepSeekRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    #[serde(default)]
    choices: Option<Vec<DeepSeekChoice>>,
    #[serde(default)]
    usage: Option<DeepSeekUsage>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    #[serde(default)]
    message: Option<DeepSeekMessage>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(clippy::struct_field_names)] // Matches API naming
struct DeepSeekUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}
