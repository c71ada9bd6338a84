//! Model abstraction layer for Thoughtchain.
//!
//! This module defines the core traits and types for talking to a chat model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Represents an error that can occur when interacting with an AI model.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelError {
    /// The request never produced an HTTP response (connection, DNS, TLS, body read).
    #[error("Transport Error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success HTTP status.
    #[error("HTTP {status} from model endpoint: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as far as it could be read.
        body: String,
    },

    /// The model provider is not supported or could not be configured.
    #[error("Unsupported Model Provider: {0}")]
    UnsupportedModelProvider(String),

    /// Other unexpected errors.
    #[error("Other Model Error: {0}")]
    Other(String),
}

impl ModelError {
    /// Returns true for failures of the HTTP round trip itself.
    ///
    /// These are the only errors worth repeating a request for.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { .. })
    }
}

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions framing the conversation.
    System,
    /// Input from the caller.
    User,
    /// A previous model reply.
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a message in a conversation with a chat model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: Role,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Parameters for controlling the model's generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    /// What sampling temperature to use, between 0 and 2.
    /// Higher values mean the model will take more risks.
    pub temperature: Option<f32>,
}

impl ModelParameters {
    /// Parameters with only a temperature set.
    #[must_use]
    pub const fn with_temperature(temperature: f32) -> Self {
        Self { temperature: Some(temperature) }
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self { temperature: Some(0.7) }
    }
}

/// What a successful HTTP exchange actually yielded.
///
/// A response body without a usable `choices[0].message.content` is not an
/// error: it is `Empty`, and every caller decides what that means for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Completion {
    /// The model produced text.
    Content(String),
    /// The response carried nothing usable.
    Empty,
}

impl Completion {
    /// Builds a completion from optional text, treating blank text as empty.
    #[must_use]
    pub fn from_text(text: Option<String>) -> Self {
        match text {
            Some(text) if !text.trim().is_empty() => Self::Content(text),
            _ => Self::Empty,
        }
    }

    /// Borrow the text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Content(text) => Some(text),
            Self::Empty => None,
        }
    }

    /// Take the text, if any.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Content(text) => Some(text),
            Self::Empty => None,
        }
    }

    /// The text, or an empty string.
    #[must_use]
    pub fn into_text_or_default(self) -> String {
        self.into_text().unwrap_or_default()
    }

    /// Returns true when nothing usable came back.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The response from a chat completion model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The generated content.
    pub completion: Completion,

    /// Optional: The ID of the model used to generate the response.
    pub model_id: Option<String>,

    /// Optional: Usage statistics for the request.
    pub usage: Option<ModelUsage>,
}

impl ModelResponse {
    /// A response with no usage information.
    #[must_use]
    pub const fn new(completion: Completion, model_id: Option<String>) -> Self {
        Self { completion, model_id, usage: None }
    }
}

/// Usage statistics for a model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,

    /// Number of tokens in the completion.
    pub completion_tokens: u32,

    /// Total number of tokens used.
    pub total_tokens: u32,
}

/// A trait for interacting with chat models.
///
/// All models must be `Send + Sync` so one instance can back every strategy.
#[async_trait]
pub trait Model: Send + Sync {
    /// Generates a chat completion based on the given conversation.
    ///
    /// # Arguments
    /// * `messages` - The conversation as a slice of chat messages
    /// * `parameters` - Optional parameters to control generation
    ///
    /// # Errors
    /// Returns a `ModelError` if the HTTP round trip fails. A response that
    /// arrives but carries no content is `Ok` with `Completion::Empty`.
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError>;

    /// Returns the ID of the model.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let message = ChatMessage::system("be brief");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(json["content"], "be brief");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_completion_from_text() {
        assert_eq!(Completion::from_text(Some("hi".to_string())), Completion::Content("hi".to_string()));
        assert_eq!(Completion::from_text(Some("  \n".to_string())), Completion::Empty);
        assert_eq!(Completion::from_text(None), Completion::Empty);
        assert_eq!(Completion::Empty.into_text_or_default(), "");
    }

    #[test]
    fn test_transport_classification() {
        assert!(ModelError::Transport("reset".to_string()).is_transport());
        assert!(ModelError::Status { status: 401, body: String::new() }.is_transport());
        assert!(!ModelError::UnsupportedModelProvider("x".to_string()).is_transport());
    }

    #[test]
    fn test_default_temperature() {
        assert_eq!(ModelParameters::default().temperature, Some(0.7));
    }
}
