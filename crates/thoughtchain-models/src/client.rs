//! The retrying chat client every strategy talks through.

use std::fmt;
use std::sync::Arc;
use thoughtchain_abstraction::{
    ChatMessage, Completion, Model, ModelError, ModelParameters, ModelResponse,
};
use tracing::{debug, warn};

/// Sampling temperature used when a caller has no reason to pick another.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Total attempts per call, the first one included.
pub const MAX_ATTEMPTS: u32 = 3;

/// Sends one conversation per call and retries transport failures.
///
/// Retries are immediate: no backoff, no timeout, no caching of identical
/// requests. When every attempt fails, the last error is returned unchanged.
#[derive(Clone)]
pub struct LlmClient {
    model: Arc<dyn Model>,
    max_attempts: u32,
}

impl fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmClient")
            .field("model_id", &self.model.model_id())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl LlmClient {
    /// Wraps a model with the default attempt budget.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model, max_attempts: MAX_ATTEMPTS }
    }

    /// Overrides the attempt budget. Values below one are treated as one.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// ID of the underlying model.
    pub fn model_id(&self) -> &str {
        self.model.model_id()
    }

    /// Sends `messages` at `temperature` and returns the parsed response.
    ///
    /// # Errors
    /// Returns the final attempt's `ModelError` once the attempt budget is
    /// spent on transport failures, or any non-transport error immediately.
    pub async fn call(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<ModelResponse, ModelError> {
        let parameters = ModelParameters::with_temperature(temperature);
        let mut attempt = 1;
        loop {
            match self.model.generate_chat_completion(messages, Some(parameters)).await {
                Ok(response) => {
                    debug!(
                        model_id = %self.model.model_id(),
                        attempt,
                        empty = response.completion.is_empty(),
                        usage = ?response.usage,
                        "LLM call completed"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_transport() && attempt < self.max_attempts => {
                    warn!(
                        model_id = %self.model.model_id(),
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "LLM call failed, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a system prompt plus one user turn and returns only the completion.
    ///
    /// # Errors
    /// Same as [`LlmClient::call`].
    pub async fn ask(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<Completion, ModelError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(user)];
        Ok(self.call(&messages, temperature).await?.completion)
    }
}
