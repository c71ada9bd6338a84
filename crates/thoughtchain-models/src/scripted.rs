//! A model that replays queued replies, for driving strategies in tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use thoughtchain_abstraction::{
    ChatMessage, Completion, Model, ModelError, ModelParameters, ModelResponse,
};
use tracing::debug;

/// One request as the scripted model saw it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Messages sent with the request.
    pub messages: Vec<ChatMessage>,
    /// Temperature, if the caller set one.
    pub temperature: Option<f32>,
}

impl RecordedRequest {
    /// Content of the last user message, or an empty string.
    pub fn user_prompt(&self) -> &str {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == thoughtchain_abstraction::Role::User)
            .map_or("", |m| m.content.as_str())
    }
}

/// Replays queued outcomes in order, then falls back to a fixed reply.
///
/// Every request is recorded so tests can check what was sent and how often.
#[derive(Debug)]
pub struct ScriptedModel {
    id: String,
    script: Mutex<VecDeque<Result<Completion, ModelError>>>,
    fallback: Completion,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedModel {
    /// Creates an empty script whose fallback is `Completion::Empty`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(VecDeque::new()),
            fallback: Completion::Empty,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a text reply.
    #[must_use]
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(Completion::Content(text.into())))
    }

    /// Queues several text replies.
    #[must_use]
    pub fn with_replies<I, S>(self, texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts.into_iter().fold(self, |model, text| model.with_reply(text))
    }

    /// Queues a response that carries no usable content.
    #[must_use]
    pub fn with_empty(self) -> Self {
        self.push(Ok(Completion::Empty))
    }

    /// Queues a failure.
    #[must_use]
    pub fn with_error(self, error: ModelError) -> Self {
        self.push(Err(error))
    }

    /// Sets what is returned once the queue runs dry.
    #[must_use]
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Completion::Content(text.into());
        self
    }

    /// Number of requests received so far.
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Snapshot of every request received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(self, outcome: Result<Completion, ModelError>) -> Self {
        self.script.lock().unwrap_or_else(PoisonError::into_inner).push_back(outcome);
        self
    }
}

#[async_trait]
impl Model for ScriptedModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedRequest {
            messages: messages.to_vec(),
            temperature: parameters.and_then(|p| p.temperature),
        });

        let next = self.script.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        debug!(model_id = %self.id, scripted = next.is_some(), "ScriptedModel answering");

        let completion = next.unwrap_or_else(|| Ok(self.fallback.clone()))?;
        Ok(ModelResponse::new(completion, Some(self.id.clone())))
    }

    fn model_id(&self) -> &str {
        &self.id
    }
}
