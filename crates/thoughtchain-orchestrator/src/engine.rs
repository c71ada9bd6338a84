// Generation engine running the selected strategies against one problem
//
// Strategies run one after another in selection order. A strategy that fails
// is recorded and the remaining strategies still run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use thoughtchain_models::LlmClient;
use tracing::{error, info, warn};

use crate::envelope::Envelope;
use crate::error::{OrchestrationError, Result};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::strategies::{StrategyKind, StrategySettings};

/// Key holding per-strategy failures in the merged output.
pub const ERRORS_KEY: &str = "errors";

/// How one strategy ended.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyOutcome {
    /// The strategy produced its envelope.
    Completed(Envelope),
    /// A model call failed after retries.
    Failed {
        /// Error message
        error: String,
    },
}

/// One strategy's run.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyRun {
    /// Strategy that ran
    pub kind: StrategyKind,
    /// Result or failure
    pub outcome: StrategyOutcome,
    /// Wall time spent
    pub elapsed: Duration,
}

impl StrategyRun {
    /// The envelope, if the strategy completed.
    #[must_use]
    pub const fn envelope(&self) -> Option<&Envelope> {
        match &self.outcome {
            StrategyOutcome::Completed(envelope) => Some(envelope),
            StrategyOutcome::Failed { .. } => None,
        }
    }

    /// The error message, if the strategy failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            StrategyOutcome::Completed(_) => None,
            StrategyOutcome::Failed { error } => Some(error),
        }
    }
}

/// Everything produced for one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    /// The problem text
    pub input: String,
    /// One run per selected strategy, in selection order
    pub runs: Vec<StrategyRun>,
}

impl GenerationReport {
    /// Envelopes of the strategies that completed.
    pub fn envelopes(&self) -> impl Iterator<Item = &Envelope> {
        self.runs.iter().filter_map(StrategyRun::envelope)
    }

    /// Strategies that failed, with their messages.
    pub fn failures(&self) -> impl Iterator<Item = (StrategyKind, &str)> {
        self.runs.iter().filter_map(|run| run.error().map(|error| (run.kind, error)))
    }

    /// True when every selected strategy completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }

    /// The run for `kind`, if it was selected.
    #[must_use]
    pub fn get(&self, kind: StrategyKind) -> Option<&StrategyRun> {
        self.runs.iter().find(|run| run.kind == kind)
    }

    /// Merges all envelopes into one object keyed by envelope key.
    ///
    /// Failures are listed under `errors`, keyed by strategy, and the key is
    /// present only when something failed.
    ///
    /// # Errors
    /// Returns an error if an envelope cannot be serialized.
    pub fn merged_envelopes(&self) -> Result<Value> {
        let mut merged = Map::new();
        for envelope in self.envelopes() {
            if let Value::Object(object) = serde_json::to_value(envelope)? {
                merged.extend(object);
            }
        }

        let errors: Map<String, Value> = self
            .failures()
            .map(|(kind, error)| (kind.key().to_string(), Value::String(error.to_string())))
            .collect();
        if !errors.is_empty() {
            merged.insert(ERRORS_KEY.to_string(), Value::Object(errors));
        }

        Ok(Value::Object(merged))
    }
}

/// Runs strategies against problems with a shared client.
pub struct Orchestrator {
    client: LlmClient,
    settings: StrategySettings,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("client", &self.client)
            .field("settings", &self.settings)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl Orchestrator {
    /// Creates an orchestrator.
    ///
    /// # Errors
    /// Returns [`OrchestrationError::InvalidSetting`] if the settings are unusable.
    pub fn new(client: LlmClient, settings: StrategySettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { client, settings, progress: None })
    }

    /// Sends progress events to `sink`.
    #[must_use]
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// The settings strategies are built with.
    #[must_use]
    pub const fn settings(&self) -> &StrategySettings {
        &self.settings
    }

    /// The shared client.
    #[must_use]
    pub const fn client(&self) -> &LlmClient {
        &self.client
    }

    fn emit(&self, event: &ProgressEvent) {
        if let Some(sink) = &self.progress {
            sink.on_event(event);
        }
    }

    /// Runs one strategy and returns its envelope.
    ///
    /// # Errors
    /// Returns an error when a model call fails after retries.
    pub async fn run_strategy(&self, kind: StrategyKind, problem: &str) -> Result<Envelope> {
        self.settings.build(kind).execute(&self.client, problem).await
    }

    /// Runs every strategy in presentation order.
    ///
    /// # Errors
    /// See [`Orchestrator::run`].
    pub async fn run_all(&self, problem: &str) -> Result<GenerationReport> {
        self.run(problem, &StrategyKind::ALL).await
    }

    /// Runs the selected strategies in order.
    ///
    /// Repeated selections run once, at their first position. A strategy
    /// whose model calls fail is recorded as failed and the rest still run.
    ///
    /// # Errors
    /// Returns [`OrchestrationError::NoStrategies`] for an empty selection.
    pub async fn run(&self, problem: &str, selection: &[StrategyKind]) -> Result<GenerationReport> {
        let mut kinds: Vec<StrategyKind> = Vec::with_capacity(selection.len());
        for kind in selection {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        if kinds.is_empty() {
            return Err(OrchestrationError::NoStrategies);
        }
        if kinds.len() < selection.len() {
            warn!(selected = selection.len(), running = kinds.len(), "Duplicate strategies ignored");
        }

        let total = kinds.len();
        let mut runs = Vec::with_capacity(total);
        info!(model = self.client.model_id(), strategies = total, "Generating thought chains");

        for (position, kind) in kinds.into_iter().enumerate() {
            let index = position + 1;
            self.emit(&ProgressEvent::StrategyStarted { kind, index, total });

            let started = Instant::now();
            let result = self.run_strategy(kind, problem).await;
            let elapsed = started.elapsed();

            let outcome = match result {
                Ok(envelope) => {
                    info!(strategy = kind.key(), elapsed_ms = elapsed.as_millis(), "Strategy completed");
                    self.emit(&ProgressEvent::StrategyCompleted { kind, index, total, elapsed });
                    StrategyOutcome::Completed(envelope)
                }
                Err(err) => {
                    let error = err.to_string();
                    error!(strategy = kind.key(), error = %error, "Strategy failed");
                    self.emit(&ProgressEvent::StrategyFailed {
                        kind,
                        index,
                        total,
                        error: error.clone(),
                    });
                    StrategyOutcome::Failed { error }
                }
            };
            runs.push(StrategyRun { kind, outcome, elapsed });
        }

        Ok(GenerationReport { input: problem.to_string(), runs })
    }
}
