//! Human-thought annotation: four chained calls that mimic how an expert works a problem.

use super::{ReasoningStrategy, StrategyKind};
use crate::envelope::Envelope;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thoughtchain_models::{DEFAULT_TEMPERATURE, LlmClient};
use tracing::{debug, info};

const EXPERT_SYSTEM_PROMPT: &str = "You are an experienced engineer thinking out loud. \
Document your reasoning the way a human expert would.";

/// The four stages of an annotated solution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// First read of the problem.
    pub analysis: String,
    /// Candidate solutions and their tradeoffs.
    pub exploration: String,
    /// Refinement of the exploration; empty when exploration was.
    pub improvement: String,
    /// Key decisions and final answer.
    pub conclusion: String,
}

/// The human-annotation executor.
#[derive(Debug, Clone, Copy)]
pub struct HumanAnnotation {
    temperature: f32,
}

impl Default for HumanAnnotation {
    fn default() -> Self {
        Self::new()
    }
}

impl HumanAnnotation {
    /// Creates the executor.
    #[must_use]
    pub const fn new() -> Self {
        Self { temperature: DEFAULT_TEMPERATURE }
    }

    /// Overrides the generation temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Runs analysis, exploration, improvement and conclusion in that order.
    ///
    /// # Errors
    /// Returns an error when a model call fails after retries.
    pub async fn run(&self, client: &LlmClient, problem: &str) -> Result<Annotation> {
        let analysis = self
            .step(
                client,
                format!(
                    "Analyze this problem the way an expert would: what is being asked, \
                     what constraints matter, and what is tricky.\n\nProblem:\n{problem}"
                ),
            )
            .await?;

        let exploration = self
            .step(
                client,
                format!(
                    "Problem:\n{problem}\n\nAnalysis:\n{analysis}\n\n\
                     Explore several candidate solutions and compare their tradeoffs."
                ),
            )
            .await?;

        let improvement = if exploration.is_empty() {
            debug!("Exploration empty, improvement skipped");
            String::new()
        } else {
            self.step(
                client,
                format!(
                    "Problem:\n{problem}\n\nCandidate solutions:\n{exploration}\n\n\
                     Improve and optimize the most promising candidate."
                ),
            )
            .await?
        };

        let conclusion = self
            .step(
                client,
                format!(
                    "Problem:\n{problem}\n\nAnalysis:\n{analysis}\n\nExploration:\n{exploration}\n\n\
                     Improvement:\n{improvement}\n\n\
                     Summarize the key decisions made along the way and state the final conclusion."
                ),
            )
            .await?;

        info!("Annotation finished");
        Ok(Annotation { analysis, exploration, improvement, conclusion })
    }

    async fn step(&self, client: &LlmClient, prompt: String) -> Result<String> {
        Ok(client.ask(EXPERT_SYSTEM_PROMPT, &prompt, self.temperature).await?.into_text_or_default())
    }
}

#[async_trait]
impl ReasoningStrategy for HumanAnnotation {
    fn kind(&self) -> StrategyKind {
        StrategyKind::HumanAnnotation
    }

    async fn execute(&self, client: &LlmClient, problem: &str) -> Result<Envelope> {
        Ok(Envelope::Annotation(self.run(client, problem).await?))
    }
}
