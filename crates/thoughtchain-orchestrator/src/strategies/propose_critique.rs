//! Propose-critique loop: propose, grade, and try again with the last attempt in view.

use super::{ReasoningStrategy, StrategyKind};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::evaluation::{Evaluation, evaluate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thoughtchain_models::{DEFAULT_TEMPERATURE, LlmClient};
use tracing::{debug, info};

/// Default number of rounds.
pub const DEFAULT_MAX_ITERATIONS: usize = 3;

/// A round scoring at least this ends the loop.
pub const ACCEPT_THRESHOLD: f64 = 0.8;

/// Stands in for the previous solution on the first round.
const NO_PREVIOUS_SOLUTION: &str = "none";

const PROPOSER_SYSTEM_PROMPT: &str = "You propose complete solutions and refine them \
when given your previous attempt.";

/// One round of the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based round number.
    pub iteration: usize,
    /// The proposed solution.
    pub proposal: String,
    /// The grade it received.
    pub evaluation: Evaluation,
}

/// The propose-critique executor.
#[derive(Debug, Clone, Copy)]
pub struct ProposeCritique {
    max_iterations: usize,
    temperature: f32,
}

impl Default for ProposeCritique {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS)
    }
}

impl ProposeCritique {
    /// Creates an executor that runs at most `max_iterations` rounds.
    #[must_use]
    pub const fn new(max_iterations: usize) -> Self {
        Self { max_iterations, temperature: DEFAULT_TEMPERATURE }
    }

    /// Overrides the generation temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Runs the loop and returns every round, accepted or not.
    ///
    /// # Errors
    /// Returns an error when a model call fails after retries.
    pub async fn run(&self, client: &LlmClient, problem: &str) -> Result<Vec<IterationRecord>> {
        let mut records = Vec::with_capacity(self.max_iterations);
        let mut previous: Option<String> = None;

        for iteration in 1..=self.max_iterations {
            let prompt = format!(
                "Problem:\n{problem}\n\nPrevious solution:\n{}\n\n\
                 Propose a complete solution. If a previous solution is shown, improve on it.",
                previous.as_deref().unwrap_or(NO_PREVIOUS_SOLUTION)
            );
            let proposal = client.ask(PROPOSER_SYSTEM_PROMPT, &prompt, self.temperature).await?;

            let (proposal, evaluation) = match proposal.into_text() {
                Some(text) => {
                    let evaluation = evaluate(client, problem, &text).await?;
                    previous = Some(text.clone());
                    (text, evaluation)
                }
                None => {
                    debug!(iteration, "Empty proposal, recorded without grading");
                    (String::new(), Evaluation::unscored())
                }
            };

            let accepted = evaluation.score >= ACCEPT_THRESHOLD;
            info!(iteration, score = evaluation.score, accepted, "Proposal graded");
            records.push(IterationRecord { iteration, proposal, evaluation });

            if accepted {
                break;
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl ReasoningStrategy for ProposeCritique {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ProposeCritique
    }

    async fn execute(&self, client: &LlmClient, problem: &str) -> Result<Envelope> {
        Ok(Envelope::Iterations(self.run(client, problem).await?))
    }
}
