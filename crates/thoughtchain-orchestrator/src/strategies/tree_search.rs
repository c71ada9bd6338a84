//! Tree search: split the problem into subtasks, solve and grade each one.
//!
//! Only one level of decomposition happens. Below the root every branch is
//! `thought -> action -> reflection?`, and `max_depth` caps how far down that
//! chain the executor goes (1 = thoughts only, 2 = ungraded actions, 3 = the
//! full branch).

use super::{ReasoningStrategy, StrategyKind};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::evaluation::evaluate;
use crate::thought::{ThoughtKind, ThoughtNode};
use async_trait::async_trait;
use thoughtchain_models::{DEFAULT_TEMPERATURE, LlmClient};
use tracing::{debug, info};

/// Default depth budget below the root.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Actions scoring below this get a reflection.
pub const REFLECTION_THRESHOLD: f64 = 0.7;

const THOUGHT_DEPTH: usize = 1;
const ACTION_DEPTH: usize = 2;
const REFLECTION_DEPTH: usize = 3;

const DECOMPOSE_SYSTEM_PROMPT: &str = "You are an expert at breaking problems into smaller, \
independently solvable subtasks.";
const SOLVE_SYSTEM_PROMPT: &str = "You are a careful problem solver. Show your reasoning \
step by step before giving the answer.";
const REFLECT_SYSTEM_PROMPT: &str = "You are a mentor who turns review feedback into concrete \
improvements.";

/// The tree-search executor.
#[derive(Debug, Clone, Copy)]
pub struct TreeSearch {
    max_depth: usize,
    temperature: f32,
}

impl Default for TreeSearch {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeSearch {
    /// Creates an executor with the given depth budget.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth, temperature: DEFAULT_TEMPERATURE }
    }

    /// Overrides the generation temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Builds the reasoning tree for `problem`.
    ///
    /// # Errors
    /// Returns an error when a model call fails after retries.
    pub async fn run(&self, client: &LlmClient, problem: &str) -> Result<ThoughtNode> {
        let mut root = ThoughtNode::new(problem, ThoughtKind::Problem);
        if self.max_depth < THOUGHT_DEPTH {
            return Ok(root);
        }

        let subtasks = self.decompose(client, problem).await?;
        info!(subtasks = subtasks.len(), "Problem decomposed");

        for subtask in subtasks {
            if let Some(branch) = self.expand(client, subtask).await? {
                root.push_child(branch);
            }
        }

        Ok(root)
    }

    async fn decompose(&self, client: &LlmClient, problem: &str) -> Result<Vec<String>> {
        let prompt = format!(
            "Break the following problem into independently solvable subtasks.\n\
             Write exactly one subtask per line and nothing else.\n\nProblem:\n{problem}"
        );
        let completion = client.ask(DECOMPOSE_SYSTEM_PROMPT, &prompt, self.temperature).await?;
        Ok(split_subtasks(completion.text().unwrap_or_default()))
    }

    /// Builds one `thought` branch, or `None` when the solve call came back empty.
    async fn expand(&self, client: &LlmClient, subtask: String) -> Result<Option<ThoughtNode>> {
        let mut thought = ThoughtNode::new(subtask, ThoughtKind::Thought);
        if self.max_depth < ACTION_DEPTH {
            return Ok(Some(thought));
        }

        let prompt = format!("Solve this subtask, explaining your reasoning:\n{}", thought.content);
        let Some(solution) =
            client.ask(SOLVE_SYSTEM_PROMPT, &prompt, self.temperature).await?.into_text()
        else {
            debug!(subtask = %thought.content, "Empty solution, branch skipped");
            return Ok(None);
        };

        let mut action = ThoughtNode::new(solution, ThoughtKind::Action);
        if self.max_depth >= REFLECTION_DEPTH {
            let evaluation = evaluate(client, &thought.content, &action.content).await?;
            debug!(subtask = %thought.content, score = evaluation.score, "Action graded");
            action = action.with_assessment(evaluation.score, evaluation.feedback);

            if action.confidence < REFLECTION_THRESHOLD {
                if let Some(reflection) = self.reflect(client, &thought.content, &action).await? {
                    action.push_child(reflection);
                }
            }
        }

        thought.push_child(action);
        Ok(Some(thought))
    }

    async fn reflect(
        &self,
        client: &LlmClient,
        subtask: &str,
        action: &ThoughtNode,
    ) -> Result<Option<ThoughtNode>> {
        let feedback = action.feedback.as_deref().unwrap_or_default();
        let prompt = format!(
            "Subtask:\n{subtask}\n\nCurrent solution:\n{}\n\nReviewer feedback:\n{feedback}\n\n\
             Suggest a specific improvement to the solution.",
            action.content
        );
        let completion = client.ask(REFLECT_SYSTEM_PROMPT, &prompt, self.temperature).await?;
        Ok(completion.into_text().map(|text| ThoughtNode::new(text, ThoughtKind::Reflection)))
    }
}

#[async_trait]
impl ReasoningStrategy for TreeSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::TreeSearch
    }

    async fn execute(&self, client: &LlmClient, problem: &str) -> Result<Envelope> {
        Ok(Envelope::Tree(self.run(client, problem).await?))
    }
}

/// One subtask per non-empty line, trimmed.
fn split_subtasks(reply: &str) -> Vec<String> {
    reply.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect()
}
