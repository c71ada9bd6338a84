//! Multi-agent debate: independent analyses, two debate rounds, one moderated conclusion.
//!
//! Entries are appended the moment they are produced, so an agent speaking
//! late in a round already sees what earlier agents said in that round.

use super::{ReasoningStrategy, StrategyKind};
use crate::envelope::Envelope;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thoughtchain_models::{DEFAULT_TEMPERATURE, LlmClient};
use tracing::{debug, info};

/// Default number of agents.
pub const DEFAULT_NUM_AGENTS: usize = 3;

/// Number of debate rounds between analysis and conclusion.
pub const DEBATE_ROUNDS: usize = 2;

/// Speaker of the closing synthesis.
pub const MODERATOR: &str = "Moderator";

/// Which phase produced a debate entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateEntryKind {
    /// Initial independent analysis.
    Analysis,
    /// A turn in one of the debate rounds.
    Debate,
    /// The moderator's synthesis.
    Conclusion,
}

/// One contribution to the debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateEntry {
    /// Speaker, `Agent_<n>` or `Moderator`.
    pub agent: String,
    /// What was said.
    pub content: String,
    /// Phase the entry belongs to.
    #[serde(rename = "type")]
    pub kind: DebateEntryKind,
}

/// The multi-agent debate executor.
#[derive(Debug, Clone, Copy)]
pub struct MultiAgentDebate {
    num_agents: usize,
    temperature: f32,
}

impl Default for MultiAgentDebate {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_AGENTS)
    }
}

impl MultiAgentDebate {
    /// Creates a debate between `num_agents` agents.
    #[must_use]
    pub const fn new(num_agents: usize) -> Self {
        Self { num_agents, temperature: DEFAULT_TEMPERATURE }
    }

    /// Overrides the generation temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Runs the debate and returns the full history in order.
    ///
    /// # Errors
    /// Returns an error when a model call fails after retries.
    pub async fn run(&self, client: &LlmClient, problem: &str) -> Result<Vec<DebateEntry>> {
        let agents: Vec<String> = (1..=self.num_agents).map(|n| format!("Agent_{n}")).collect();
        let mut history = Vec::with_capacity(3 * self.num_agents + 1);

        for agent in &agents {
            let system = format!(
                "You are {agent}, one of {} experts analyzing a problem. \
                 Bring your own perspective.",
                agents.len()
            );
            let prompt = format!("Analyze this problem from your perspective:\n{problem}");
            let content = client.ask(&system, &prompt, self.temperature).await?;
            history.push(DebateEntry {
                agent: agent.clone(),
                content: content.into_text_or_default(),
                kind: DebateEntryKind::Analysis,
            });
        }
        debug!(agents = agents.len(), "Analysis pass done");

        for round in 1..=DEBATE_ROUNDS {
            for agent in &agents {
                let system = format!(
                    "You are {agent} in a structured debate. Be specific and constructive."
                );
                let prompt = format!(
                    "Problem:\n{problem}\n\nDebate so far:\n{}\n\
                     Critique the other agents' points and add your own view.",
                    transcript(&history)
                );
                let content = client.ask(&system, &prompt, self.temperature).await?;
                history.push(DebateEntry {
                    agent: agent.clone(),
                    content: content.into_text_or_default(),
                    kind: DebateEntryKind::Debate,
                });
            }
            debug!(round, "Debate round done");
        }

        let prompt = format!(
            "Problem:\n{problem}\n\nFull debate:\n{}\n\
             Synthesize the debate into a final conclusion, noting where the agents agreed \
             and how disagreements were resolved.",
            transcript(&history)
        );
        let conclusion = client
            .ask("You are a neutral moderator summarizing a debate.", &prompt, self.temperature)
            .await?;
        history.push(DebateEntry {
            agent: MODERATOR.to_string(),
            content: conclusion.into_text_or_default(),
            kind: DebateEntryKind::Conclusion,
        });

        info!(entries = history.len(), "Debate finished");
        Ok(history)
    }
}

#[async_trait]
impl ReasoningStrategy for MultiAgentDebate {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiAgent
    }

    async fn execute(&self, client: &LlmClient, problem: &str) -> Result<Envelope> {
        Ok(Envelope::DebateHistory(self.run(client, problem).await?))
    }
}

/// Renders the history as plain text for the next prompt.
fn transcript(history: &[DebateEntry]) -> String {
    history.iter().fold(String::new(), |mut out, entry| {
        let kind = match entry.kind {
            DebateEntryKind::Analysis => "analysis",
            DebateEntryKind::Debate => "debate",
            DebateEntryKind::Conclusion => "conclusion",
        };
        out.push_str(&format!("[{} - {kind}]: {}\n\n", entry.agent, entry.content));
        out
    })
}
