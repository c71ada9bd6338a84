//! The four reasoning-trace strategies.
//!
//! Each strategy issues a bounded, fixed sequence of model calls for one
//! problem and returns its result wrapped in an [`Envelope`]. Strategies share
//! nothing but the client.

pub mod human_annotation;
pub mod multi_agent;
pub mod propose_critique;
pub mod tree_search;

use crate::envelope::Envelope;
use crate::error::{OrchestrationError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thoughtchain_models::{DEFAULT_TEMPERATURE, LlmClient};

pub use human_annotation::{Annotation, HumanAnnotation};
pub use multi_agent::{DebateEntry, DebateEntryKind, MODERATOR, MultiAgentDebate};
pub use propose_critique::{IterationRecord, ProposeCritique};
pub use tree_search::TreeSearch;

/// Identifies one of the four strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One level of subtask decomposition with graded solutions.
    TreeSearch,
    /// Propose, grade, and re-propose until the grade is good enough.
    ProposeCritique,
    /// Several agents analyze, debate two rounds, and a moderator concludes.
    MultiAgent,
    /// Analysis, exploration, improvement, conclusion.
    HumanAnnotation,
}

impl StrategyKind {
    /// All strategies, in presentation order.
    pub const ALL: [Self; 4] =
        [Self::TreeSearch, Self::ProposeCritique, Self::MultiAgent, Self::HumanAnnotation];

    /// Heading shown above the strategy's output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TreeSearch => "Tree Search",
            Self::ProposeCritique => "Propose-Critique Loop",
            Self::MultiAgent => "Multi-Agent Debate",
            Self::HumanAnnotation => "Human Thought Annotation",
        }
    }

    /// Key under which the strategy's result is persisted.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::TreeSearch => "tree_search",
            Self::ProposeCritique => "propose_critique",
            Self::MultiAgent => "multi_agent",
            Self::HumanAnnotation => "human_annotation",
        }
    }

    /// Key of the envelope the strategy produces.
    #[must_use]
    pub const fn envelope_key(self) -> &'static str {
        match self {
            Self::TreeSearch => "tree",
            Self::ProposeCritique => "iterations",
            Self::MultiAgent => "debate_history",
            Self::HumanAnnotation => "annotation",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StrategyKind {
    type Err = OrchestrationError;

    /// Accepts the persisted key, its kebab-case form, or the label, in any case.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| {
                kind.key() == normalized
                    || kind.label().to_lowercase().replace(['-', ' '], "_") == normalized
            })
            .ok_or_else(|| OrchestrationError::UnknownStrategy(s.to_string()))
    }
}

/// A strategy ready to run against a problem.
#[async_trait]
pub trait ReasoningStrategy: Send + Sync {
    /// Which strategy this is.
    fn kind(&self) -> StrategyKind;

    /// Runs the strategy's call sequence and wraps the result.
    ///
    /// # Errors
    /// Returns an error only when a model call fails after retries.
    async fn execute(&self, client: &LlmClient, problem: &str) -> Result<Envelope>;
}

/// Tunables shared by the strategies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Deepest tree-search node below the root.
    pub max_depth: usize,
    /// Upper bound on propose-critique rounds.
    pub max_iterations: usize,
    /// Number of debating agents.
    pub num_agents: usize,
    /// Sampling temperature for generation calls.
    pub temperature: f32,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            max_depth: tree_search::DEFAULT_MAX_DEPTH,
            max_iterations: propose_critique::DEFAULT_MAX_ITERATIONS,
            num_agents: multi_agent::DEFAULT_NUM_AGENTS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl StrategySettings {
    /// Rejects values the strategies cannot run with.
    ///
    /// # Errors
    /// Returns [`OrchestrationError::InvalidSetting`] for zero iterations,
    /// zero agents, or a temperature outside [0, 2].
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(OrchestrationError::InvalidSetting {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.num_agents == 0 {
            return Err(OrchestrationError::InvalidSetting {
                name: "num_agents",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(OrchestrationError::InvalidSetting {
                name: "temperature",
                reason: format!("{} is outside 0.0..=2.0", self.temperature),
            });
        }
        Ok(())
    }

    /// Builds the executor for `kind` with these settings.
    #[must_use]
    pub fn build(&self, kind: StrategyKind) -> Box<dyn ReasoningStrategy> {
        match kind {
            StrategyKind::TreeSearch => {
                Box::new(TreeSearch::new(self.max_depth).with_temperature(self.temperature))
            }
            StrategyKind::ProposeCritique => Box::new(
                ProposeCritique::new(self.max_iterations).with_temperature(self.temperature),
            ),
            StrategyKind::MultiAgent => {
                Box::new(MultiAgentDebate::new(self.num_agents).with_temperature(self.temperature))
            }
            StrategyKind::HumanAnnotation => {
                Box::new(HumanAnnotation::new().with_temperature(self.temperature))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_keys_kebab_and_labels() {
        assert_eq!("tree_search".parse::<StrategyKind>().unwrap(), StrategyKind::TreeSearch);
        assert_eq!("propose-critique".parse::<StrategyKind>().unwrap(), StrategyKind::ProposeCritique);
        assert_eq!("Multi-Agent".parse::<StrategyKind>().unwrap(), StrategyKind::MultiAgent);
        assert_eq!("Multi-Agent Debate".parse::<StrategyKind>().unwrap(), StrategyKind::MultiAgent);
        assert_eq!(
            "human thought annotation".parse::<StrategyKind>().unwrap(),
            StrategyKind::HumanAnnotation
        );
        assert!(matches!(
            "beam-search".parse::<StrategyKind>(),
            Err(OrchestrationError::UnknownStrategy(name)) if name == "beam-search"
        ));
    }

    #[test]
    fn test_serde_uses_persisted_keys() {
        for kind in StrategyKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.key()));
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = StrategySettings::default();
        assert_eq!(settings.max_depth, 3);
        assert_eq!(settings.max_iterations, 3);
        assert_eq!(settings.num_agents, 3);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_degenerate_settings() {
        let zero_agents = StrategySettings { num_agents: 0, ..StrategySettings::default() };
        assert!(matches!(
            zero_agents.validate(),
            Err(OrchestrationError::InvalidSetting { name: "num_agents", .. })
        ));

        let hot = StrategySettings { temperature: 3.5, ..StrategySettings::default() };
        assert!(hot.validate().is_err());
    }

    #[test]
    fn test_build_matches_kind() {
        let settings = StrategySettings::default();
        for kind in StrategyKind::ALL {
            assert_eq!(settings.build(kind).kind(), kind);
        }
    }
}
