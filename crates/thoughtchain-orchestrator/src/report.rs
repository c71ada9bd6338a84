//! Batch output document.
//!
//! One JSON object per problem, holding every strategy's envelope under the
//! strategy key:
//!
//! ```json
//! {
//!   "input": "...",
//!   "tree_search": {"tree": {..}},
//!   "propose_critique": {"iterations": [..]},
//!   "multi_agent": {"debate_history": [..]},
//!   "human_annotation": {"annotation": {..}}
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{GenerationReport, StrategyOutcome};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::strategies::StrategyKind;

/// Default file written by batch runs.
pub const DEFAULT_BATCH_OUTPUT: &str = "thought_chain_output.json";

/// A strategy slot in the batch document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    /// The strategy's envelope.
    Envelope(Envelope),
    /// The strategy failed.
    Failed {
        /// Error message
        error: String,
    },
}

/// Combined output for one problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchDocument {
    /// The problem text.
    pub input: String,
    /// Tree-search result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_search: Option<BatchEntry>,
    /// Propose-critique result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub propose_critique: Option<BatchEntry>,
    /// Multi-agent debate result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_agent: Option<BatchEntry>,
    /// Human-annotation result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_annotation: Option<BatchEntry>,
}

impl BatchDocument {
    /// Builds the document from a finished report.
    #[must_use]
    pub fn from_report(report: &GenerationReport) -> Self {
        let mut document = Self {
            input: report.input.clone(),
            tree_search: None,
            propose_critique: None,
            multi_agent: None,
            human_annotation: None,
        };
        for run in &report.runs {
            let entry = match &run.outcome {
                StrategyOutcome::Completed(envelope) => BatchEntry::Envelope(envelope.clone()),
                StrategyOutcome::Failed { error } => BatchEntry::Failed { error: error.clone() },
            };
            *document.slot_mut(run.kind) = Some(entry);
        }
        document
    }

    /// The entry for `kind`, if present.
    #[must_use]
    pub const fn entry(&self, kind: StrategyKind) -> Option<&BatchEntry> {
        match kind {
            StrategyKind::TreeSearch => self.tree_search.as_ref(),
            StrategyKind::ProposeCritique => self.propose_critique.as_ref(),
            StrategyKind::MultiAgent => self.multi_agent.as_ref(),
            StrategyKind::HumanAnnotation => self.human_annotation.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: StrategyKind) -> &mut Option<BatchEntry> {
        match kind {
            StrategyKind::TreeSearch => &mut self.tree_search,
            StrategyKind::ProposeCritique => &mut self.propose_critique,
            StrategyKind::MultiAgent => &mut self.multi_agent,
            StrategyKind::HumanAnnotation => &mut self.human_annotation,
        }
    }

    /// Pretty JSON with two-space indentation; non-ASCII text is kept as is.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document to `path`, replacing any existing file.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?)?;
        info!(path = %path.display(), "Batch output written");
        Ok(())
    }

    /// Reads a document previously written with [`BatchDocument::write_to`].
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
