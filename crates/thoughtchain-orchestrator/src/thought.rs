//! Reasoning tree built by the tree-search strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a node in the reasoning tree stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThoughtKind {
    /// The problem statement at the root.
    Problem,
    /// A subtask split off the problem.
    Thought,
    /// A worked solution to a subtask.
    Action,
    /// An improvement suggestion for a weak action.
    Reflection,
    /// A closing summary.
    Conclusion,
}

impl ThoughtKind {
    /// Lowercase tag, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Problem => "problem",
            Self::Thought => "thought",
            Self::Action => "action",
            Self::Reflection => "reflection",
            Self::Conclusion => "conclusion",
        }
    }
}

impl fmt::Display for ThoughtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node that owns its children outright; there are no parent links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThoughtNode {
    /// Node text.
    pub content: String,
    /// Node type tag.
    #[serde(rename = "type")]
    pub kind: ThoughtKind,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Grader feedback, when the node was evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    /// Ordered children.
    #[serde(default)]
    pub children: Vec<ThoughtNode>,
}

impl ThoughtNode {
    /// Creates a childless node with zero confidence.
    pub fn new(content: impl Into<String>, kind: ThoughtKind) -> Self {
        Self { content: content.into(), kind, confidence: 0.0, feedback: None, children: Vec::new() }
    }

    /// Sets confidence (clamped to [0, 1]) and feedback.
    #[must_use]
    pub fn with_assessment(mut self, confidence: f64, feedback: impl Into<String>) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self.feedback = Some(feedback.into());
        self
    }

    /// Appends a child and returns `self`.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child in place.
    pub fn push_child(&mut self, child: Self) {
        self.children.push(child);
    }

    /// Number of nodes in this subtree, this node included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }

    /// Depth-first iterator over this subtree, this node first.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }
}
