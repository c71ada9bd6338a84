//! Uniform result envelopes and their markdown rendering.
//!
//! Every strategy result serializes as a single-key mapping: `{"tree": ..}`,
//! `{"iterations": [..]}`, `{"debate_history": [..]}` or `{"annotation": {..}}`.

use crate::strategies::{Annotation, DebateEntry, DebateEntryKind, IterationRecord, StrategyKind};
use crate::thought::ThoughtNode;
use serde::{Deserialize, Serialize};

/// A strategy result under its envelope key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    /// Tree-search reasoning tree.
    Tree(ThoughtNode),
    /// Propose-critique rounds.
    Iterations(Vec<IterationRecord>),
    /// Multi-agent debate history.
    DebateHistory(Vec<DebateEntry>),
    /// Human-annotation stages.
    Annotation(Annotation),
}

impl Envelope {
    /// The strategy that produces this envelope.
    #[must_use]
    pub const fn strategy(&self) -> StrategyKind {
        match self {
            Self::Tree(_) => StrategyKind::TreeSearch,
            Self::Iterations(_) => StrategyKind::ProposeCritique,
            Self::DebateHistory(_) => StrategyKind::MultiAgent,
            Self::Annotation(_) => StrategyKind::HumanAnnotation,
        }
    }

    /// The envelope's single top-level key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.strategy().envelope_key()
    }

    /// Renders the content as markdown for display.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Tree(root) => write_tree(&mut out, root, 0),
            Self::Iterations(records) => write_iterations(&mut out, records),
            Self::DebateHistory(entries) => write_debate(&mut out, entries),
            Self::Annotation(annotation) => write_annotation(&mut out, annotation),
        }
        out
    }
}

fn write_tree(out: &mut String, node: &ThoughtNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let mut lines = node.content.lines().filter(|line| !line.trim().is_empty());
    let first = lines.next().unwrap_or_default();

    out.push_str(&format!("{indent}- **{}**: {first}", node.kind));
    if node.feedback.is_some() {
        out.push_str(&format!(" _(confidence {:.2})_", node.confidence));
    }
    out.push('\n');
    for line in lines {
        out.push_str(&format!("{indent}  {line}\n"));
    }
    if let Some(feedback) = &node.feedback {
        let summary = feedback.lines().next().unwrap_or_default();
        out.push_str(&format!("{indent}  > {summary}\n"));
    }

    for child in &node.children {
        write_tree(out, child, depth + 1);
    }
}

fn write_iterations(out: &mut String, records: &[IterationRecord]) {
    for record in records {
        out.push_str(&format!("### Iteration {}\n\n", record.iteration));
        out.push_str(&format!("{}\n\n", record.proposal.trim()));
        out.push_str(&format!(
            "**Score:** {:.1}/10\n\n**Feedback:** {}\n\n",
            record.evaluation.score * 10.0,
            record.evaluation.feedback.trim()
        ));
    }
}

fn write_debate(out: &mut String, entries: &[DebateEntry]) {
    for entry in entries {
        let phase = match entry.kind {
            DebateEntryKind::Analysis => "Analysis",
            DebateEntryKind::Debate => "Debate",
            DebateEntryKind::Conclusion => "Conclusion",
        };
        out.push_str(&format!("### {} ({phase})\n\n{}\n\n", entry.agent, entry.content.trim()));
    }
}

fn write_annotation(out: &mut String, annotation: &Annotation) {
    for (heading, body) in [
        ("Analysis", &annotation.analysis),
        ("Exploration", &annotation.exploration),
        ("Improvement", &annotation.improvement),
        ("Conclusion", &annotation.conclusion),
    ] {
        if body.trim().is_empty() {
            continue;
        }
        out.push_str(&format!("### {heading}\n\n{}\n\n", body.trim()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluation;
    use crate::thought::ThoughtKind;
    use serde_json::json;

    fn annotation() -> Annotation {
        Annotation {
            analysis: "slow".to_string(),
            exploration: "memo".to_string(),
            improvement: String::new(),
            conclusion: "loop".to_string(),
        }
    }

    #[test]
    fn test_single_key_envelopes() {
        let cases = [
            (Envelope::Tree(ThoughtNode::new("p", ThoughtKind::Problem)), "tree"),
            (Envelope::Iterations(Vec::new()), "iterations"),
            (Envelope::DebateHistory(Vec::new()), "debate_history"),
            (Envelope::Annotation(annotation()), "annotation"),
        ];
        for (envelope, key) in cases {
            let value = serde_json::to_value(&envelope).unwrap();
            let object = value.as_object().unwrap();
            assert_eq!(object.len(), 1);
            assert!(object.contains_key(key), "missing {key}");
            assert_eq!(envelope.key(), key);
        }
    }

    #[test]
    fn test_annotation_envelope_fields() {
        let value = serde_json::to_value(Envelope::Annotation(annotation())).unwrap();
        assert_eq!(
            value,
            json!({"annotation": {
                "analysis": "slow", "exploration": "memo", "improvement": "", "conclusion": "loop"
            }})
        );
    }

    #[test]
    fn test_envelope_round_trip_keeps_strategy() {
        let envelope = Envelope::Annotation(annotation());
        let text = serde_json::to_string(&envelope).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back.strategy(), StrategyKind::HumanAnnotation);
    }

    #[test]
    fn test_tree_markdown_nests_and_shows_grades() {
        let tree = ThoughtNode::new("fib(n)", ThoughtKind::Problem).with_child(
            ThoughtNode::new("base case", ThoughtKind::Thought).with_child(
                ThoughtNode::new("return n\nfor n <= 1", ThoughtKind::Action)
                    .with_assessment(0.6, "6/10 fine\nmore words"),
            ),
        );

        let markdown = Envelope::Tree(tree).to_markdown();

        assert_eq!(
            markdown,
            "- **problem**: fib(n)\n\
             \x20 - **thought**: base case\n\
             \x20   - **action**: return n _(confidence 0.60)_\n\
             \x20     for n <= 1\n\
             \x20     > 6/10 fine\n"
        );
    }

    #[test]
    fn test_iterations_markdown() {
        let markdown = Envelope::Iterations(vec![IterationRecord {
            iteration: 1,
            proposal: "use a loop".to_string(),
            evaluation: Evaluation { score: 0.8, feedback: "8/10 good".to_string() },
        }])
        .to_markdown();

        assert!(markdown.starts_with("### Iteration 1\n\nuse a loop\n"));
        assert!(markdown.contains("**Score:** 8.0/10"));
        assert!(markdown.contains("**Feedback:** 8/10 good"));
    }

    #[test]
    fn test_debate_and_annotation_markdown() {
        let debate = Envelope::DebateHistory(vec![DebateEntry {
            agent: "Moderator".to_string(),
            content: "agreed".to_string(),
            kind: DebateEntryKind::Conclusion,
        }])
        .to_markdown();
        assert_eq!(debate, "### Moderator (Conclusion)\n\nagreed\n\n");

        let notes = Envelope::Annotation(annotation()).to_markdown();
        assert!(notes.contains("### Exploration\n\nmemo"));
        assert!(!notes.contains("Improvement"));
    }
}
