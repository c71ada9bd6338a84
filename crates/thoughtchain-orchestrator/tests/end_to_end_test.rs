//! End-to-end tests running every strategy through the orchestrator.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use thoughtchain_abstraction::{
    ChatMessage, Completion, Model, ModelError, ModelParameters, ModelResponse, Role,
};
use thoughtchain_models::{LlmClient, MockModel};
use thoughtchain_orchestrator::{
    BatchDocument, BatchEntry, ChannelSink, Envelope, OrchestrationError, Orchestrator,
    ProgressEvent, StrategyKind, StrategySettings, ThoughtKind,
};

const PROBLEM: &str = "Optimize this code snippet: fibonacci(n)";

/// Answers by looking at what the prompt asks for.
struct PromptRoutedModel {
    grade: &'static str,
    calls: AtomicUsize,
}

impl PromptRoutedModel {
    fn new(grade: &'static str) -> Self {
        Self { grade, calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl Model for PromptRoutedModel {
    async fn generate_chat_completion(
        &self,
        messages: &[ChatMessage],
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let prompt = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map_or("", |m| m.content.as_str());

        let reply = if prompt.contains("Rate this solution") {
            format!("{} - handles the base case, recursion still exponential", self.grade)
        } else if prompt.contains("Break the following problem") {
            "Identify the repeated work\nReplace recursion with iteration".to_string()
        } else {
            "Keep two running values and loop n times.".to_string()
        };
        Ok(ModelResponse::new(Completion::Content(reply), Some("routed".to_string())))
    }

    fn model_id(&self) -> &str {
        "routed"
    }
}

/// Every call fails at the transport layer.
struct UnreachableModel;

#[async_trait]
impl Model for UnreachableModel {
    async fn generate_chat_completion(
        &self,
        _messages: &[ChatMessage],
        _parameters: Option<ModelParameters>,
    ) -> Result<ModelResponse, ModelError> {
        Err(ModelError::Transport("connection refused".to_string()))
    }

    fn model_id(&self) -> &str {
        "unreachable"
    }
}

fn orchestrator(model: Arc<dyn Model>) -> Orchestrator {
    Orchestrator::new(LlmClient::new(model), StrategySettings::default()).unwrap()
}

#[tokio::test]
async fn test_all_strategies_produce_their_envelopes() {
    let model = Arc::new(PromptRoutedModel::new("9/10"));

    let report = orchestrator(model.clone()).run_all(PROBLEM).await.unwrap();

    assert!(report.is_complete());
    let merged = report.merged_envelopes().unwrap();
    let mut keys: Vec<&str> = merged.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["annotation", "debate_history", "iterations", "tree"]);

    // Tree: 2 subtasks graded 0.9, so no reflections.
    let tree = &merged["tree"];
    assert_eq!(tree["type"], "problem");
    assert_eq!(tree["content"], PROBLEM);
    assert_eq!(tree["children"].as_array().unwrap().len(), 2);
    assert_eq!(tree["children"][0]["children"][0]["type"], "action");
    assert!(tree["children"][0]["children"][0]["children"].as_array().unwrap().is_empty());

    // Accepted on the first round.
    assert_eq!(merged["iterations"].as_array().unwrap().len(), 1);
    assert_eq!(merged["debate_history"].as_array().unwrap().len(), 10);
    assert_eq!(merged["annotation"]["conclusion"], "Keep two running values and loop n times.");

    // 5 tree + 2 propose-critique + 10 debate + 4 annotation.
    assert_eq!(model.calls.load(Ordering::SeqCst), 21);
}

#[tokio::test]
async fn test_weak_grades_add_reflections_and_extra_rounds() {
    let model = Arc::new(PromptRoutedModel::new("5/10"));
    let orchestrator = orchestrator(model);

    let tree = orchestrator.run_strategy(StrategyKind::TreeSearch, PROBLEM).await.unwrap();
    let Envelope::Tree(root) = tree else { panic!("expected a tree envelope") };
    let reflections = root.iter().filter(|node| node.kind == ThoughtKind::Reflection).count();
    assert_eq!(reflections, 2);

    let rounds = orchestrator.run_strategy(StrategyKind::ProposeCritique, PROBLEM).await.unwrap();
    let Envelope::Iterations(records) = rounds else { panic!("expected iterations") };
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| (r.evaluation.score - 0.5).abs() < f64::EPSILON));
}

#[tokio::test]
async fn test_mock_model_runs_offline() {
    let model: Arc<dyn Model> = Arc::new(MockModel::new("mock".to_string()));

    let report = orchestrator(model).run_all(PROBLEM).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.runs.len(), 4);
    let Some(Envelope::Tree(root)) = report.get(StrategyKind::TreeSearch).and_then(|r| r.envelope())
    else {
        panic!("tree search should complete");
    };
    // Three reply lines become three subtasks, each solved and graded 8/10.
    assert_eq!(root.children.len(), 3);
    assert_eq!(root.node_count(), 7);
}

#[tokio::test]
async fn test_unreachable_model_fails_every_strategy_without_aborting() {
    let (sink, mut events) = ChannelSink::channel();

    let report = orchestrator(Arc::new(UnreachableModel))
        .with_progress(Arc::new(sink))
        .run_all(PROBLEM)
        .await
        .unwrap();

    assert_eq!(report.runs.len(), 4);
    assert_eq!(report.failures().count(), 4);

    let merged = report.merged_envelopes().unwrap();
    let errors = merged["errors"].as_object().unwrap();
    assert_eq!(errors.len(), 4);
    assert!(errors["tree_search"].as_str().unwrap().contains("connection refused"));

    let mut failed = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, ProgressEvent::StrategyFailed { .. }) {
            failed += 1;
        }
    }
    assert_eq!(failed, 4);
}

#[tokio::test]
async fn test_single_strategy_error_surfaces_model_error() {
    let err = orchestrator(Arc::new(UnreachableModel))
        .run_strategy(StrategyKind::MultiAgent, PROBLEM)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestrationError::Model(ModelError::Transport(_))));
}

#[tokio::test]
async fn test_batch_document_from_run() {
    let model = Arc::new(PromptRoutedModel::new("8/10"));
    let report = orchestrator(model)
        .run(PROBLEM, &[StrategyKind::HumanAnnotation, StrategyKind::TreeSearch])
        .await
        .unwrap();

    let document = BatchDocument::from_report(&report);

    assert_eq!(document.input, PROBLEM);
    assert!(matches!(document.tree_search, Some(BatchEntry::Envelope(Envelope::Tree(_)))));
    assert!(matches!(
        document.human_annotation,
        Some(BatchEntry::Envelope(Envelope::Annotation(_)))
    ));
    assert!(document.multi_agent.is_none());

    let value = serde_json::to_value(&document).unwrap();
    assert!(value["tree_search"]["tree"].is_object());
}
