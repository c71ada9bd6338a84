//! Thought-chain orchestration for Thoughtchain.
//!
//! This crate turns a problem statement into reasoning traces. Four
//! strategies are available (tree search, propose-critique, multi-agent
//! debate and human annotation), each issuing a bounded sequence of calls
//! through a shared [`LlmClient`](thoughtchain_models::LlmClient) and
//! returning its result as an [`Envelope`].
//!
//! [`Orchestrator`] runs a selection of strategies against one problem and
//! collects a [`GenerationReport`]; [`BatchDocument`] is the persisted form.

pub mod engine;
pub mod envelope;
pub mod error;
pub mod evaluation;
pub mod progress;
pub mod report;
pub mod strategies;
pub mod thought;

pub use engine::{ERRORS_KEY, GenerationReport, Orchestrator, StrategyOutcome, StrategyRun};
pub use envelope::Envelope;
pub use error::{OrchestrationError, Result};
pub use evaluation::{Evaluation, evaluate, parse_score};
pub use progress::{ChannelSink, ProgressEvent, ProgressSink};
pub use report::{BatchDocument, BatchEntry, DEFAULT_BATCH_OUTPUT};
pub use strategies::{
    Annotation, DebateEntry, DebateEntryKind, HumanAnnotation, IterationRecord, MultiAgentDebate,
    ProposeCritique, ReasoningStrategy, StrategyKind, StrategySettings, TreeSearch,
};
pub use thought::{ThoughtKind, ThoughtNode};
