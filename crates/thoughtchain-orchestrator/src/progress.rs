//! Progress reporting between strategies.
//!
//! Events are informational only: nothing a sink does changes what the
//! orchestrator runs next.

use crate::strategies::StrategyKind;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Progress event types.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// A strategy is about to run.
    StrategyStarted {
        /// Strategy.
        kind: StrategyKind,
        /// 1-based position in the selection.
        index: usize,
        /// Number of strategies selected.
        total: usize,
    },
    /// A strategy produced its envelope.
    StrategyCompleted {
        /// Strategy.
        kind: StrategyKind,
        /// 1-based position in the selection.
        index: usize,
        /// Number of strategies selected.
        total: usize,
        /// Wall time spent.
        elapsed: Duration,
    },
    /// A strategy gave up on a model error.
    StrategyFailed {
        /// Strategy.
        kind: StrategyKind,
        /// 1-based position in the selection.
        index: usize,
        /// Number of strategies selected.
        total: usize,
        /// Error message.
        error: String,
    },
}

impl ProgressEvent {
    /// The strategy the event is about.
    #[must_use]
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::StrategyStarted { kind, .. }
            | Self::StrategyCompleted { kind, .. }
            | Self::StrategyFailed { kind, .. } => *kind,
        }
    }

    /// Share of the selection finished once this event is handled, in [0, 1].
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        let (done, total) = match self {
            Self::StrategyStarted { index, total, .. } => (index.saturating_sub(1), *total),
            Self::StrategyCompleted { index, total, .. }
            | Self::StrategyFailed { index, total, .. } => (*index, *total),
        };
        if total == 0 { 1.0 } else { done as f64 / total as f64 }
    }
}

/// Receives progress events.
pub trait ProgressSink: Send + Sync {
    /// Called once per event, in order.
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event);
    }
}

/// Forwards events to a channel; a closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink(pub mpsc::UnboundedSender<ProgressEvent>);

impl ChannelSink {
    /// Creates a sink and the receiver it feeds.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self(tx), rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_event(&self, event: &ProgressEvent) {
        if self.0.send(event.clone()).is_err() {
            debug!("Progress receiver dropped");
        }
    }
}
