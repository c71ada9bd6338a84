//! Terminal progress bar fed by orchestrator events.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use thoughtchain_orchestrator::{ProgressEvent, ProgressSink};

/// Draws one step per strategy on stderr; hidden when stderr is not a terminal.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    /// Creates a bar for `total` strategies.
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:24.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Removes the bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressSink for BarSink {
    fn on_event(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::StrategyStarted { kind, .. } => {
                self.bar.set_message(format!("Generating with {}...", kind.label()));
            }
            ProgressEvent::StrategyCompleted { kind, index, elapsed, .. } => {
                self.bar.set_position(*index as u64);
                self.bar.println(format!(
                    "{} {} ({:.1}s)",
                    "✓".green(),
                    kind.label(),
                    elapsed.as_secs_f64()
                ));
            }
            ProgressEvent::StrategyFailed { kind, index, error, .. } => {
                self.bar.set_position(*index as u64);
                self.bar.println(format!("{} {}: {}", "✗".red(), kind.label(), error.dimmed()));
            }
        }
    }
}
