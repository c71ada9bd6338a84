//! Strategies command implementation.

use anyhow::Result;
use colored::Colorize;
use serde_json::json;
use thoughtchain_orchestrator::StrategyKind;

/// Lists the available strategies.
pub fn execute(json_output: bool) -> Result<()> {
    if json_output {
        let list: Vec<_> = StrategyKind::ALL
            .iter()
            .map(|kind| {
                json!({
                    "key": kind.key(),
                    "label": kind.label(),
                    "envelope": kind.envelope_key(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
        return Ok(());
    }

    println!();
    println!("{}", format!("Strategies ({})", StrategyKind::ALL.len()).bold().cyan());
    println!();
    for kind in StrategyKind::ALL {
        println!(
            "  {} {}  {}",
            format!("{:<18}", kind.key().replace('_', "-")).green(),
            kind.label(),
            format!("-> {}", kind.envelope_key()).dimmed()
        );
    }
    println!();
    Ok(())
}
