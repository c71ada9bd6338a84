//! Grading a candidate solution against its problem.

use crate::error::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thoughtchain_abstraction::Completion;
use thoughtchain_models::LlmClient;
use tracing::{debug, warn};

/// Score used when the grader's reply cannot be read.
pub const DEFAULT_SCORE: f64 = 0.5;

/// Feedback used when the grader's reply cannot be read.
pub const UNABLE_TO_EVALUATE: &str = "unable to evaluate";

/// Grading is kept cooler than generation.
pub const EVALUATION_TEMPERATURE: f32 = 0.3;

const EVALUATOR_SYSTEM_PROMPT: &str = "You are a strict reviewer. Grade the proposed solution \
for correctness, completeness and clarity. Give a score as '<n>/10' (n from 1 to 10), then \
explain the weaknesses you found.";

// First integer immediately followed by "/10".
static SCORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)/10").expect("score regex should be valid"));

/// A grade in [0, 1] plus the grader's feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Normalized score.
    pub score: f64,
    /// Grader feedback text.
    pub feedback: String,
}

impl Evaluation {
    /// The grade given when nothing could be read.
    #[must_use]
    pub fn unscored() -> Self {
        Self { score: DEFAULT_SCORE, feedback: UNABLE_TO_EVALUATE.to_string() }
    }

    /// Reads a grade out of a grader reply.
    ///
    /// The whole reply becomes the feedback; a reply without a `<n>/10`
    /// grade is [`Evaluation::unscored`].
    #[must_use]
    pub fn from_reply(reply: &str) -> Self {
        parse_score(reply).map_or_else(Self::unscored, |score| Self {
            score,
            feedback: reply.trim().to_string(),
        })
    }

    /// Reads a grade out of a model completion.
    #[must_use]
    pub fn from_completion(completion: &Completion) -> Self {
        completion.text().map_or_else(Self::unscored, Self::from_reply)
    }
}

/// Extracts the first `<n>/10` grade and normalizes it to [0, 1].
#[must_use]
pub fn parse_score(text: &str) -> Option<f64> {
    let captures = SCORE_PATTERN.captures(text)?;
    match captures[1].parse::<u32>() {
        Ok(points) => Some((f64::from(points) / 10.0).min(1.0)),
        Err(e) => {
            warn!(error = %e, raw = &captures[1], "Score digits did not parse");
            None
        }
    }
}

/// Asks the model to grade `solution` as an answer to `problem`.
///
/// # Errors
/// Only transport failures that outlived the client's retries. An unreadable
/// or empty reply degrades to [`Evaluation::unscored`].
pub async fn evaluate(client: &LlmClient, problem: &str, solution: &str) -> Result<Evaluation> {
    let prompt = format!(
        "Problem:\n{problem}\n\nProposed solution:\n{solution}\n\n\
         Rate this solution from 1 to 10 in the form '<n>/10' and give specific feedback."
    );
    let completion = client.ask(EVALUATOR_SYSTEM_PROMPT, &prompt, EVALUATION_TEMPERATURE).await?;
    let evaluation = Evaluation::from_completion(&completion);
    debug!(score = evaluation.score, empty = completion.is_empty(), "Solution evaluated");
    Ok(evaluation)
}
