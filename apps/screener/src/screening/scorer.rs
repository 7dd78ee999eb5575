//! Match Scorer: asks the completion model how well a CV fits the job
//! description and parses its two-line reply.
//!
//! The model is treated as an opaque text box. The reply is expected to look like
//!
//! ```text
//! Match Percentage: 92%
//! Explanation: Strong backend fit.
//! ```
//!
//! but nothing guarantees it. A reply without a percentage yields an absent
//! score (never zero) and a reply without an explanation yields `"N/A"`.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::{CompletionModel, CompletionParams};
use crate::screening::prompts::{build_screening_prompt, SCREENING_SYSTEM};

/// Minimum score (inclusive) for a candidate to pass.
pub const PASS_THRESHOLD: i64 = 85;

/// Explanation used when the reply carries no `Explanation:` marker.
pub const NO_EXPLANATION: &str = "N/A";

const EXPLANATION_MARKER: &str = "Explanation:";

/// Low temperature keeps the verdict close to deterministic.
const SCREENING_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.2,
    max_tokens: 500,
};

static SCORE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Match Percentage:\s*([0-9]+)").expect("score pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningStatus {
    Passed,
    #[serde(rename = "Not Passed")]
    NotPassed,
}

impl ScreeningStatus {
    /// `Passed` only when a score is present and at least `PASS_THRESHOLD`.
    pub fn from_score(score: Option<i64>) -> Self {
        match score {
            Some(s) if s >= PASS_THRESHOLD => ScreeningStatus::Passed,
            _ => ScreeningStatus::NotPassed,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScreeningStatus::Passed => "Passed",
            ScreeningStatus::NotPassed => "Not Passed",
        }
    }
}

impl fmt::Display for ScreeningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub score: Option<i64>,
    pub explanation: String,
}

impl MatchOutcome {
    pub fn status(&self) -> ScreeningStatus {
        ScreeningStatus::from_score(self.score)
    }
}

/// Parses a free-text model reply.
///
/// - score: the first run of ASCII digits after `Match Percentage:`; not
///   clamped, so `150` stays `150`. Missing, non-ASCII digits, or too large
///   for `i64` gives `None`.
/// - explanation: everything after the last `Explanation:`, trimmed.
pub fn parse_reply(reply: &str) -> MatchOutcome {
    let score = SCORE_PATTERN
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok());

    let explanation = match reply.rfind(EXPLANATION_MARKER) {
        Some(idx) => reply[idx + EXPLANATION_MARKER.len()..].trim().to_string(),
        None => NO_EXPLANATION.to_string(),
    };

    MatchOutcome { score, explanation }
}

/// Scores CVs for one screening session.
pub struct MatchScorer<'a> {
    model: &'a dyn CompletionModel,
    api_key: &'a str,
}

impl<'a> MatchScorer<'a> {
    pub fn new(model: &'a dyn CompletionModel, api_key: &'a str) -> Self {
        Self { model, api_key }
    }

    /// One completion request per CV. Transport and API failures are errors;
    /// an unexpected reply shape is not.
    pub async fn score(
        &self,
        job_description: &str,
        resume_text: &str,
    ) -> Result<MatchOutcome, AppError> {
        let prompt = build_screening_prompt(job_description, resume_text);

        let reply = self
            .model
            .complete(self.api_key, SCREENING_SYSTEM, &prompt, SCREENING_PARAMS)
            .await
            .map_err(|e| AppError::Llm(e.to_string()))?;

        let outcome = parse_reply(&reply);
        if outcome.score.is_none() {
            debug!("Model reply had no match percentage; recording score as absent");
        }
        Ok(outcome)
    }
}
