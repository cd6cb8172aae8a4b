//! Final output of a verification call.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use super::claim::Claim;
use super::evidence::EvidenceEntry;

/// Token counters reported by a model provider for one or more calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub const fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    pub const fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

impl AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        self.input_tokens += rhs.input_tokens;
        self.output_tokens += rhs.output_tokens;
    }
}

/// Resource counters for a whole verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub tokens: TokenUsage,
    pub model_calls: u32,
    pub searches: u32,
}

impl AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.tokens += rhs.tokens;
        self.model_calls += rhs.model_calls;
        self.searches += rhs.searches;
    }
}

/// How the loop reached its verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The model declared a verdict on its own
    Verdict,
    /// The step budget ran out and a verdict was forced
    BudgetExhausted,
    /// The model's replies could not be parsed and a verdict was forced
    Unparseable,
}

impl Termination {
    pub const fn is_forced(self) -> bool {
        !matches!(self, Self::Verdict)
    }
}

/// Outcome of verifying one claim. Built once when the loop finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub claim: Claim,
    pub label: bool,
    pub confidence: Option<f64>,
    pub rationale: String,
    /// Raw text of the completion that produced the verdict (empty when synthesized)
    pub response: String,
    pub evidence: Vec<EvidenceEntry>,
    pub steps_taken: usize,
    pub termination: Termination,
    pub usage: Usage,
    pub elapsed_ms: u64,
}

impl VerificationResult {
    /// Forced verdicts are low confidence by construction.
    pub const fn is_low_confidence(&self) -> bool {
        self.termination.is_forced()
    }

    /// `"TRUE"` or `"FALSE"`
    pub const fn answer(&self) -> &'static str {
        if self.label {
            "TRUE"
        } else {
            "FALSE"
        }
    }
}
