//! Output of a single decision step.

use serde::{Deserialize, Serialize};

/// Terminal True/False judgement on a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: bool,
    /// Model-reported confidence in `[0, 1]`, when given
    pub confidence: Option<f64>,
    pub rationale: String,
}

/// Request for one more web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Either a verdict or a next search query, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    Verdict(Verdict),
    Search(SearchRequest),
}

impl Decision {
    pub fn verdict(label: bool, confidence: Option<f64>, rationale: impl Into<String>) -> Self {
        Self::Verdict(Verdict {
            label,
            confidence,
            rationale: rationale.into(),
        })
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self::Search(SearchRequest {
            query: query.into(),
        })
    }

    pub const fn is_verdict(&self) -> bool {
        matches!(self, Self::Verdict(_))
    }
}
