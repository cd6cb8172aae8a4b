//! Per-step progress notifications for interactive callers.

use serde::{Deserialize, Serialize};

use super::decision::Decision;

/// What happened at a step of the verification loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressKind {
    /// A decision prompt is about to be sent
    Deciding,
    /// The decision step produced a decision
    Decided { decision: Decision },
    /// A search completed and was recorded
    Searched { query: String, result_count: usize },
    /// A search failed and was recorded with empty results
    SearchFailed { query: String, error: String },
    /// The loop is forcing a verdict
    Forcing { reason: String },
    /// The loop finished with a verdict
    Finished { label: bool, steps_taken: usize },
}

/// Progress notification: claim, current step counter and what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub claim: String,
    /// Number of searches completed so far
    pub step: usize,
    pub max_steps: usize,
    #[serde(flatten)]
    pub kind: ProgressKind,
}
