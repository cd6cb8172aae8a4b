//! Verification services: prompts, reply parsing, the loop and batch runs.

pub mod batch;
pub mod decision_parser;
pub mod decision_step;
pub mod prompt;
pub mod verifier;

pub use decision_parser::{parse_decision, parse_verdict};
pub use decision_step::{DecisionStep, StepOutcome};
pub use verifier::{verify, VerificationLoop};
