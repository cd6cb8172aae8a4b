//! Domain models for claims, evidence, decisions and configuration.

pub mod claim;
pub mod config;
pub mod decision;
pub mod evidence;
pub mod progress;
pub mod verification;

pub use claim::Claim;
pub use config::{
    Config, LogFormat, LoggingConfig, ModelConfig, ModelProvider, RateLimitConfig, RetryConfig,
    RotationPolicy, SearchConfig, SearchProvider, SearchType, VerifierConfig,
};
pub use decision::{Decision, SearchRequest, Verdict};
pub use evidence::{EvidenceEntry, EvidenceStore, SearchResult};
pub use progress::{ProgressEvent, ProgressKind};
pub use verification::{Termination, TokenUsage, Usage, VerificationResult};
