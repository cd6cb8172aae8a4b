//! firecheck - iterative retrieval-and-verification fact checker
//!
//! firecheck decides whether an atomic factual claim is true by letting a
//! language model alternate between issuing web searches and declaring a
//! verdict, within a fixed search budget.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): claim, evidence and decision models, error types and ports
//! - **Service Layer** (`services`): prompt rendering, reply parsing, the verification loop and batch evaluation
//! - **Adapters** (`adapters`): language model and web search clients
//! - **Infrastructure Layer** (`infrastructure`): configuration, HTTP transport and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use firecheck::{verify, ModelConfig, SearchConfig};
//!
//! # async fn run() -> Result<(), firecheck::VerifyError> {
//! let model = ModelConfig::default().with_api_key("sk-ant-...");
//! let search = SearchConfig::default().with_api_key("serper-key");
//!
//! let result = verify("The Eiffel Tower is in Paris.", &model, &search, 5).await?;
//! println!("{} ({})", result.answer(), result.rationale);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{ModelError, ParseError, SearchError, VerifyError};
pub use domain::models::{
    Claim, Config, Decision, EvidenceEntry, LoggingConfig, ModelConfig, ModelProvider,
    ProgressEvent, SearchConfig, SearchResult, Termination, TokenUsage, Usage, Verdict,
    VerificationResult,
};
pub use domain::ports::{LanguageModelClient, ProgressObserver, SearchClient};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{verify, VerificationLoop};
