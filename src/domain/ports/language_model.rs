//! Language model port.
//!
//! Abstracts the LLM backend so the verification loop can run against any
//! provider adapter or a scripted mock.

use async_trait::async_trait;

use crate::domain::errors::ModelError;
use crate::domain::models::{ModelProvider, TokenUsage};

/// Text returned by a single completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

impl Completion {
    pub fn new(text: impl Into<String>, usage: TokenUsage) -> Self {
        Self {
            text: text.into(),
            usage,
        }
    }
}

/// Port trait for language model clients
///
/// One implementation per provider, selected through [`ModelProvider`].
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; a single client is shared by
/// concurrent verifications in batch mode.
#[async_trait]
pub trait LanguageModelClient: Send + Sync {
    /// Provider backing this client, `None` for test doubles
    fn provider(&self) -> Option<ModelProvider>;

    /// Model identifier sent with each request
    fn model_id(&self) -> &str;

    /// Send a single-turn prompt and return the completion text
    ///
    /// # Errors
    /// - `ModelError::Timeout` - no answer within the configured timeout
    /// - `ModelError::RateLimited` - provider throttled the request
    /// - `ModelError::MalformedResponse` - body undecodable or without text
    /// - `ModelError::Provider` - auth, request or server failure
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError>;
}
