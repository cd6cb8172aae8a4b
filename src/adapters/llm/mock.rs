//! Scripted language model for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;

use crate::domain::errors::ModelError;
use crate::domain::models::{ModelProvider, TokenUsage};
use crate::domain::ports::{Completion, LanguageModelClient};

/// Language model that replays a fixed script of replies
///
/// Each call pops the next scripted entry. Once the script is exhausted the
/// fallback reply is returned, or a provider error when none is set.
/// Every prompt received is recorded.
pub struct ScriptedLanguageModel {
    script: Mutex<VecDeque<Result<String, ModelError>>>,
    fallback: Option<String>,
    usage_per_call: TokenUsage,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLanguageModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(replies.into_iter().map(|reply| Ok(reply.into())))
    }

    /// Script mixing replies and failures
    pub fn from_results<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ModelError>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: None,
            usage_per_call: TokenUsage::new(100, 20),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::new(Vec::<String>::new()).with_fallback(reply)
    }

    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage_per_call = usage;
        self
    }

    /// Prompts received so far, oldest first
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl LanguageModelClient for ScriptedLanguageModel {
    fn provider(&self) -> Option<ModelProvider> {
        None
    }

    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError> {
        self.prompts.lock().await.push(prompt.to_string());

        let next = self.script.lock().await.pop_front();
        let text = match next {
            Some(entry) => entry?,
            None => self
                .fallback
                .clone()
                .ok_or_else(|| ModelError::provider("scripted model has no replies left"))?,
        };

        Ok(Completion::new(text, self.usage_per_call))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_script_then_fallback() {
        let model = ScriptedLanguageModel::new(["first", "second"]).with_fallback("again");

        assert_eq!(model.complete("a").await.unwrap().text, "first");
        assert_eq!(model.complete("b").await.unwrap().text, "second");
        assert_eq!(model.complete("c").await.unwrap().text, "again");
        assert_eq!(model.prompts().await, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_scripted_error_and_exhaustion() {
        let model = ScriptedLanguageModel::from_results([Err(ModelError::Timeout("slow".into()))]);

        assert_eq!(
            model.complete("a").await,
            Err(ModelError::Timeout("slow".into()))
        );
        assert!(model.complete("b").await.is_err());
        assert_eq!(model.call_count().await, 2);
    }
}
