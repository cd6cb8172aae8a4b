//! One prompt-and-parse round against the language model.

use std::sync::Arc;
use tracing::{debug, warn};

use super::decision_parser::{parse_decision, parse_verdict};
use super::prompt::{render_forced_prompt, render_prompt, with_reformulation};
use crate::domain::errors::{ModelError, ParseError};
use crate::domain::models::{Claim, Decision, EvidenceEntry, TokenUsage, Verdict};
use crate::domain::ports::LanguageModelClient;

/// What a decision step produced
///
/// `parsed` is `None` when both the original reply and the reformulated
/// retry were unparseable.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome<T> {
    pub parsed: Option<T>,
    /// Text of the last completion received
    pub response: String,
    pub usage: TokenUsage,
    pub model_calls: u32,
}

/// Prompts the model for a decision, with one reformulated retry on parse failure
pub struct DecisionStep {
    model: Arc<dyn LanguageModelClient>,
}

impl DecisionStep {
    pub fn new(model: Arc<dyn LanguageModelClient>) -> Self {
        Self { model }
    }

    /// Ask for a verdict or the next search query
    pub async fn decide(
        &self,
        claim: &Claim,
        evidence: &[EvidenceEntry],
    ) -> Result<StepOutcome<Decision>, ModelError> {
        let prompt = render_prompt(claim, evidence);
        self.ask(&prompt, false, parse_decision).await
    }

    /// Demand a verdict from the evidence gathered so far
    pub async fn force_verdict(
        &self,
        claim: &Claim,
        evidence: &[EvidenceEntry],
    ) -> Result<StepOutcome<Verdict>, ModelError> {
        let prompt = render_forced_prompt(claim, evidence);
        self.ask(&prompt, true, parse_verdict).await
    }

    async fn ask<T>(
        &self,
        prompt: &str,
        verdict_only: bool,
        parse: fn(&str) -> Result<T, ParseError>,
    ) -> Result<StepOutcome<T>, ModelError> {
        let first = self.model.complete(prompt).await?;
        let mut usage = first.usage;

        let error = match parse(&first.text) {
            Ok(parsed) => {
                return Ok(StepOutcome {
                    parsed: Some(parsed),
                    response: first.text,
                    usage,
                    model_calls: 1,
                });
            }
            Err(error) => error,
        };

        warn!(error = %error, "unparseable model reply, retrying with reformulated instructions");
        let retry = self
            .model
            .complete(&with_reformulation(prompt, verdict_only))
            .await?;
        usage += retry.usage;

        let parsed = match parse(&retry.text) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                debug!(error = %error, "reformulated reply still unparseable");
                None
            }
        };

        Ok(StepOutcome {
            parsed,
            response: retry.text,
            usage,
            model_calls: 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::llm::ScriptedLanguageModel;

    fn claim() -> Claim {
        Claim::new("Water boils at 100 degrees Celsius at sea level.").unwrap()
    }

    #[tokio::test]
    async fn test_decide_first_reply_parses() {
        let model = Arc::new(ScriptedLanguageModel::new([r#"{"search_query": "boiling point water"}"#]));
        let step = DecisionStep::new(model.clone());

        let outcome = step.decide(&claim(), &[]).await.unwrap();

        assert_eq!(outcome.parsed, Some(Decision::search("boiling point water")));
        assert_eq!(outcome.model_calls, 1);
        assert_eq!(model.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_decide_retries_once_with_reformulation() {
        let model = Arc::new(ScriptedLanguageModel::new([
            "Hmm, let me think.",
            r#"{"final_answer": "True", "confidence": 0.9}"#,
        ]));
        let step = DecisionStep::new(model.clone());

        let outcome = step.decide(&claim(), &[]).await.unwrap();

        assert!(outcome.parsed.unwrap().is_verdict());
        assert_eq!(outcome.model_calls, 2);
        assert_eq!(outcome.usage, TokenUsage::new(200, 40));

        let prompts = model.prompts().await;
        assert!(prompts[1].starts_with(&prompts[0]));
        assert!(prompts[1].contains("could not be understood"));
    }

    #[tokio::test]
    async fn test_decide_unparseable_twice() {
        let model = Arc::new(ScriptedLanguageModel::new(["no idea", "still no idea"]));
        let step = DecisionStep::new(model);

        let outcome = step.decide(&claim(), &[]).await.unwrap();

        assert_eq!(outcome.parsed, None);
        assert_eq!(outcome.response, "still no idea");
        assert_eq!(outcome.model_calls, 2);
    }

    #[tokio::test]
    async fn test_model_error_propagates() {
        let model = Arc::new(ScriptedLanguageModel::from_results([
            Ok("garbled".to_string()),
            Err(ModelError::RateLimited("quota".to_string())),
        ]));
        let step = DecisionStep::new(model);

        let result = step.force_verdict(&claim(), &[]).await;

        assert_eq!(result, Err(ModelError::RateLimited("quota".to_string())));
    }
}
