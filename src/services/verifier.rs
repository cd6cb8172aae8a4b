//! The verification loop.
//!
//! ```text
//! INIT -> DECIDING -> (SEARCHING -> DECIDING)* -> DONE
//! ```
//!
//! Each round asks the model for a verdict or a search query. Searches are
//! recorded as evidence (failed searches as empty entries) until the model
//! answers or `max_steps` searches have been made, at which point a verdict
//! is forced. Model errors abort the run; everything else ends in a result.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::decision_step::{DecisionStep, StepOutcome};
use crate::adapters::llm::create_language_model;
use crate::adapters::search::create_search_client;
use crate::domain::errors::{ModelError, VerifyError};
use crate::domain::models::{
    Claim, Decision, EvidenceStore, ModelConfig, ProgressEvent, ProgressKind, SearchConfig,
    Termination, Usage, Verdict, VerificationResult,
};
use crate::domain::ports::{LanguageModelClient, NoopProgress, ProgressObserver, SearchClient};

/// Confidence ceiling for verdicts the loop had to force
pub const FORCED_CONFIDENCE: f64 = 0.3;

/// Rationale used when even the forced prompt yields no verdict
pub const UNSUPPORTED_RATIONALE: &str =
    "No verdict could be obtained; the claim is not supported by the gathered evidence.";

/// Iterative search-and-decide loop for a single claim
///
/// Holds no per-claim state; one instance can verify many claims, also
/// concurrently.
pub struct VerificationLoop {
    step: DecisionStep,
    search: Arc<dyn SearchClient>,
    max_steps: usize,
    observer: Arc<dyn ProgressObserver>,
}

impl VerificationLoop {
    pub fn new(
        model: Arc<dyn LanguageModelClient>,
        search: Arc<dyn SearchClient>,
        max_steps: usize,
    ) -> Self {
        Self {
            step: DecisionStep::new(model),
            search,
            max_steps,
            observer: Arc::new(NoopProgress),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Verify `claim`
    ///
    /// Performs at most `max_steps` searches. Returns the first
    /// [`ModelError`] encountered without a partial result.
    #[instrument(
        name = "verification",
        skip(self, claim),
        fields(run_id = %Uuid::new_v4(), claim = %claim, max_steps = self.max_steps)
    )]
    pub async fn run(&self, claim: &Claim) -> Result<VerificationResult, ModelError> {
        let started = Instant::now();
        let mut evidence = EvidenceStore::with_capacity(self.max_steps);
        let mut usage = Usage::default();

        let (verdict, response, termination) = loop {
            if evidence.len() >= self.max_steps {
                self.emit(claim, &evidence, ProgressKind::Forcing {
                    reason: format!("step budget of {} searches exhausted", self.max_steps),
                });
                let forced = self.step.force_verdict(claim, evidence.entries()).await?;
                break forced_verdict(forced, &mut usage, Termination::BudgetExhausted);
            }

            self.emit(claim, &evidence, ProgressKind::Deciding);
            let outcome = self.step.decide(claim, evidence.entries()).await?;
            usage.tokens += outcome.usage;
            usage.model_calls += outcome.model_calls;

            let Some(decision) = outcome.parsed else {
                self.emit(claim, &evidence, ProgressKind::Forcing {
                    reason: "model replies could not be parsed".to_string(),
                });
                let forced = self.step.force_verdict(claim, evidence.entries()).await?;
                break forced_verdict(forced, &mut usage, Termination::Unparseable);
            };

            self.emit(claim, &evidence, ProgressKind::Decided {
                decision: decision.clone(),
            });

            match decision {
                Decision::Verdict(verdict) => {
                    break (verdict, outcome.response, Termination::Verdict);
                }
                Decision::Search(request) => {
                    self.run_search(claim, &mut evidence, &request.query).await;
                    usage.searches += 1;
                }
            }
        };

        let steps_taken = evidence.len();
        self.emit(claim, &evidence, ProgressKind::Finished {
            label: verdict.label,
            steps_taken,
        });
        info!(
            label = verdict.label,
            confidence = ?verdict.confidence,
            steps_taken,
            termination = ?termination,
            model_calls = usage.model_calls,
            "verification finished"
        );

        Ok(VerificationResult {
            claim: claim.clone(),
            label: verdict.label,
            confidence: verdict.confidence,
            rationale: verdict.rationale,
            response,
            evidence: evidence.into_entries(),
            steps_taken,
            termination,
            usage,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    async fn run_search(&self, claim: &Claim, evidence: &mut EvidenceStore, query: &str) {
        debug!(query = %query, "searching");

        let (recorded, kind) = match self.search.search(query).await {
            Ok(results) => {
                let result_count = results.len();
                (
                    evidence.record_results(query, results),
                    ProgressKind::Searched {
                        query: query.to_string(),
                        result_count,
                    },
                )
            }
            Err(error) => {
                warn!(query = %query, error = %error, "search failed, recording empty evidence");
                (
                    evidence.record_failure(query, error.to_string()),
                    ProgressKind::SearchFailed {
                        query: query.to_string(),
                        error: error.to_string(),
                    },
                )
            }
        };

        // The budget check before each decision keeps the store below capacity here
        if let Err(error) = recorded {
            warn!(error = %error, "evidence not recorded");
        }
        self.emit(claim, evidence, kind);
    }

    fn emit(&self, claim: &Claim, evidence: &EvidenceStore, kind: ProgressKind) {
        self.observer.on_event(&ProgressEvent {
            claim: claim.to_string(),
            step: evidence.len(),
            max_steps: self.max_steps,
            kind,
        });
    }
}

fn forced_verdict(
    outcome: StepOutcome<Verdict>,
    usage: &mut Usage,
    termination: Termination,
) -> (Verdict, String, Termination) {
    usage.tokens += outcome.usage;
    usage.model_calls += outcome.model_calls;

    let verdict = match outcome.parsed {
        Some(verdict) => Verdict {
            confidence: Some(
                verdict
                    .confidence
                    .map_or(FORCED_CONFIDENCE, |c| c.min(FORCED_CONFIDENCE)),
            ),
            ..verdict
        },
        None => {
            warn!("forced prompt produced no verdict, defaulting to unsupported");
            Verdict {
                label: false,
                confidence: Some(FORCED_CONFIDENCE),
                rationale: UNSUPPORTED_RATIONALE.to_string(),
            }
        }
    };

    (verdict, outcome.response, termination)
}

/// Verify a claim with clients built from configuration
///
/// # Errors
/// - `VerifyError::InvalidClaim` - the claim is empty
/// - `VerifyError::Configuration` - a client could not be built
/// - `VerifyError::Model` - the language model failed
pub async fn verify(
    claim: &str,
    model_config: &ModelConfig,
    search_config: &SearchConfig,
    max_steps: usize,
) -> Result<VerificationResult, VerifyError> {
    let claim = Claim::new(claim)?;
    let model = create_language_model(model_config)?;
    let search = create_search_client(search_config)?;

    let result = VerificationLoop::new(model, search, max_steps)
        .run(&claim)
        .await?;
    Ok(result)
}
