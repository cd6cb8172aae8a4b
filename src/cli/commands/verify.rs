//! Implementation of the `firecheck verify` command.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::sync::Arc;

use crate::adapters::llm::create_language_model;
use crate::adapters::search::create_search_client;
use crate::cli::apply_model_overrides;
use crate::cli::output::{create_spinner, output, truncate, CommandOutput, ProgressBarExt};
use crate::domain::models::{Claim, Config, ModelProvider, ProgressEvent, ProgressKind, VerificationResult};
use crate::services::VerificationLoop;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The atomic claim to fact-check
    pub claim: String,

    /// Maximum number of searches before a verdict is forced
    #[arg(long, short = 's')]
    pub max_steps: Option<usize>,

    /// Language model provider (anthropic, openai, gemini)
    #[arg(long, short)]
    pub provider: Option<ModelProvider>,

    /// Model identifier, overriding the configured one
    #[arg(long, short)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct VerifyOutput {
    pub result: VerificationResult,
}

impl CommandOutput for VerifyOutput {
    #[allow(clippy::cast_precision_loss)]
    fn to_human(&self) -> String {
        let result = &self.result;
        let answer = if result.label {
            style(result.answer()).green().bold()
        } else {
            style(result.answer()).red().bold()
        };

        let mut lines = vec![format!("Claim:      {}", result.claim), format!("Verdict:    {answer}")];
        if let Some(confidence) = result.confidence {
            lines.push(format!("Confidence: {confidence:.2}"));
        }
        if result.is_low_confidence() {
            lines.push(format!(
                "            {}",
                style("(forced verdict, low confidence)").yellow()
            ));
        }
        lines.push(format!("Rationale:  {}", result.rationale));

        if !result.evidence.is_empty() {
            lines.push(String::new());
            lines.push("Searches:".to_string());
            for (i, entry) in result.evidence.iter().enumerate() {
                let outcome = if entry.is_failed() {
                    style("no results".to_string()).dim()
                } else {
                    style(format!("{} result(s)", entry.results.len())).dim()
                };
                lines.push(format!("  [{}] {} {outcome}", i + 1, truncate(&entry.query, 80)));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "{} step(s), {} model call(s), {} tokens, {:.1}s",
            result.steps_taken,
            result.usage.model_calls,
            result.usage.tokens.total(),
            result.elapsed_ms as f64 / 1000.0
        ));
        lines.join("\n")
    }
}

pub async fn execute(args: VerifyArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_model_overrides(&mut config, args.provider, args.model);
    let max_steps = args.max_steps.unwrap_or(config.verifier.max_steps);

    let claim = Claim::new(args.claim).context("Invalid claim")?;
    let model = create_language_model(&config.model).context("Failed to build language model client")?;
    let search = create_search_client(&config.search).context("Failed to build search client")?;

    let spinner = create_spinner(json_mode);
    spinner.set_message("Verifying claim");
    let observer = {
        let spinner = spinner.clone();
        move |event: &ProgressEvent| spinner.set_message(describe(event))
    };

    let verifier = VerificationLoop::new(model, search, max_steps).with_observer(Arc::new(observer));
    let result = match verifier.run(&claim).await {
        Ok(result) => result,
        Err(e) => {
            spinner.finish_error("Verification failed");
            return Err(e).context("Verification failed");
        }
    };

    if result.is_low_confidence() {
        spinner.finish_warning(format!("Verdict forced after {} step(s)", result.steps_taken));
    } else {
        spinner.finish_success(format!("Verdict after {} step(s)", result.steps_taken));
    }

    output(&VerifyOutput { result }, json_mode);
    Ok(())
}

fn describe(event: &ProgressEvent) -> String {
    let step = format!("[{}/{}]", event.step, event.max_steps);
    match &event.kind {
        ProgressKind::Deciding => format!("{step} Deciding next action"),
        ProgressKind::Decided { decision } if decision.is_verdict() => format!("{step} Verdict reached"),
        ProgressKind::Decided { .. } => format!("{step} Searching"),
        ProgressKind::Searched { query, result_count } => {
            format!("{step} {} ({result_count} result(s))", truncate(query, 60))
        }
        ProgressKind::SearchFailed { query, .. } => format!("{step} {} (no results)", truncate(query, 60)),
        ProgressKind::Forcing { reason } => format!("{step} Forcing verdict: {reason}"),
        ProgressKind::Finished { label, .. } => {
            format!("{step} Finished: {}", if *label { "TRUE" } else { "FALSE" })
        }
    }
}
