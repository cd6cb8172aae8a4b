//! Implementation of the `firecheck batch` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::adapters::llm::create_language_model;
use crate::adapters::search::create_search_client;
use crate::cli::apply_model_overrides;
use crate::cli::output::{create_progress_bar, key_value_table, output, CommandOutput, ProgressBarExt};
use crate::domain::models::{Config, ModelProvider};
use crate::services::batch::{self, BatchSummary, ResultWriter};
use crate::services::VerificationLoop;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSONL dataset with one `{"claim": ..., "label": ...}` object per line
    #[arg(long, short)]
    pub input: PathBuf,

    /// Where to write per-claim results as JSONL (defaults to `<input>.results.jsonl`)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Only evaluate the first N records
    #[arg(long, short)]
    pub limit: Option<usize>,

    /// Number of claims verified at once
    #[arg(long, short = 'n', default_value_t = 1)]
    pub concurrency: usize,

    /// Maximum number of searches per claim
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
pub struct BatchOutput {
    pub output_path: PathBuf,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

fn percent(ratio: Option<f64>) -> String {
    ratio.map_or_else(|| "n/a".to_string(), |r| format!("{:.1}%", r * 100.0))
}

impl CommandOutput for BatchOutput {
    fn to_human(&self) -> String {
        let s = &self.summary;
        let table = key_value_table(
            ("Metric", "Value"),
            [
                ("Total claims", s.total.to_string()),
                ("Failed claims", s.failed.to_string()),
                ("Success rate", percent(s.success_rate)),
                ("Scored", s.scored.to_string()),
                ("Correct", s.correct.to_string()),
                ("Accuracy", percent(s.accuracy)),
                ("Forced verdicts", s.forced.to_string()),
                ("Searches", s.searches.to_string()),
                ("Input tokens", s.tokens.input_tokens.to_string()),
                ("Output tokens", s.tokens.output_tokens.to_string()),
                ("Total tokens", s.tokens.total().to_string()),
            ],
        );
        format!("{table}\n\nResults saved to: {}", self.output_path.display())
    }
}

fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("results.jsonl")
}

pub async fn execute(args: BatchArgs, mut config: Config, json_mode: bool) -> Result<()> {
    apply_model_overrides(&mut config, args.provider, args.model);
    let max_steps = args.max_steps.unwrap_or(config.verifier.max_steps);
    let output_path = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));

    let records = batch::load_dataset(&args.input, args.limit)
        .with_context(|| format!("Failed to load dataset {}", args.input.display()))?;

    let model = create_language_model(&config.model).context("Failed to build language model client")?;
    let search = create_search_client(&config.search).context("Failed to build search client")?;
    let verifier = VerificationLoop::new(model, search, max_steps);

    let mut writer = ResultWriter::create(&output_path)
        .with_context(|| format!("Failed to open results file {}", output_path.display()))?;
    let mut write_failure = None;

    let progress = create_progress_bar(records.len() as u64, json_mode);
    progress.set_message("Verifying claims");
    let results = batch::run_batch(&verifier, records, args.concurrency, |record| {
        if record.is_failed() {
            progress.println(format!("✗ {}", record.claim));
        }
        if write_failure.is_none() {
            if let Err(e) = writer.write(record) {
                tracing::error!(error = %e, "failed to write batch record");
                write_failure = Some(e);
            }
        }
        progress.inc(1);
    })
    .await;

    let summary = batch::summarize(&results);
    progress.finish_success(format!("{} claim(s) verified", summary.total - summary.failed));

    if let Some(e) = write_failure {
        return Err(e).with_context(|| format!("Failed to write results {}", output_path.display()));
    }
    writer
        .finish()
        .with_context(|| format!("Failed to write results {}", output_path.display()))?;

    output(
        &BatchOutput {
            output_path,
            summary,
        },
        json_mode,
    );
    Ok(())
}
