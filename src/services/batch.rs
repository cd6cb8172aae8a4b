//! Dataset evaluation: verify many labelled claims and score the verdicts.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::verifier::VerificationLoop;
use crate::domain::models::{Claim, TokenUsage, VerificationResult};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid dataset record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    #[error("Failed to write results to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Gold label as written in a dataset: a boolean or a string such as `"True"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpectedLabel {
    Bool(bool),
    Text(String),
}

impl ExpectedLabel {
    /// `None` when the label is neither true nor false
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(text) => match text.trim().to_lowercase().as_str() {
                "true" | "supported" | "yes" => Some(true),
                "false" | "refuted" | "not supported" | "no" => Some(false),
                _ => None,
            },
        }
    }
}

/// One input line: `{"claim": "...", "label": "True"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub claim: String,
    pub label: ExpectedLabel,
}

/// One output line: the input plus either a result or an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub claim: String,
    pub label: ExpectedLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<VerificationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRecord {
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregate scores for a batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub failed: usize,
    /// Successful records whose label is true or false
    pub scored: usize,
    pub correct: usize,
    /// `correct / scored`, `None` when nothing was scored
    pub accuracy: Option<f64>,
    /// `(total - failed) / total`
    pub success_rate: Option<f64>,
    pub forced: usize,
    pub searches: u64,
    pub tokens: TokenUsage,
}

/// Read a JSONL dataset, skipping blank lines, keeping at most `limit` records
pub fn load_dataset(path: &Path, limit: Option<usize>) -> Result<Vec<DatasetRecord>, BatchError> {
    let file = File::open(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut records = Vec::new();
    for (index, line) in BufReader::new(file).lines().enumerate() {
        if limit.is_some_and(|limit| records.len() >= limit) {
            break;
        }

        let line = line.map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let record = serde_json::from_str(&line).map_err(|e| BatchError::InvalidRecord {
            line: index + 1,
            message: e.to_string(),
        })?;
        records.push(record);
    }

    Ok(records)
}

/// Verify every record, `concurrency` at a time, keeping input order
///
/// `on_record` is called as each record completes, in input order.
pub async fn run_batch<F>(
    verifier: &VerificationLoop,
    records: Vec<DatasetRecord>,
    concurrency: usize,
    mut on_record: F,
) -> Vec<BatchRecord>
where
    F: FnMut(&BatchRecord),
{
    info!(records = records.len(), concurrency, "starting batch evaluation");

    stream::iter(records)
        .map(|record| evaluate(verifier, record))
        .buffered(concurrency.max(1))
        .inspect(|record| on_record(record))
        .collect()
        .await
}

async fn evaluate(verifier: &VerificationLoop, record: DatasetRecord) -> BatchRecord {
    let outcome = match Claim::new(record.claim.as_str()) {
        Ok(claim) => verifier.run(&claim).await.map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };

    match outcome {
        Ok(result) => BatchRecord {
            correct: record.label.as_bool().map(|label| label == result.label),
            claim: record.claim,
            label: record.label,
            result: Some(result),
            error: None,
        },
        Err(error) => {
            warn!(claim = %record.claim, error = %error, "claim verification failed");
            BatchRecord {
                claim: record.claim,
                label: record.label,
                result: None,
                correct: None,
                error: Some(error),
            }
        }
    }
}

/// Score a finished batch
#[allow(clippy::cast_precision_loss)]
pub fn summarize(records: &[BatchRecord]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: records.len(),
        ..BatchSummary::default()
    };

    for record in records {
        if record.is_failed() {
            summary.failed += 1;
        }
        if let Some(correct) = record.correct {
            summary.scored += 1;
            if correct {
                summary.correct += 1;
            }
        }
        if let Some(result) = &record.result {
            summary.tokens += result.usage.tokens;
            summary.searches += u64::from(result.usage.searches);
            if result.is_low_confidence() {
                summary.forced += 1;
            }
        }
    }

    if summary.scored > 0 {
        summary.accuracy = Some(summary.correct as f64 / summary.scored as f64);
    }
    if summary.total > 0 {
        summary.success_rate =
            Some((summary.total - summary.failed) as f64 / summary.total as f64);
    }
    summary
}

/// Appends batch records to a JSONL file as they complete
///
/// Each record is flushed once written, so a run that stops early still
/// leaves every finished claim on disk.
pub struct ResultWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ResultWriter {
    /// Create (or truncate) the output file, creating parent directories
    pub fn create(path: &Path) -> Result<Self, BatchError> {
        let write_error = |source| BatchError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = File::create(path).map_err(write_error)?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one record as a line and flush it
    pub fn write(&mut self, record: &BatchRecord) -> Result<(), BatchError> {
        serde_json::to_writer(&mut self.writer, record).map_err(|e| self.write_error(e.into()))?;
        self.writer.write_all(b"\n").map_err(|e| self.write_error(e))?;
        self.writer.flush().map_err(|e| self.write_error(e))
    }

    pub fn finish(mut self) -> Result<(), BatchError> {
        self.writer.flush().map_err(|e| self.write_error(e))
    }

    fn write_error(&self, source: io::Error) -> BatchError {
        BatchError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Write records as JSONL
pub fn write_results(path: &Path, records: &[BatchRecord]) -> Result<(), BatchError> {
    let mut writer = ResultWriter::create(path)?;
    for record in records {
        writer.write(record)?;
    }
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_label_forms() {
        assert_eq!(ExpectedLabel::Bool(true).as_bool(), Some(true));
        assert_eq!(ExpectedLabel::Text("False".into()).as_bool(), Some(false));
        assert_eq!(ExpectedLabel::Text(" TRUE ".into()).as_bool(), Some(true));
        assert_eq!(ExpectedLabel::Text("unknown".into()).as_bool(), None);
    }

    #[test]
    fn test_dataset_record_parsing() {
        let record: DatasetRecord =
            serde_json::from_str(r#"{"claim": "Sky is blue", "label": true}"#).unwrap();
        assert_eq!(record.label, ExpectedLabel::Bool(true));

        let record: DatasetRecord =
            serde_json::from_str(r#"{"claim": "Sky is green", "label": "false"}"#).unwrap();
        assert_eq!(record.label.as_bool(), Some(false));
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.accuracy, None);
        assert_eq!(summary.success_rate, None);
    }
}
