mod common;

use std::fs;
use std::sync::Arc;

use common::{search_reply, verdict_reply};
use firecheck::adapters::llm::ScriptedLanguageModel;
use firecheck::adapters::search::ScriptedSearchClient;
use firecheck::domain::errors::ModelError;
use firecheck::services::batch::{self, BatchError, BatchRecord, ResultWriter};
use firecheck::services::VerificationLoop;
use tempfile::TempDir;

fn write_dataset(dir: &TempDir, lines: &[&str]) -> std::path::PathBuf {
    let path = dir.path().join("data.jsonl");
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[tokio::test]
async fn test_batch_scores_against_labels() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(
        &dir,
        &[
            r#"{"claim": "Paris is the capital of France", "label": "True"}"#,
            "",
            r#"{"claim": "The sun orbits the earth", "label": false}"#,
            r#"{"claim": "Unlabelled claim", "label": "unknown"}"#,
        ],
    );

    let records = batch::load_dataset(&input, None).unwrap();
    assert_eq!(records.len(), 3);

    // One search for the second claim, immediate verdicts otherwise
    let model = Arc::new(ScriptedLanguageModel::new([
        verdict_reply(true, 0.9),
        search_reply("does the sun orbit the earth"),
        verdict_reply(true, 0.6),
        verdict_reply(false, 0.5),
    ]));
    let verifier = VerificationLoop::new(model, Arc::new(ScriptedSearchClient::new()), 3);

    let mut seen = Vec::new();
    let results = batch::run_batch(&verifier, records, 1, |record| seen.push(record.claim.clone())).await;

    assert_eq!(seen.len(), 3);
    assert_eq!(results[0].correct, Some(true));
    assert_eq!(results[1].correct, Some(false));
    assert_eq!(results[2].correct, None);

    let summary = batch::summarize(&results);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.correct, 1);
    assert_eq!(summary.accuracy, Some(0.5));
    assert_eq!(summary.success_rate, Some(1.0));
    assert_eq!(summary.searches, 1);
    assert_eq!(summary.tokens.input_tokens, 400);
}

#[tokio::test]
async fn test_failed_claims_are_kept_with_error() {
    let model = Arc::new(ScriptedLanguageModel::from_results([
        Err(ModelError::Timeout("deadline".to_string())),
        Ok(verdict_reply(true, 0.9)),
    ]));
    let verifier = VerificationLoop::new(model, Arc::new(ScriptedSearchClient::new()), 3);
    let records = vec![
        serde_json::from_str(r#"{"claim": "first", "label": "True"}"#).unwrap(),
        serde_json::from_str(r#"{"claim": "second", "label": "True"}"#).unwrap(),
    ];

    let results = batch::run_batch(&verifier, records, 1, |_| {}).await;

    assert!(results[0].is_failed());
    assert!(results[0].result.is_none());
    assert!(results[0].error.as_deref().unwrap().contains("timed out"));
    assert_eq!(results[1].correct, Some(true));

    let summary = batch::summarize(&results);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.success_rate, Some(0.5));
    assert_eq!(summary.accuracy, Some(1.0));
}

#[tokio::test]
async fn test_concurrent_batch_keeps_input_order() {
    let model = Arc::new(ScriptedLanguageModel::repeating(verdict_reply(true, 0.8)));
    let verifier = VerificationLoop::new(model, Arc::new(ScriptedSearchClient::new()), 2);
    let records = (0..6)
        .map(|i| serde_json::from_value(serde_json::json!({ "claim": format!("claim {i}"), "label": true })).unwrap())
        .collect();

    let results = batch::run_batch(&verifier, records, 4, |_| {}).await;

    let claims: Vec<&str> = results.iter().map(|r| r.claim.as_str()).collect();
    assert_eq!(claims, vec!["claim 0", "claim 1", "claim 2", "claim 3", "claim 4", "claim 5"]);
}

#[test]
fn test_limit_and_invalid_lines() {
    let dir = TempDir::new().unwrap();
    let input = write_dataset(
        &dir,
        &[
            r#"{"claim": "a", "label": "True"}"#,
            r#"{"claim": "b", "label": "False"}"#,
            "not json",
        ],
    );

    assert_eq!(batch::load_dataset(&input, Some(2)).unwrap().len(), 2);

    let err = batch::load_dataset(&input, None).unwrap_err();
    assert!(matches!(err, BatchError::InvalidRecord { line: 3, .. }));
}

#[test]
fn test_missing_dataset_is_read_error() {
    let dir = TempDir::new().unwrap();
    let err = batch::load_dataset(&dir.path().join("missing.jsonl"), None).unwrap_err();
    assert!(matches!(err, BatchError::Read { .. }));
}

#[tokio::test]
async fn test_results_written_as_jsonl() {
    let dir = TempDir::new().unwrap();
    let model = Arc::new(ScriptedLanguageModel::repeating(verdict_reply(false, 0.7)));
    let verifier = VerificationLoop::new(model, Arc::new(ScriptedSearchClient::new()), 2);
    let records = vec![serde_json::from_str(r#"{"claim": "x", "label": "False"}"#).unwrap()];
    let results = batch::run_batch(&verifier, records, 1, |_| {}).await;

    let output = dir.path().join("nested").join("results.jsonl");
    batch::write_results(&output, &results).unwrap();

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 1);

    let record: BatchRecord = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record.claim, "x");
    assert_eq!(record.correct, Some(true));
    assert!(!record.result.unwrap().label);
}

#[tokio::test]
async fn test_results_are_on_disk_as_each_claim_completes() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out").join("results.jsonl");
    let mut writer = ResultWriter::create(&output).unwrap();
    assert!(output.exists());

    let model = Arc::new(ScriptedLanguageModel::from_results([
        Ok(verdict_reply(true, 0.9)),
        Err(ModelError::Timeout("deadline".to_string())),
        Ok(verdict_reply(false, 0.8)),
    ]));
    let verifier = VerificationLoop::new(model, Arc::new(ScriptedSearchClient::new()), 2);
    let records = (0..3)
        .map(|i| serde_json::from_value(serde_json::json!({ "claim": format!("claim {i}"), "label": true })).unwrap())
        .collect();

    let mut completed = 0;
    batch::run_batch(&verifier, records, 1, |record| {
        writer.write(record).unwrap();
        completed += 1;

        let on_disk = fs::read_to_string(writer.path()).unwrap();
        let lines: Vec<&str> = on_disk.lines().collect();
        assert_eq!(lines.len(), completed);
        let last: BatchRecord = serde_json::from_str(lines[completed - 1]).unwrap();
        assert_eq!(last.claim, record.claim);
    })
    .await;
    writer.finish().unwrap();

    assert_eq!(completed, 3);
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.lines().nth(1).unwrap().contains("\"error\""));
}

#[test]
fn test_unwritable_output_fails_before_any_claim_runs() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();

    let err = ResultWriter::create(&blocker.join("results.jsonl")).err().unwrap();
    assert!(matches!(err, BatchError::Write { .. }));
}
