//! Shared helpers for integration tests.
#![allow(dead_code)]

use firecheck::domain::models::{ModelConfig, ModelProvider, RetryConfig, SearchConfig, SearchResult};

/// JSON verdict reply
pub fn verdict_reply(label: bool, confidence: f64) -> String {
    let answer = if label { "True" } else { "False" };
    serde_json::json!({
        "final_answer": answer,
        "confidence": confidence,
        "rationale": format!("The evidence says {answer}"),
    })
    .to_string()
}

/// JSON search reply
pub fn search_reply(query: &str) -> String {
    serde_json::json!({ "search_query": query }).to_string()
}

pub fn result(snippet: &str) -> SearchResult {
    SearchResult::new("Search Result", snippet, "https://example.com/page")
}

/// Retry policy fast enough for tests
pub fn fast_retry(max_retries: u32) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff_ms: 10,
        max_backoff_ms: 20,
    }
}

pub fn model_config(provider: ModelProvider, base_url: &str) -> ModelConfig {
    let mut config = ModelConfig {
        provider,
        model: provider.default_model().to_string(),
        retry: fast_retry(2),
        ..ModelConfig::default()
    }
    .with_api_key("test-api-key")
    .with_base_url(base_url);
    config.rate_limit.requests_per_second = 100.0;
    config
}

pub fn search_config(base_url: &str) -> SearchConfig {
    let mut config = SearchConfig {
        retry: fast_retry(2),
        ..SearchConfig::default()
    }
    .with_api_key("serper-test-key")
    .with_base_url(base_url);
    config.rate_limit.requests_per_second = 100.0;
    config
}
