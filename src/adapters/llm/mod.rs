//! Language model adapters.
//!
//! One HTTP client per [`ModelProvider`](crate::domain::models::ModelProvider)
//! plus a scripted mock for tests.

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use mock::ScriptedLanguageModel;
pub use openai::OpenAiClient;
pub use registry::create_language_model;

use reqwest::header::{HeaderName, HeaderValue};

use crate::domain::errors::VerifyError;
use crate::domain::models::ModelConfig;
use crate::infrastructure::http::JsonHttpClient;

/// API key from the config, or a configuration error naming the env variable
pub(crate) fn require_api_key(config: &ModelConfig) -> Result<String, VerifyError> {
    config
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| {
            VerifyError::Configuration(format!(
                "no API key for {} (set model.api_key or {})",
                config.provider,
                config.provider.api_key_env()
            ))
        })
}

pub(crate) fn build_transport(config: &ModelConfig) -> Result<JsonHttpClient, VerifyError> {
    JsonHttpClient::new(config.timeout_secs, &config.rate_limit, &config.retry)
        .map_err(|e| VerifyError::Configuration(e.to_string()))
}

/// Header pair carrying a secret, marked sensitive so it never shows in debug output
pub(crate) fn secret_header(
    name: &'static str,
    value: &str,
) -> Result<(HeaderName, HeaderValue), VerifyError> {
    let mut value = HeaderValue::from_str(value)
        .map_err(|_| VerifyError::Configuration(format!("invalid characters in {name} header")))?;
    value.set_sensitive(true);
    Ok((HeaderName::from_static(name), value))
}

pub(crate) fn trim_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ModelProvider;

    #[test]
    fn test_require_api_key_missing() {
        let config = ModelConfig {
            provider: ModelProvider::OpenAi,
            api_key: Some("   ".to_string()),
            ..ModelConfig::default()
        };

        let err = require_api_key(&config).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_secret_header_rejects_newlines() {
        assert!(secret_header("x-api-key", "abc\ndef").is_err());
        let (_, value) = secret_header("x-api-key", "abc").unwrap();
        assert!(value.is_sensitive());
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:8080/"), "http://localhost:8080");
    }
}
