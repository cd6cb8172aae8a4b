//! Language model factory.

use std::sync::Arc;
use tracing::debug;

use super::anthropic::AnthropicClient;
use super::gemini::GeminiClient;
use super::openai::OpenAiClient;
use crate::domain::errors::VerifyError;
use crate::domain::models::{ModelConfig, ModelProvider};
use crate::domain::ports::LanguageModelClient;

/// Build the client for `config.provider`
pub fn create_language_model(
    config: &ModelConfig,
) -> Result<Arc<dyn LanguageModelClient>, VerifyError> {
    debug!(provider = %config.provider, model = %config.model, "creating language model client");

    let client: Arc<dyn LanguageModelClient> = match config.provider {
        ModelProvider::Anthropic => Arc::new(AnthropicClient::new(config)?),
        ModelProvider::OpenAi => Arc::new(OpenAiClient::new(config)?),
        ModelProvider::Gemini => Arc::new(GeminiClient::new(config)?),
    };
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_each_provider() {
        for provider in ModelProvider::ALL {
            let config = ModelConfig {
                provider,
                model: "test-model".to_string(),
                ..ModelConfig::default()
            }
            .with_api_key("test-key");

            let client = create_language_model(&config).unwrap();
            assert_eq!(client.provider(), Some(provider));
            assert_eq!(client.model_id(), "test-model");
        }
    }

    #[test]
    fn test_missing_key_is_configuration_error() {
        let config = ModelConfig::default();
        assert!(matches!(
            create_language_model(&config),
            Err(VerifyError::Configuration(_))
        ));
    }
}
