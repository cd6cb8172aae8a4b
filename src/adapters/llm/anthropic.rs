//! Anthropic Messages API client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{build_transport, require_api_key, secret_header, trim_base_url};
use crate::domain::errors::{ModelError, VerifyError};
use crate::domain::models::{ModelConfig, ModelProvider, TokenUsage};
use crate::domain::ports::{Completion, LanguageModelClient};
use crate::infrastructure::http::JsonHttpClient;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

/// Client for `POST /v1/messages`
pub struct AnthropicClient {
    transport: JsonHttpClient,
    endpoint: String,
    headers: HeaderMap,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(config: &ModelConfig) -> Result<Self, VerifyError> {
        let api_key = require_api_key(config)?;

        let mut headers = HeaderMap::new();
        let (name, value) = secret_header("x-api-key", &api_key)?;
        headers.insert(name, value);
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        Ok(Self {
            transport: build_transport(config)?,
            endpoint: format!("{}/v1/messages", trim_base_url(config.base_url())),
            headers,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModelClient for AnthropicClient {
    fn provider(&self) -> Option<ModelProvider> {
        Some(ModelProvider::Anthropic)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError> {
        let request = MessageRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response: MessageResponse = self
            .transport
            .post_json(&self.endpoint, &self.headers, &request)
            .await?;

        let text: String = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            return Err(ModelError::MalformedResponse(
                "Anthropic response contained no text content".to_string(),
            ));
        }

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();
        debug!(input_tokens = usage.input_tokens, output_tokens = usage.output_tokens, "completion received");

        Ok(Completion::new(text, usage))
    }
}
