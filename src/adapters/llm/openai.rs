//! OpenAI Chat Completions client.

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{build_transport, require_api_key, secret_header, trim_base_url};
use crate::domain::errors::{ModelError, VerifyError};
use crate::domain::models::{ModelConfig, ModelProvider, TokenUsage};
use crate::domain::ports::{Completion, LanguageModelClient};
use crate::infrastructure::http::JsonHttpClient;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Client for `POST /v1/chat/completions`
pub struct OpenAiClient {
    transport: JsonHttpClient,
    endpoint: String,
    headers: HeaderMap,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, VerifyError> {
        let api_key = require_api_key(config)?;

        let mut headers = HeaderMap::new();
        let (name, value) = secret_header("authorization", &format!("Bearer {api_key}"))?;
        headers.insert(name, value);

        Ok(Self {
            transport: build_transport(config)?,
            endpoint: format!("{}/v1/chat/completions", trim_base_url(config.base_url())),
            headers,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModelClient for OpenAiClient {
    fn provider(&self) -> Option<ModelProvider> {
        Some(ModelProvider::OpenAi)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response: ChatResponse = self
            .transport
            .post_json(&self.endpoint, &self.headers, &request)
            .await?;

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ModelError::MalformedResponse("OpenAI response contained no message content".to_string())
            })?;

        let usage = response
            .usage
            .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();
        debug!(input_tokens = usage.input_tokens, output_tokens = usage.output_tokens, "completion received");

        Ok(Completion::new(text, usage))
    }
}
