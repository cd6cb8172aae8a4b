//! Google Gemini `generateContent` client.

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
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

/// Client for `POST /v1beta/models/{model}:generateContent`
pub struct GeminiClient {
    transport: JsonHttpClient,
    endpoint: String,
    headers: HeaderMap,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> Result<Self, VerifyError> {
        let api_key = require_api_key(config)?;

        let mut headers = HeaderMap::new();
        let (name, value) = secret_header("x-goog-api-key", &api_key)?;
        headers.insert(name, value);

        Ok(Self {
            transport: build_transport(config)?,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                trim_base_url(config.base_url()),
                config.model
            ),
            headers,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

#[async_trait]
impl LanguageModelClient for GeminiClient {
    fn provider(&self) -> Option<ModelProvider> {
        Some(ModelProvider::Gemini)
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<Completion, ModelError> {
        let request = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let response: GenerateResponse = self
            .transport
            .post_json(&self.endpoint, &self.headers, &request)
            .await?;

        // Blocked prompts come back with no candidates or a candidate without content
        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ModelError::MalformedResponse(
                "Gemini response contained no candidate text".to_string(),
            ));
        }

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage::new(u.prompt_token_count, u.candidates_token_count))
            .unwrap_or_default();
        debug!(input_tokens = usage.input_tokens, output_tokens = usage.output_tokens, "completion received");

        Ok(Completion::new(text, usage))
    }
}
