use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Main configuration structure for firecheck
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Verification loop settings
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Language model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Web search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Verification loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifierConfig {
    /// Maximum number of searches before a verdict is forced
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

const fn default_max_steps() -> usize {
    5
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

/// Supported language model providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Anthropic,
    OpenAi,
    #[default]
    Gemini,
}

impl ModelProvider {
    pub const ALL: [Self; 3] = [Self::Anthropic, Self::OpenAi, Self::Gemini];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Environment variable consulted when no key is configured
    /// Model used when a provider is selected without naming a model
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.5-flash-lite",
        }
    }

    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(format!(
                "unknown model provider '{other}' (expected one of: anthropic, openai, gemini)"
            )),
        }
    }
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelConfig {
    /// Provider serving the model
    #[serde(default)]
    pub provider: ModelProvider,

    /// Model identifier understood by the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// API key (resolved from the provider's environment variable when unset)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the provider's base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_model_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry policy for transient failures
    #[serde(default)]
    pub retry: RetryConfig,

    /// Client-side rate limit
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_model() -> String {
    ModelProvider::default().default_model().to_string()
}

const fn default_temperature() -> f32 {
    0.5
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_model_timeout_secs() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ModelProvider::default(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            timeout_secs: default_model_timeout_secs(),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    /// Create config with explicit API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Create config with custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Supported search providers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProvider {
    #[default]
    Serper,
}

impl SearchProvider {
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::Serper => "https://google.serper.dev",
        }
    }

    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::Serper => "SERPER_API_KEY",
        }
    }
}

/// Kind of search to run against the provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Search,
    News,
    Places,
    Images,
}

impl SearchType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::News => "news",
            Self::Places => "places",
            Self::Images => "images",
        }
    }

    /// Key holding the ranked result list in the response body
    pub const fn result_key(self) -> &'static str {
        match self {
            Self::Search => "organic",
            Self::News => "news",
            Self::Places => "places",
            Self::Images => "images",
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProvider,

    /// API key (resolved from `SERPER_API_KEY` when unset)
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    /// Country code
    #[serde(default = "default_gl")]
    pub gl: String,

    /// Interface language
    #[serde(default = "default_hl")]
    pub hl: String,

    /// Number of ranked results kept per query
    #[serde(default = "default_num_results")]
    pub num_results: usize,

    #[serde(default)]
    pub search_type: SearchType,

    /// Time-based filter, e.g. `qdr:y`
    #[serde(default)]
    pub tbs: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_search_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_gl() -> String {
    "us".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

const fn default_num_results() -> usize {
    3
}

const fn default_search_timeout_secs() -> u64 {
    30
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProvider::default(),
            api_key: None,
            base_url: None,
            gl: default_gl(),
            hl: default_hl(),
            num_results: default_num_results(),
            search_type: SearchType::default(),
            tbs: None,
            timeout_secs: default_search_timeout_secs(),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl SearchConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
}

const fn default_requests_per_second() -> f64 {
    5.0
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}

/// Logging output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Rotation policy for file logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format for stderr output
    #[serde(default)]
    pub format: LogFormat,

    /// Directory for JSON log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("Anthropic".parse::<ModelProvider>(), Ok(ModelProvider::Anthropic));
        assert_eq!("google".parse::<ModelProvider>(), Ok(ModelProvider::Gemini));
        assert_eq!("openai".parse::<ModelProvider>(), Ok(ModelProvider::OpenAi));
        assert!("cohere".parse::<ModelProvider>().is_err());
    }

    #[test]
    fn test_provider_serde_names() {
        for provider in ModelProvider::ALL {
            let json = serde_json::to_string(&provider).unwrap();
            assert_eq!(json, format!("\"{}\"", provider.as_str()));
        }
    }

    #[test]
    fn test_base_url_override() {
        let config = ModelConfig::default();
        assert_eq!(
            config.base_url(),
            "https://generativelanguage.googleapis.com"
        );
        let config = config.with_base_url("http://localhost:9000");
        assert_eq!(config.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_search_type_result_keys() {
        assert_eq!(SearchType::Search.result_key(), "organic");
        assert_eq!(SearchType::News.result_key(), "news");
    }
}
