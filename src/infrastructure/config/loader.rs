use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::domain::models::config::Config;

/// Directory holding project-local configuration files
pub const CONFIG_DIR: &str = ".firecheck";

/// Prefix for environment overrides (`FIRECHECK_MODEL__PROVIDER=openai`)
pub const ENV_PREFIX: &str = "FIRECHECK_";

const REDACTED: &str = "[REDACTED]";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid max_steps: {0}. Must be between 1 and 20")]
    InvalidMaxSteps(usize),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid num_results: {0}. Must be between 1 and 20")]
    InvalidNumResults(usize),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),

    #[error("Invalid timeout: must be at least 1 second")]
    InvalidTimeout,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Model name cannot be empty")]
    EmptyModel,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .firecheck/config.yaml
    /// 3. .firecheck/local.yaml
    /// 4. Environment variables (FIRECHECK_* prefix)
    ///
    /// Missing API keys are then filled from the provider environment
    /// variables (`GOOGLE_API_KEY`, `SERPER_API_KEY`, ...).
    pub fn load() -> Result<Config> {
        Self::load_from_dir(CONFIG_DIR)
    }

    /// Same as [`ConfigLoader::load`] with the project files read from `dir`
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Config> {
        let dir = dir.as_ref();
        Self::load_layers(&[dir.join("config.yaml"), dir.join("local.yaml")])
    }

    /// Load defaults, a single YAML file and environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        Self::load_layers(&[path.to_path_buf()])
            .with_context(|| format!("Failed to load config from {}", path.display()))
    }

    fn load_layers(files: &[PathBuf]) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        for file in files {
            debug!(path = %file.display(), exists = file.exists(), "merging config file");
            figment = figment.merge(Yaml::file(file));
        }

        let mut config: Config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::resolve_credentials(&mut config);
        Self::validate(&config)?;
        Ok(config)
    }

    /// Fill unset API keys from the provider-specific environment variables
    pub fn resolve_credentials(config: &mut Config) {
        if is_unset(config.model.api_key.as_deref()) {
            config.model.api_key = read_env(config.model.provider.api_key_env());
        }
        if is_unset(config.search.api_key.as_deref()) {
            config.search.api_key = read_env(config.search.provider.api_key_env());
        }
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let max_steps = config.verifier.max_steps;
        if max_steps == 0 || max_steps > 20 {
            return Err(ConfigError::InvalidMaxSteps(max_steps));
        }

        let model = &config.model;
        if model.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel);
        }
        if !(0.0..=2.0).contains(&model.temperature) {
            return Err(ConfigError::InvalidTemperature(model.temperature));
        }
        if model.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(model.max_tokens));
        }

        let num_results = config.search.num_results;
        if num_results == 0 || num_results > 20 {
            return Err(ConfigError::InvalidNumResults(num_results));
        }

        if model.timeout_secs == 0 || config.search.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        for rate_limit in [&model.rate_limit, &config.search.rate_limit] {
            let rps = rate_limit.requests_per_second;
            if !rps.is_finite() || rps <= 0.0 {
                return Err(ConfigError::InvalidRateLimit(rps));
            }
        }

        for retry in [&model.retry, &config.search.retry] {
            if retry.max_retries == 0 {
                return Err(ConfigError::InvalidMaxRetries(retry.max_retries));
            }
            if retry.initial_backoff_ms > retry.max_backoff_ms {
                return Err(ConfigError::InvalidBackoff(
                    retry.initial_backoff_ms,
                    retry.max_backoff_ms,
                ));
            }
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }

    /// Copy of `config` safe to print: API keys replaced by a marker
    pub fn redacted(config: &Config) -> Config {
        let mut shown = config.clone();
        if shown.model.api_key.is_some() {
            shown.model.api_key = Some(REDACTED.to_string());
        }
        if shown.search.api_key.is_some() {
            shown.search.api_key = Some(REDACTED.to_string());
        }
        shown
    }
}

fn is_unset(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, ModelProvider};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert_eq!(config.verifier.max_steps, 5);
        assert_eq!(config.model.model, "gemini-2.5-flash-lite");
        assert_eq!(config.search.num_results, 3);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
verifier:
  max_steps: 8
model:
  provider: openai
  model: gpt-4o-mini
  temperature: 0.2
search:
  num_results: 5
  gl: de
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.verifier.max_steps, 8);
        assert_eq!(config.model.provider, ModelProvider::OpenAi);
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert!((config.model.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(config.model.max_tokens, 2048);
        assert_eq!(config.search.num_results, 5);
        assert_eq!(config.search.gl, "de");
        assert_eq!(config.search.hl, "en");
        assert_eq!(config.logging.format, LogFormat::Json);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_max_steps_bounds() {
        for steps in [0, 21] {
            let mut config = Config::default();
            config.verifier.max_steps = steps;
            assert_eq!(
                ConfigLoader::validate(&config),
                Err(ConfigError::InvalidMaxSteps(steps))
            );
        }
    }

    #[test]
    fn test_validate_temperature() {
        let mut config = Config::default();
        config.model.temperature = 2.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn test_validate_zero_max_tokens() {
        let mut config = Config::default();
        config.model.max_tokens = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxTokens(0))
        );
    }

    #[test]
    fn test_validate_num_results() {
        let mut config = Config::default();
        config.search.num_results = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidNumResults(0))
        );
    }

    #[test]
    fn test_validate_zero_rate_limit() {
        let mut config = Config::default();
        config.search.rate_limit.requests_per_second = 0.0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRateLimit(_))
        ));
    }

    #[test]
    fn test_validate_zero_max_retries() {
        let mut config = Config::default();
        config.model.retry.max_retries = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxRetries(0))
        );
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.search.retry.initial_backoff_ms = 30_000;
        config.search.retry.max_backoff_ms = 10_000;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(30_000, 10_000))
        );
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "verbose"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_hierarchical_merging() {
        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "verifier:\n  max_steps: 4\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "verifier:\n  max_steps: 7\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.verifier.max_steps, 7, "Override should win");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.logging.format,
            LogFormat::Json,
            "Base value should persist when not overridden"
        );
    }

    #[test]
    fn test_redacted_hides_keys() {
        let mut config = Config::default();
        config.model.api_key = Some("AIzaSyTopSecretValue".to_string());

        let shown = ConfigLoader::redacted(&config);

        assert_eq!(shown.model.api_key.as_deref(), Some(REDACTED));
        assert_eq!(shown.search.api_key, None);
    }

    #[test]
    fn test_is_unset() {
        assert!(is_unset(None));
        assert!(is_unset(Some("  ")));
        assert!(!is_unset(Some("key")));
    }
}
