use std::fs;

use firecheck::domain::models::{LogFormat, ModelProvider, SearchType};
use firecheck::infrastructure::config::ConfigLoader;
use tempfile::TempDir;

const CLEAR_KEYS: [(&str, Option<&str>); 4] = [
    ("ANTHROPIC_API_KEY", None),
    ("OPENAI_API_KEY", None),
    ("GOOGLE_API_KEY", None),
    ("SERPER_API_KEY", None),
];

fn with_clean_env<F: FnOnce()>(extra: &[(&str, Option<&str>)], f: F) {
    let mut vars: Vec<(&str, Option<&str>)> = CLEAR_KEYS.to_vec();
    vars.extend_from_slice(extra);
    temp_env::with_vars(vars, f);
}

#[test]
fn test_defaults_without_files() {
    let dir = TempDir::new().unwrap();

    with_clean_env(&[], || {
        let config = ConfigLoader::load_from_dir(dir.path()).unwrap();

        assert_eq!(config.verifier.max_steps, 5);
        assert_eq!(config.model.provider, ModelProvider::Gemini);
        assert_eq!(config.model.model, "gemini-2.5-flash-lite");
        assert!((config.model.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.model.max_tokens, 2048);
        assert_eq!(config.search.gl, "us");
        assert_eq!(config.search.num_results, 3);
        assert_eq!(config.search.search_type, SearchType::Search);
        assert_eq!(config.model.api_key, None);
    });
}

#[test]
fn test_local_overrides_project_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("config.yaml"),
        "verifier:\n  max_steps: 7\nmodel:\n  provider: anthropic\n  model: claude-3-5-haiku-latest\n",
    )
    .unwrap();
    fs::write(dir.path().join("local.yaml"), "verifier:\n  max_steps: 2\n").unwrap();

    with_clean_env(&[], || {
        let config = ConfigLoader::load_from_dir(dir.path()).unwrap();

        assert_eq!(config.verifier.max_steps, 2);
        assert_eq!(config.model.provider, ModelProvider::Anthropic);
        assert_eq!(config.model.model, "claude-3-5-haiku-latest");
    });
}

#[test]
fn test_environment_overrides_files() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.yaml"), "search:\n  num_results: 5\n").unwrap();

    with_clean_env(
        &[
            ("FIRECHECK_SEARCH__NUM_RESULTS", Some("8")),
            ("FIRECHECK_LOGGING__FORMAT", Some("json")),
        ],
        || {
            let config = ConfigLoader::load_from_dir(dir.path()).unwrap();

            assert_eq!(config.search.num_results, 8);
            assert_eq!(config.logging.format, LogFormat::Json);
        },
    );
}

#[test]
fn test_provider_keys_resolved_from_environment() {
    let dir = TempDir::new().unwrap();

    with_clean_env(
        &[
            ("GOOGLE_API_KEY", Some("google-key")),
            ("SERPER_API_KEY", Some("serper-key")),
        ],
        || {
            let config = ConfigLoader::load_from_dir(dir.path()).unwrap();

            assert_eq!(config.model.api_key.as_deref(), Some("google-key"));
            assert_eq!(config.search.api_key.as_deref(), Some("serper-key"));
        },
    );
}

#[test]
fn test_explicit_key_wins_over_environment() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("local.yaml"), "model:\n  api_key: file-key\n").unwrap();

    with_clean_env(&[("GOOGLE_API_KEY", Some("env-key"))], || {
        let config = ConfigLoader::load_from_dir(dir.path()).unwrap();
        assert_eq!(config.model.api_key.as_deref(), Some("file-key"));
    });
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.yaml"), "verifier:\n  max_steps: 0\n").unwrap();

    with_clean_env(&[], || {
        let err = ConfigLoader::load_from_dir(dir.path()).unwrap_err();
        assert!(err.to_string().contains("max_steps"));
    });
}

#[test]
fn test_single_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.yaml");
    fs::write(&path, "model:\n  provider: openai\n  model: gpt-4o-mini\n").unwrap();

    with_clean_env(&[], || {
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.model.provider, ModelProvider::OpenAi);
    });
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let result = ConfigLoader::load_from_file(dir.path().join("absent.yaml"));
    assert!(result.is_err());
}
