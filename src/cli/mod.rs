//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

pub use types::{Cli, Commands};

use anyhow::Result;
use std::path::Path;

use crate::domain::models::{Config, ModelProvider};
use crate::infrastructure::config::ConfigLoader;

/// Load configuration from `path`, or from the project layers when `None`
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Apply command-line model selection on top of loaded configuration
///
/// Switching provider resets the model, base URL and API key to that
/// provider's defaults unless a model is given explicitly.
pub fn apply_model_overrides(
    config: &mut Config,
    provider: Option<ModelProvider>,
    model: Option<String>,
) {
    if let Some(provider) = provider.filter(|p| *p != config.model.provider) {
        config.model.provider = provider;
        config.model.model = provider.default_model().to_string();
        config.model.base_url = None;
        config.model.api_key = None;
        ConfigLoader::resolve_credentials(config);
    }
    if let Some(model) = model {
        config.model.model = model;
    }
}

/// Print the error chain and exit with status 1
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({ "error": err.to_string(), "causes": chain });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("{} {err:#}", console::style("error:").red().bold());
    }
    std::process::exit(1);
}
