//! Implementation of the `firecheck config` commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::scrub;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration with credentials redacted
    Show,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    pub config: Config,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config)
            .map(|yaml| scrub(yaml.trim_end()))
            .unwrap_or_else(|e| format!("failed to render configuration: {e}"))
    }
}

pub fn execute(args: ConfigArgs, config: Config, json_mode: bool) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::redacted(&config);
            output(&ConfigOutput { config }, json_mode);
        }
    }
    Ok(())
}
