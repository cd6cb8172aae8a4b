//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::batch::BatchArgs;
use super::commands::config::ConfigArgs;
use super::commands::verify::VerifyArgs;

#[derive(Parser, Debug)]
#[command(name = "firecheck")]
#[command(about = "firecheck - iterative search-and-verify fact checker", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file, used instead of .firecheck/config.yaml and .firecheck/local.yaml
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fact-check a single claim
    Verify(VerifyArgs),

    /// Evaluate a labelled JSONL dataset of claims
    Batch(BatchArgs),

    /// Configuration commands
    Config(ConfigArgs),
}
