//! firecheck CLI entry point.

use clap::Parser;

use firecheck::cli::{self, commands, Cli, Commands};
use firecheck::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => cli::handle_error(err, cli.json),
    };

    let logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Verify(args) => commands::verify::execute(args, config, cli.json).await,
        Commands::Batch(args) => commands::batch::execute(args, config, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, config, cli.json),
    };

    // Flush the file appender before a possible process::exit
    drop(logger);

    if let Err(err) = result {
        cli::handle_error(err, cli.json);
    }
}
