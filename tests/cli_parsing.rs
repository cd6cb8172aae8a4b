use std::path::PathBuf;

use clap::Parser;
use firecheck::cli::commands::config::ConfigCommands;
use firecheck::cli::{Cli, Commands};
use firecheck::domain::models::ModelProvider;

#[test]
fn test_parse_verify() {
    let cli = Cli::try_parse_from([
        "firecheck",
        "verify",
        "The Eiffel Tower is in Paris",
        "--max-steps",
        "3",
        "--provider",
        "openai",
        "--model",
        "gpt-4o",
    ])
    .unwrap();

    match cli.command {
        Commands::Verify(args) => {
            assert_eq!(args.claim, "The Eiffel Tower is in Paris");
            assert_eq!(args.max_steps, Some(3));
            assert_eq!(args.provider, Some(ModelProvider::OpenAi));
            assert_eq!(args.model.as_deref(), Some("gpt-4o"));
        }
        _ => panic!("Wrong top-level command"),
    }
    assert!(!cli.json);
}

#[test]
fn test_parse_verify_rejects_unknown_provider() {
    let result = Cli::try_parse_from(["firecheck", "verify", "claim", "--provider", "cohere"]);
    assert!(result.is_err());
}

#[test]
fn test_parse_batch_defaults() {
    let cli = Cli::try_parse_from([
        "firecheck",
        "batch",
        "--input",
        "data.jsonl",
    ])
    .unwrap();

    match cli.command {
        Commands::Batch(args) => {
            assert_eq!(args.input, PathBuf::from("data.jsonl"));
            assert_eq!(args.output, None);
            assert_eq!(args.concurrency, 1);
            assert_eq!(args.limit, None);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_batch_with_options() {
    let cli = Cli::try_parse_from([
        "firecheck",
        "batch",
        "-i",
        "data.jsonl",
        "-o",
        "out.jsonl",
        "--limit",
        "10",
        "--concurrency",
        "4",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    match cli.command {
        Commands::Batch(args) => {
            assert_eq!(args.output, Some(PathBuf::from("out.jsonl")));
            assert_eq!(args.limit, Some(10));
            assert_eq!(args.concurrency, 4);
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_config_show_with_global_flags() {
    let cli = Cli::try_parse_from(["firecheck", "config", "show", "--config", "custom.yaml", "--json"]).unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    match cli.command {
        Commands::Config(args) => assert!(matches!(args.command, ConfigCommands::Show)),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_verify_requires_claim() {
    assert!(Cli::try_parse_from(["firecheck", "verify"]).is_err());
}
