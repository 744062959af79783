//! CLI argument parsing tests

use clap::Parser;
use conclave::cli::{Cli, Commands};
use conclave::domain::models::{Config, NotifierKind};
use std::path::PathBuf;

#[test]
fn test_assess_with_overrides() {
    let cli = Cli::try_parse_from([
        "conclave", "assess", "src", "lib.rs", "-o", "out/report.json", "--ext", "rs,py", "--no-notify",
        "--json",
    ])
    .unwrap();

    assert!(cli.json);
    let Commands::Assess(args) = cli.command else {
        panic!("expected assess");
    };
    assert_eq!(args.paths, vec![PathBuf::from("src"), PathBuf::from("lib.rs")]);
    assert_eq!(args.ext, vec!["rs", "py"]);

    let mut config = Config::default();
    args.apply(&mut config);
    assert_eq!(
        config.report.output_path,
        Some(PathBuf::from("out/report.json"))
    );
    assert_eq!(config.catalog.extensions, vec!["rs", "py"]);
    assert_eq!(config.notifier.kind, NotifierKind::Disabled);
}

#[test]
fn test_assess_requires_a_path() {
    assert!(Cli::try_parse_from(["conclave", "assess"]).is_err());
}

#[test]
fn test_apply_without_overrides_keeps_config() {
    let cli = Cli::try_parse_from(["conclave", "assess", "."]).unwrap();
    let Commands::Assess(args) = cli.command else {
        panic!("expected assess");
    };
    let mut config = Config::default();
    let extensions = config.catalog.extensions.clone();
    args.apply(&mut config);

    assert_eq!(config.catalog.extensions, extensions);
    assert_eq!(config.notifier.kind, NotifierKind::Log);
    assert_eq!(config.report.output_path, None);
}

#[test]
fn test_personas_with_global_config() {
    let cli = Cli::try_parse_from(["conclave", "personas", "--config", "custom.yaml"]).unwrap();
    assert!(matches!(cli.command, Commands::Personas));
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
}
