//! Configuration loading through files and `CONCLAVE_` environment overrides.

mod common;

use common::temp_dir;
use conclave::domain::models::{NotifierKind, Weighting};
use conclave::infrastructure::config::ConfigLoader;
use std::fs;

#[test]
fn test_env_overrides_defaults() {
    temp_env::with_vars(
        [
            ("CONCLAVE_WEIGHTING", Some("weighted")),
            ("CONCLAVE_LOGGING__LEVEL", Some("debug")),
            ("CONCLAVE_PHASE_CAPS__CRITICAL", Some("3")),
            ("CONCLAVE_RUNNER__MAX_CONCURRENCY", Some("2")),
        ],
        || {
            let config = ConfigLoader::load().expect("config loads");
            assert_eq!(config.weighting, Weighting::Weighted);
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.phase_caps.critical, Some(3));
            assert_eq!(config.phase_caps.high, None);
            assert_eq!(config.runner.max_concurrency, 2);
            assert_eq!(config.personas.len(), 4);
        },
    );
}

#[test]
fn test_webhook_url_from_env() {
    temp_env::with_vars(
        [
            ("CONCLAVE_NOTIFIER__KIND", Some("webhook")),
            ("CONCLAVE_NOTIFIER__URL", Some("https://hooks.example.com/T/B/token")),
        ],
        || {
            let config = ConfigLoader::load().expect("config loads");
            assert_eq!(config.notifier.kind, NotifierKind::Webhook);
            assert_eq!(
                config.notifier.url.as_deref(),
                Some("https://hooks.example.com/T/B/token")
            );
        },
    );
}

#[test]
fn test_webhook_without_url_is_rejected() {
    temp_env::with_vars(
        [
            ("CONCLAVE_NOTIFIER__KIND", Some("webhook")),
            ("CONCLAVE_NOTIFIER__URL", None::<&str>),
        ],
        || {
            let err = ConfigLoader::load().unwrap_err();
            assert!(err.to_string().contains("notifier.url"), "{err}");
        },
    );
}

#[test]
fn test_file_then_env_precedence() {
    let dir = temp_dir();
    let path = dir.path().join("conclave.yaml");
    fs::write(
        &path,
        r"
logging:
  level: warn
  format: json
report:
  max_summary_chars: 1200
personas:
  - id: docs
    name: Documentation
    analyzer:
      kind: structure
      max_lines: 300
correlation_rules: []
",
    )
    .unwrap();

    temp_env::with_vars([("CONCLAVE_LOGGING__LEVEL", Some("error"))], || {
        let config = ConfigLoader::load_from_file(&path).expect("config loads");
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.report.max_summary_chars, 1200);
        assert_eq!(config.personas.len(), 1);
        assert_eq!(config.personas[0].id, "docs");
        assert!(config.correlation_rules.is_empty());
    });
}

#[test]
fn test_invalid_env_value_is_rejected() {
    temp_env::with_vars([("CONCLAVE_LOGGING__FORMAT", Some("xml"))], || {
        assert!(ConfigLoader::load().is_err());
    });
}
