use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::collections::HashSet;
use thiserror::Error;

use crate::domain::models::{Config, NotifierKind};

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid {0}: must be greater than 0")]
    ZeroLimit(&'static str),

    #[error("Webhook notifier requires notifier.url (or CONCLAVE_NOTIFIER__URL)")]
    MissingWebhookUrl,

    #[error("Duplicate persona id in configuration: {0}")]
    DuplicatePersonaId(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Built-in defaults
    /// 2. .conclave/config.yaml
    /// 3. .conclave/local.yaml (optional, untracked overrides)
    /// 4. Environment variables (`CONCLAVE_` prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".conclave/config.yaml"))
            .merge(Yaml::file(".conclave/local.yaml"))
            .merge(Env::prefixed("CONCLAVE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honoring env overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("CONCLAVE_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading.
    ///
    /// Checks shape and ranges only. Persona, weight and correlation checks
    /// that need compiled analyzers happen when the pipeline is built.
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.runner.analysis_timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("runner.analysis_timeout_ms"));
        }
        if config.catalog.load_timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("catalog.load_timeout_ms"));
        }
        if config.catalog.max_target_bytes == 0 {
            return Err(ConfigError::ZeroLimit("catalog.max_target_bytes"));
        }
        if config.notifier.timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("notifier.timeout_ms"));
        }
        if config.report.max_summary_chars == 0 {
            return Err(ConfigError::ZeroLimit("report.max_summary_chars"));
        }

        if config.notifier.kind == NotifierKind::Webhook
            && config.notifier.url.as_deref().is_none_or(|u| u.trim().is_empty())
        {
            return Err(ConfigError::MissingWebhookUrl);
        }

        if config.personas.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one persona must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for persona in &config.personas {
            if persona.id.trim().is_empty() {
                return Err(ConfigError::ValidationFailed(
                    "persona id cannot be empty".to_string(),
                ));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(ConfigError::DuplicatePersonaId(persona.id.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Weighting;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.personas.len(), 4);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
weighting: weighted
phase_caps:
  critical: 3
score_thresholds:
  low: 95
runner:
  max_concurrency: 2
logging:
  level: debug
  format: json
personas:
  - id: docs
    name: Documentation
    weight: 1.0
    analyzer:
      kind: structure
      max_lines: 300
correlation_rules: []
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.weighting, Weighting::Weighted);
        assert_eq!(config.phase_caps.critical, Some(3));
        assert_eq!(config.phase_caps.low, None);
        assert!((config.score_thresholds.low - 95.0).abs() < f64::EPSILON);
        assert!((config.score_thresholds.medium - 70.0).abs() < f64::EPSILON);
        assert_eq!(config.runner.max_concurrency, 2);
        assert_eq!(config.personas.len(), 1);
        assert_eq!(config.personas[0].weight, Some(1.0));
        assert!(config.correlation_rules.is_empty());

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidLogFormat(format) if format == "xml"
        ));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.runner.analysis_timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroLimit("runner.analysis_timeout_ms")
        ));

        let mut config = Config::default();
        config.notifier.timeout_ms = 0;
        assert!(ConfigLoader::validate(&config).is_err());
    }

    #[test]
    fn test_webhook_requires_url() {
        let mut config = Config::default();
        config.notifier.kind = NotifierKind::Webhook;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::MissingWebhookUrl
        ));

        config.notifier.url = Some("https://hooks.example.com/abc".to_string());
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_duplicate_persona_ids() {
        let mut config = Config::default();
        let first = config.personas[0].clone();
        config.personas.push(first);
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::DuplicatePersonaId(id) if id == "security"
        ));
    }

    #[test]
    fn test_project_file_then_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("config.yaml");
        let local = dir.path().join("local.yaml");
        std::fs::write(
            &project,
            "phase_caps:\n  critical: 5\nreport:\n  max_summary_chars: 2000\n  summary_correlation_findings: 2\n",
        )
        .unwrap();
        std::fs::write(&local, "phase_caps:\n  critical: 2\nreport:\n  max_summary_chars: 900\n").unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(&project))
            .merge(Yaml::file(&local))
            .extract()
            .unwrap();

        assert_eq!(config.phase_caps.critical, Some(2));
        assert_eq!(config.report.max_summary_chars, 900);
        assert_eq!(config.report.summary_correlation_findings, 2);
        assert_eq!(config.report.summary_recommendations_per_phase, 3);
        assert_eq!(config.personas.len(), 4);
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(ConfigLoader::load_from_file("/nonexistent/conclave.yaml").is_err());
    }
}
