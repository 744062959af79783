use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::assessment::{PhaseCaps, ScoreThresholds, Weighting};
use super::builtin_personas::{default_correlation_rules, default_personas};
use super::correlation::CorrelationRule;
use super::finding::{Priority, Severity};
use super::outcome::SeverityDeductions;

/// Main configuration structure for Conclave
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Personas to register, in registration order
    #[serde(default = "default_personas")]
    pub personas: Vec<PersonaConfig>,

    /// Cross-persona correlation rules
    #[serde(default = "default_correlation_rules")]
    pub correlation_rules: Vec<CorrelationRule>,

    /// Per-phase display caps for prioritized recommendations
    #[serde(default)]
    pub phase_caps: PhaseCaps,

    /// Risk band thresholds
    #[serde(default)]
    pub score_thresholds: ScoreThresholds,

    /// uniform or weighted overall score
    #[serde(default)]
    pub weighting: Weighting,

    /// Severity deductions
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Assessment runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Target catalog limits
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Report output configuration
    #[serde(default)]
    pub report: ReportConfig,

    /// Notifier configuration
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            personas: default_personas(),
            correlation_rules: default_correlation_rules(),
            phase_caps: PhaseCaps::default(),
            score_thresholds: ScoreThresholds::default(),
            weighting: Weighting::default(),
            scoring: ScoringConfig::default(),
            runner: RunnerConfig::default(),
            catalog: CatalogConfig::default(),
            report: ReportConfig::default(),
            notifier: NotifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Persona definition plus the built-in analyzer it runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PersonaConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub focus_areas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    pub analyzer: AnalyzerConfig,
}

/// Built-in analyzer selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalyzerConfig {
    /// Ordered regex rules
    Patterns { rules: Vec<PatternRule> },
    /// Size and layout limits
    Structure(StructureLimits),
}

/// One regex heuristic. A matching rule yields one finding per target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PatternRule {
    pub pattern: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<RecommendationTemplate>,
    /// Only apply to targets with one of these extensions (empty = all)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

/// Recommendation emitted when a rule matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecommendationTemplate {
    pub priority: Priority,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation_hint: Option<String>,
}

/// Limits checked by the structure analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StructureLimits {
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Long lines tolerated before a finding is raised
    #[serde(default = "default_long_line_allowance")]
    pub long_line_allowance: usize,
    /// Regex for deferred-work markers
    #[serde(default = "default_marker_pattern")]
    pub marker_pattern: String,
    #[serde(default = "default_max_markers")]
    pub max_markers: usize,
    /// Maximum indentation depth, in levels of four spaces
    #[serde(default = "default_max_nesting")]
    pub max_nesting: usize,
}

const fn default_max_lines() -> usize {
    800
}

const fn default_max_line_length() -> usize {
    120
}

const fn default_long_line_allowance() -> usize {
    5
}

fn default_marker_pattern() -> String {
    r"\b(TODO|FIXME|HACK|XXX)\b".to_string()
}

const fn default_max_markers() -> usize {
    5
}

const fn default_max_nesting() -> usize {
    6
}

impl Default for StructureLimits {
    fn default() -> Self {
        Self {
            max_lines: default_max_lines(),
            max_line_length: default_max_line_length(),
            long_line_allowance: default_long_line_allowance(),
            marker_pattern: default_marker_pattern(),
            max_markers: default_max_markers(),
            max_nesting: default_max_nesting(),
        }
    }
}

/// Score deduction configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoringConfig {
    #[serde(default)]
    pub deductions: SeverityDeductions,
}

/// Assessment runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunnerConfig {
    /// Concurrent analyzer invocations (0 = number of available cores)
    #[serde(default)]
    pub max_concurrency: usize,

    /// Per-pair analysis timeout in milliseconds
    #[serde(default = "default_analysis_timeout_ms")]
    pub analysis_timeout_ms: u64,
}

const fn default_analysis_timeout_ms() -> u64 {
    10_000
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 0,
            analysis_timeout_ms: default_analysis_timeout_ms(),
        }
    }
}

impl RunnerConfig {
    pub fn effective_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            return self.max_concurrency;
        }
        std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
    }
}

/// Target catalog limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CatalogConfig {
    /// Targets larger than this are not analyzed
    #[serde(default = "default_max_target_bytes")]
    pub max_target_bytes: usize,

    /// Per-target load timeout in milliseconds
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    /// Extensions picked up when expanding directories (empty = all files)
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

const fn default_max_target_bytes() -> usize {
    1024 * 1024
}

const fn default_load_timeout_ms() -> u64 {
    5_000
}

fn default_extensions() -> Vec<String> {
    ["rs", "py", "js", "ts", "go", "java", "rb", "php", "sh", "sql", "yaml", "yml", "toml"]
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_target_bytes: default_max_target_bytes(),
            load_timeout_ms: default_load_timeout_ms(),
            extensions: default_extensions(),
        }
    }
}

/// Report output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ReportConfig {
    /// Where the structured document is written (not written when unset)
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    /// Recommendations listed per phase in the human summary
    #[serde(default = "default_summary_recommendations")]
    pub summary_recommendations_per_phase: usize,

    /// Correlation findings listed in the human summary
    #[serde(default = "default_summary_correlations")]
    pub summary_correlation_findings: usize,

    /// Hard cap on the human summary length, in characters
    #[serde(default = "default_max_summary_chars")]
    pub max_summary_chars: usize,
}

const fn default_summary_recommendations() -> usize {
    3
}

const fn default_summary_correlations() -> usize {
    5
}

const fn default_max_summary_chars() -> usize {
    3500
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_path: None,
            summary_recommendations_per_phase: default_summary_recommendations(),
            summary_correlation_findings: default_summary_correlations(),
            max_summary_chars: default_max_summary_chars(),
        }
    }
}

/// Which notifier delivers the human summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Disabled,
    #[default]
    Log,
    Webhook,
}

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NotifierConfig {
    #[serde(default)]
    pub kind: NotifierKind,

    /// Webhook endpoint; usually supplied through `CONCLAVE_NOTIFIER__URL`
    #[serde(default)]
    pub url: Option<String>,

    /// Delivery timeout in milliseconds
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_notify_timeout_ms() -> u64 {
    10_000
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: NotifierKind::default(),
            url: None,
            timeout_ms: default_notify_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}
