//! Persona set shipped as the default configuration.
//!
//! These are heuristics, not analysis: each rule is a regex whose presence in
//! a target yields one finding. Projects override them in
//! `.conclave/config.yaml`.

use super::config::{AnalyzerConfig, PatternRule, PersonaConfig, RecommendationTemplate, StructureLimits};
use super::correlation::{CorrelationRule, ScoreCondition};
use super::finding::{Priority, Severity};

fn rule(pattern: &str, severity: Severity, description: &str) -> PatternRule {
    PatternRule {
        pattern: pattern.to_string(),
        severity,
        description: description.to_string(),
        suggested_action: None,
        recommendation: None,
        extensions: Vec::new(),
    }
}

impl PatternRule {
    fn action(mut self, action: &str) -> Self {
        self.suggested_action = Some(action.to_string());
        self
    }

    fn recommend(mut self, priority: Priority, description: &str, impact: &str) -> Self {
        self.recommendation = Some(RecommendationTemplate {
            priority,
            description: description.to_string(),
            expected_impact: Some(impact.to_string()),
            implementation_hint: None,
        });
        self
    }

    fn hint(mut self, hint: &str) -> Self {
        if let Some(rec) = self.recommendation.as_mut() {
            rec.implementation_hint = Some(hint.to_string());
        }
        self
    }

    fn only(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(ToString::to_string).collect();
        self
    }
}

fn security() -> PersonaConfig {
    PersonaConfig {
        id: "security".to_string(),
        name: "Security Auditor".to_string(),
        focus_areas: vec!["secrets".into(), "injection".into(), "transport".into()],
        weight: None,
        analyzer: AnalyzerConfig::Patterns {
            rules: vec![
                rule(
                    r#"(?i)(api[_-]?key|secret|passwd|password|token)\s*[:=]\s*["'][^"'\s]{8,}["']"#,
                    Severity::Critical,
                    "Credential literal embedded in source",
                )
                .action("Remove the literal and rotate the credential")
                .recommend(
                    Priority::Critical,
                    "Move credentials into injected configuration",
                    "Eliminates secret exposure through the repository",
                )
                .hint("Read the value from an environment variable at startup"),
                rule(
                    r"(?i)(verify\s*=\s*false|danger_accept_invalid_certs\s*\(\s*true|InsecureSkipVerify\s*:\s*true)",
                    Severity::Critical,
                    "TLS certificate verification disabled",
                )
                .recommend(
                    Priority::Critical,
                    "Re-enable certificate verification",
                    "Restores protection against interception",
                ),
                rule(
                    r"\b(eval|exec)\s*\(",
                    Severity::High,
                    "Dynamic code evaluation",
                )
                .action("Replace dynamic evaluation with explicit dispatch")
                .recommend(
                    Priority::High,
                    "Remove dynamic evaluation of runtime strings",
                    "Closes a code injection vector",
                ),
                rule(
                    r#"(?i)["'](select|insert|update|delete)\s[^"']*["']\s*(\+|%)"#,
                    Severity::High,
                    "SQL assembled by string concatenation",
                )
                .recommend(
                    Priority::High,
                    "Use parameterized queries",
                    "Prevents SQL injection",
                ),
                rule(
                    r"http://[a-zA-Z0-9]",
                    Severity::Medium,
                    "Plain HTTP endpoint",
                )
                .recommend(
                    Priority::Medium,
                    "Switch endpoints to HTTPS",
                    "Protects data in transit",
                ),
                rule(r"\bunsafe\s*\{", Severity::Medium, "Unsafe block")
                    .only(&["rs"])
                    .action("Document the invariant upheld by the unsafe block"),
            ],
        },
    }
}

fn performance() -> PersonaConfig {
    PersonaConfig {
        id: "performance".to_string(),
        name: "Performance Engineer".to_string(),
        focus_areas: vec!["latency".into(), "queries".into(), "allocation".into()],
        weight: None,
        analyzer: AnalyzerConfig::Patterns {
            rules: vec![
                rule(
                    r"(?i)\bfor\s[^{:]*[{:][^}]*\.(query|execute|fetch\w*)\s*\(",
                    Severity::High,
                    "Query issued inside a loop",
                )
                .recommend(
                    Priority::High,
                    "Batch queries instead of issuing one per iteration",
                    "Removes N+1 round trips",
                ),
                rule(
                    r"(?s)async\s+fn.*std::fs::",
                    Severity::Medium,
                    "Blocking filesystem call in async code",
                )
                .only(&["rs"])
                .recommend(
                    Priority::Medium,
                    "Use async filesystem APIs inside async functions",
                    "Keeps executor threads responsive",
                )
                .hint("tokio::fs offers drop-in replacements"),
                rule(
                    r"(?i)\b(thread::sleep|time\.sleep|Thread\.sleep)\s*\(",
                    Severity::Medium,
                    "Sleep in code path",
                )
                .action("Replace polling sleeps with notifications or timers"),
                rule(
                    r"(?i)select\s+\*\s+from",
                    Severity::Medium,
                    "Unbounded column selection",
                )
                .recommend(
                    Priority::Medium,
                    "Select only the columns that are used",
                    "Reduces I/O and memory per query",
                ),
                rule(
                    r"\.collect::<Vec<[^>]*>>\(\)\s*\.(iter|into_iter)\(\)",
                    Severity::Low,
                    "Intermediate collection immediately re-iterated",
                )
                .only(&["rs"])
                .recommend(
                    Priority::Low,
                    "Chain iterator adapters instead of collecting",
                    "Avoids a temporary allocation",
                ),
            ],
        },
    }
}

fn reliability() -> PersonaConfig {
    PersonaConfig {
        id: "reliability".to_string(),
        name: "Reliability Engineer".to_string(),
        focus_areas: vec!["error handling".into(), "failure modes".into()],
        weight: None,
        analyzer: AnalyzerConfig::Patterns {
            rules: vec![
                rule(
                    r"catch\s*(\([^)]*\))?\s*\{\s*\}",
                    Severity::High,
                    "Exception swallowed by empty catch block",
                )
                .recommend(
                    Priority::High,
                    "Handle or log caught exceptions",
                    "Failures become observable",
                ),
                rule(
                    r"(?m)^\s*except\s*:",
                    Severity::High,
                    "Bare except clause",
                )
                .only(&["py"])
                .recommend(
                    Priority::High,
                    "Catch specific exception types",
                    "Stops masking unrelated errors",
                ),
                rule(r"\.unwrap\(\)", Severity::Medium, "Unchecked unwrap")
                    .only(&["rs"])
                    .recommend(
                        Priority::Medium,
                        "Propagate errors with ? instead of unwrap",
                        "Turns crashes into recoverable errors",
                    ),
                rule(r"\bpanic!\s*\(", Severity::Medium, "Explicit panic")
                    .only(&["rs"]),
                rule(r#"\.expect\(""#, Severity::Low, "Expect with message")
                    .only(&["rs"]),
            ],
        },
    }
}

fn maintainability() -> PersonaConfig {
    PersonaConfig {
        id: "maintainability".to_string(),
        name: "Maintainability Reviewer".to_string(),
        focus_areas: vec!["size".into(), "readability".into(), "deferred work".into()],
        weight: None,
        analyzer: AnalyzerConfig::Structure(StructureLimits::default()),
    }
}

/// Personas registered when the configuration names none.
pub fn default_personas() -> Vec<PersonaConfig> {
    vec![security(), performance(), reliability(), maintainability()]
}

/// Correlation rules relating the default personas.
pub fn default_correlation_rules() -> Vec<CorrelationRule> {
    vec![
        CorrelationRule::new(
            "security",
            "reliability",
            ScoreCondition::ScoreGapAbove { threshold: 25.0 },
            "Security and reliability assessments diverge sharply",
        ),
        CorrelationRule::new(
            "security",
            "reliability",
            ScoreCondition::BothBelow { threshold: 60.0 },
            "Security and reliability are both weak; harden before adding features",
        ),
        CorrelationRule::new(
            "maintainability",
            "performance",
            ScoreCondition::BothBelow { threshold: 70.0 },
            "Hard-to-change code coincides with performance hot spots",
        ),
    ]
}
