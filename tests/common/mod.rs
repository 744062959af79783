//! Common test utilities for integration tests
//!
//! Scripted analyzers and notifiers that pin exact scores, failures and
//! delivery results so pipeline tests can assert on numbers.

#![allow(dead_code)]

use async_trait::async_trait;
use conclave::domain::errors::AnalysisFailure;
use conclave::domain::models::{AnalysisContext, AnalysisOutcome, Persona, Priority, Severity};
use conclave::domain::ports::{Analyzer, NotificationOutcome, Notifier};
use conclave::services::PersonaRegistry;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// What a scripted analyzer does for one target.
#[derive(Debug, Clone)]
pub enum Script {
    Findings(Vec<Severity>),
    Recommend(Vec<(Priority, String)>),
    Fail(String),
    Panic,
}

/// Analyzer whose behavior per target id is fixed up front. Targets with no
/// script score 100.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnalyzer {
    scripts: HashMap<String, Script>,
}

impl ScriptedAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, target_id: &str, script: Script) -> Self {
        self.scripts.insert(target_id.to_string(), script);
        self
    }
}

impl Analyzer for ScriptedAnalyzer {
    fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure> {
        let mut outcome = ctx.outcome();
        match self.scripts.get(&ctx.target().id) {
            None => {}
            Some(Script::Findings(severities)) => {
                for severity in severities {
                    outcome = outcome.finding(*severity, format!("{severity} issue"));
                }
            }
            Some(Script::Recommend(recs)) => {
                for (priority, description) in recs {
                    outcome = outcome.recommend(*priority, description.clone());
                }
            }
            Some(Script::Fail(reason)) => return Err(AnalysisFailure::new(reason.clone())),
            Some(Script::Panic) => panic!("scripted analyzer panic"),
        }
        Ok(outcome.build())
    }

    fn kind(&self) -> &str {
        "scripted"
    }
}

/// Registry of scripted personas, in the given order.
pub fn registry(personas: Vec<(Persona, ScriptedAnalyzer)>) -> PersonaRegistry {
    let mut registry = PersonaRegistry::new();
    for (persona, analyzer) in personas {
        registry.register(persona, analyzer).expect("unique persona ids");
    }
    registry
}

/// Notifier that records every text it is asked to send.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail_with: Option<String>,
    delay: Option<Duration>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("notifier lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> NotificationOutcome {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent
            .lock()
            .expect("notifier lock")
            .push(text.to_string());
        match &self.fail_with {
            Some(reason) => NotificationOutcome::failed(reason.clone()),
            None => NotificationOutcome::delivered(),
        }
    }
}
