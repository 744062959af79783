//! Assessment runner.
//!
//! Executes every registered analyzer against every cataloged target on a
//! bounded worker pool. Each (persona, target) pair is isolated: a failure,
//! timeout, or panic becomes a recorded skip for that pair and the run goes
//! on. Results are stored by pair index, so the returned order is always
//! personas in registration order, then targets in catalog order, no matter
//! which job finishes first.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::errors::AssessmentError;
use crate::domain::models::{
    AnalysisContext, AnalysisOutcome, Config, PairResult, SeverityDeductions, SkipReason,
    SkippedPair,
};
use crate::domain::ports::Analyzer;
use crate::services::persona_registry::PersonaRegistry;
use crate::services::target_catalog::{CatalogEntry, TargetCatalog};

/// Runner configuration resolved from [`Config`].
#[derive(Debug, Clone, Copy)]
pub struct RunnerSettings {
    pub max_concurrency: usize,
    pub analysis_timeout: Duration,
    pub deductions: SeverityDeductions,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl RunnerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrency: config.runner.effective_concurrency(),
            analysis_timeout: Duration::from_millis(config.runner.analysis_timeout_ms),
            deductions: config.scoring.deductions,
        }
    }
}

/// Every pair result of one run.
#[derive(Debug, Clone, Default)]
pub struct AssessmentRun {
    /// One entry per (persona, target) pair, persona-major
    pub results: Vec<PairResult>,
    /// Whether cancellation stopped dispatch before every pair ran
    pub cancelled: bool,
}

impl AssessmentRun {
    pub fn outcomes(&self) -> impl Iterator<Item = &AnalysisOutcome> {
        self.results.iter().filter_map(PairResult::outcome)
    }

    pub fn skips(&self) -> impl Iterator<Item = &SkippedPair> {
        self.results.iter().filter_map(PairResult::skipped)
    }

    pub fn results_for<'a>(&'a self, persona_id: &'a str) -> impl Iterator<Item = &'a PairResult> {
        self.results
            .iter()
            .filter(move |r| r.persona_id() == persona_id)
    }

    pub fn completed_count(&self) -> usize {
        self.outcomes().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.skips().count()
    }
}

enum Slot {
    Ready(PairResult),
    Pending {
        persona_id: String,
        target_id: String,
        handle: JoinHandle<PairResult>,
    },
}

/// Runs analyzers over targets.
#[derive(Debug, Clone)]
pub struct AssessmentRunner {
    registry: Arc<PersonaRegistry>,
    settings: RunnerSettings,
}

impl AssessmentRunner {
    pub const fn new(registry: Arc<PersonaRegistry>, settings: RunnerSettings) -> Self {
        Self { registry, settings }
    }

    /// Evaluate every (persona, target) pair.
    ///
    /// `cancel` is checked before each pair is dispatched. Once it fires,
    /// jobs already running are awaited and every remaining pair is
    /// recorded as a cancelled skip.
    #[instrument(skip_all, fields(
        personas = self.registry.len(),
        targets = catalog.len(),
        concurrency = self.settings.max_concurrency
    ))]
    pub async fn run(&self, catalog: &TargetCatalog, cancel: &CancellationToken) -> AssessmentRun {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrency.max(1)));
        let mut slots = Vec::with_capacity(self.registry.len() * catalog.len());
        let mut cancelled = false;

        for registered in self.registry.all() {
            let persona_id = &registered.persona.id;

            for entry in catalog.entries() {
                let target_id = entry.id();

                if !cancelled && cancel.is_cancelled() {
                    cancelled = true;
                    info!("Cancellation requested, remaining pairs will be skipped");
                }
                if cancelled {
                    slots.push(Slot::Ready(skip(persona_id, target_id, SkipReason::Cancelled)));
                    continue;
                }

                let target = match entry {
                    CatalogEntry::Available(target) => Arc::clone(target),
                    CatalogEntry::Unavailable { reason, .. } => {
                        slots.push(Slot::Ready(skip(
                            persona_id,
                            target_id,
                            SkipReason::TargetUnavailable(reason.clone()),
                        )));
                        continue;
                    }
                    CatalogEntry::Oversized {
                        size_bytes, limit, ..
                    } => {
                        slots.push(Slot::Ready(skip(
                            persona_id,
                            target_id,
                            SkipReason::AnalysisFailed(format!(
                                "content of {size_bytes} bytes exceeds limit of {limit}"
                            )),
                        )));
                        continue;
                    }
                };

                let permit = tokio::select! {
                    biased;
                    () = cancel.cancelled() => None,
                    permit = Arc::clone(&semaphore).acquire_owned() => Some(permit),
                };

                let permit = match permit {
                    Some(Ok(permit)) => permit,
                    Some(Err(e)) => {
                        slots.push(Slot::Ready(skip(
                            persona_id,
                            target_id,
                            SkipReason::AnalysisFailed(format!("worker pool unavailable: {e}")),
                        )));
                        continue;
                    }
                    None => {
                        cancelled = true;
                        info!("Cancellation requested, remaining pairs will be skipped");
                        slots.push(Slot::Ready(skip(persona_id, target_id, SkipReason::Cancelled)));
                        continue;
                    }
                };

                let ctx = AnalysisContext::new(
                    Arc::clone(&registered.persona),
                    target,
                    self.settings.deductions,
                );
                let analyzer = Arc::clone(&registered.analyzer);
                let timeout = self.settings.analysis_timeout;

                debug!(persona_id = %persona_id, target_id = %target_id, "Dispatching analysis");
                let handle = tokio::spawn(async move {
                    let _permit = permit;
                    run_pair(analyzer, ctx, timeout).await
                });

                slots.push(Slot::Pending {
                    persona_id: persona_id.clone(),
                    target_id: target_id.to_string(),
                    handle,
                });
            }
        }

        let mut results = Vec::with_capacity(slots.len());
        for slot in slots {
            let result = match slot {
                Slot::Ready(result) => result,
                Slot::Pending {
                    persona_id,
                    target_id,
                    handle,
                } => match handle.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!(persona_id = %persona_id, target_id = %target_id, error = %e, "Analysis job aborted");
                        skip(
                            &persona_id,
                            &target_id,
                            SkipReason::AnalysisFailed(format!("analysis job aborted: {e}")),
                        )
                    }
                },
            };
            results.push(result);
        }

        let run = AssessmentRun { results, cancelled };
        info!(
            completed = run.completed_count(),
            skipped = run.skipped_count(),
            cancelled = run.cancelled,
            "Assessment run finished"
        );
        run
    }
}

fn skip(persona_id: &str, target_id: &str, reason: SkipReason) -> PairResult {
    PairResult::Skipped(SkippedPair {
        persona_id: persona_id.to_string(),
        target_id: target_id.to_string(),
        reason,
    })
}

/// Run one analyzer on the blocking pool under a timeout and enforce the
/// outcome contract.
async fn run_pair(analyzer: Arc<dyn Analyzer>, ctx: AnalysisContext, timeout: Duration) -> PairResult {
    let job_ctx = ctx.clone();
    let job = tokio::task::spawn_blocking(move || analyzer.analyze(&job_ctx));

    let reason = match tokio::time::timeout(timeout, job).await {
        Ok(Ok(Ok(outcome))) => match outcome.check_contract(&ctx) {
            Ok(()) => return PairResult::Completed(outcome),
            Err(violation) => {
                error!(
                    persona_id = %ctx.persona().id,
                    target_id = %ctx.target().id,
                    violation = %violation,
                    "Analyzer broke the outcome contract"
                );
                format!("contract violation: {violation}")
            }
        },
        Ok(Ok(Err(failure))) => failure.reason,
        Ok(Err(join_error)) if join_error.is_panic() => "analyzer panicked".to_string(),
        Ok(Err(join_error)) => format!("analysis task did not complete: {join_error}"),
        Err(_) => format!("analysis exceeded {}ms", timeout.as_millis()),
    };

    let error = AssessmentError::AnalysisFailed {
        persona_id: ctx.persona().id.clone(),
        target_id: ctx.target().id.clone(),
        reason: reason.clone(),
    };
    warn!(error = %error, "Pair skipped");

    skip(&ctx.persona().id, &ctx.target().id, SkipReason::AnalysisFailed(reason))
}
