use crate::domain::errors::AnalysisFailure;
use crate::domain::models::{AnalysisContext, AnalysisOutcome};

/// Port for a persona's heuristics.
///
/// Implementations must be pure with respect to shared state: everything an
/// invocation needs arrives through the [`AnalysisContext`], and the runner
/// may call the same analyzer concurrently for different targets.
///
/// Outcomes should be built with [`AnalysisContext::outcome`], which starts
/// the score at 100 and only lowers it through finding severities. The
/// runner rejects outcomes whose score leaves [0, 100].
///
/// Closures with the matching signature are analyzers too:
///
/// ```
/// use conclave::domain::models::{AnalysisContext, Severity};
/// use conclave::domain::AnalysisFailure;
/// use conclave::domain::ports::Analyzer;
///
/// let analyzer = |ctx: &AnalysisContext| {
///     let mut outcome = ctx.outcome();
///     if ctx.target().raw_content.contains("TODO") {
///         outcome = outcome.finding(Severity::Low, "unfinished work");
///     }
///     Ok::<_, AnalysisFailure>(outcome.build())
/// };
/// # fn assert_analyzer(_: &impl Analyzer) {}
/// # assert_analyzer(&analyzer);
/// ```
pub trait Analyzer: Send + Sync {
    /// Analyze one target from one persona's viewpoint.
    fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure>;

    /// Short label used in persona listings.
    fn kind(&self) -> &str {
        "custom"
    }
}

impl<F> Analyzer for F
where
    F: Fn(&AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure> + Send + Sync,
{
    fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure> {
        self(ctx)
    }
}
