//! Recommendation prioritization into remediation phases.

use tracing::info;

use crate::domain::models::{PhaseCaps, PrioritizedPhase, Priority, Recommendation};

/// Buckets recommendations into the fixed phase order critical, high,
/// medium, low.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationPrioritizer {
    caps: PhaseCaps,
}

impl RecommendationPrioritizer {
    pub const fn new(caps: PhaseCaps) -> Self {
        Self { caps }
    }

    /// Group `recommendations` by priority.
    ///
    /// Input order is the tie-break: callers pass recommendations in
    /// persona registration order, then target order, then emission order.
    /// All four phases are always returned.
    pub fn prioritize<'a>(
        &self,
        recommendations: impl IntoIterator<Item = &'a Recommendation>,
    ) -> Vec<PrioritizedPhase> {
        let mut buckets: [Vec<Recommendation>; 4] = Default::default();
        for rec in recommendations {
            buckets[bucket_index(rec.priority)].push(rec.clone());
        }

        Priority::ALL
            .iter()
            .zip(buckets)
            .map(|(&phase, mut recommendations)| {
                let total_count = recommendations.len();
                let truncated_count = match self.caps.cap_for(phase) {
                    Some(cap) if total_count > cap => {
                        recommendations.truncate(cap);
                        total_count - cap
                    }
                    _ => 0,
                };

                if truncated_count > 0 {
                    info!(
                        phase = %phase,
                        kept = recommendations.len(),
                        dropped = truncated_count,
                        "Phase truncated by cap"
                    );
                }

                PrioritizedPhase {
                    phase,
                    recommendations,
                    total_count,
                    truncated_count,
                }
            })
            .collect()
    }
}

const fn bucket_index(priority: Priority) -> usize {
    match priority {
        Priority::Critical => 0,
        Priority::High => 1,
        Priority::Medium => 2,
        Priority::Low => 3,
    }
}
