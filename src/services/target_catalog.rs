//! Target catalog.
//!
//! Lists targets from a [`TargetSource`], loads each one under a timeout and
//! size cap, and keeps the loaded content in memory for the rest of the run.
//! A target that cannot be read stays in the catalog as unavailable so the
//! runner can record a skip for every persona.

use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{CatalogConfig, Target};
use crate::domain::ports::{TargetContent, TargetDescriptor, TargetSource};

/// Concurrent reads while building the catalog.
const LOAD_CONCURRENCY: usize = 8;

/// Limits applied while loading targets.
#[derive(Debug, Clone, Copy)]
pub struct CatalogLimits {
    pub max_target_bytes: usize,
    pub load_timeout: Duration,
}

impl Default for CatalogLimits {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for CatalogLimits {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            max_target_bytes: config.max_target_bytes,
            load_timeout: Duration::from_millis(config.load_timeout_ms),
        }
    }
}

/// One listed target and what happened when it was loaded.
#[derive(Debug, Clone)]
pub enum CatalogEntry {
    Available(Arc<Target>),
    Oversized {
        descriptor: TargetDescriptor,
        size_bytes: usize,
        limit: usize,
    },
    Unavailable {
        descriptor: TargetDescriptor,
        reason: String,
    },
}

impl CatalogEntry {
    pub fn id(&self) -> &str {
        match self {
            Self::Available(target) => &target.id,
            Self::Oversized { descriptor, .. } | Self::Unavailable { descriptor, .. } => {
                &descriptor.id
            }
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Available(target) => &target.display_name,
            Self::Oversized { descriptor, .. } | Self::Unavailable { descriptor, .. } => {
                &descriptor.display_name
            }
        }
    }

    pub const fn target(&self) -> Option<&Arc<Target>> {
        match self {
            Self::Available(target) => Some(target),
            _ => None,
        }
    }
}

/// Ordered, run-scoped set of targets.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    entries: Vec<CatalogEntry>,
}

impl TargetCatalog {
    /// List and load every target from `source`.
    ///
    /// Fails with `EmptyCatalog` when the source lists nothing and with
    /// `CatalogUnavailable` when the listing itself fails. Individual read
    /// failures, timeouts, and oversized content are kept as entries.
    #[instrument(skip(source, limits), fields(max_bytes = limits.max_target_bytes))]
    pub async fn build(
        source: &dyn TargetSource,
        limits: &CatalogLimits,
    ) -> AssessmentResult<Self> {
        let listed = source
            .list()
            .await
            .map_err(|e| AssessmentError::CatalogUnavailable(format!("{e:#}")))?;

        let mut seen = HashSet::new();
        let descriptors: Vec<TargetDescriptor> = listed
            .into_iter()
            .filter(|d| {
                let fresh = seen.insert(d.id.clone());
                if !fresh {
                    warn!(target_id = %d.id, "Duplicate target id in listing, keeping first");
                }
                fresh
            })
            .collect();

        if descriptors.is_empty() {
            return Err(AssessmentError::EmptyCatalog);
        }

        let entries: Vec<CatalogEntry> = stream::iter(descriptors)
            .map(|descriptor| load_entry(source, descriptor, *limits))
            .buffered(LOAD_CONCURRENCY)
            .collect()
            .await;

        let catalog = Self { entries };
        info!(
            total = catalog.len(),
            available = catalog.available_count(),
            "Target catalog built"
        );
        Ok(catalog)
    }

    /// Build a catalog from already-resolved entries.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> AssessmentResult<Self> {
        if entries.is_empty() {
            return Err(AssessmentError::EmptyCatalog);
        }
        Ok(Self { entries })
    }

    /// Build a catalog of in-memory targets.
    pub fn from_targets(targets: Vec<Target>) -> AssessmentResult<Self> {
        Self::from_entries(
            targets
                .into_iter()
                .map(|t| CatalogEntry::Available(Arc::new(t)))
                .collect(),
        )
    }

    /// Entries in catalog order, including unavailable ones.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Loaded targets in catalog order.
    pub fn list_targets(&self) -> Vec<Arc<Target>> {
        self.entries
            .iter()
            .filter_map(|e| e.target().cloned())
            .collect()
    }

    /// Cached content for `target_id`.
    pub fn load(&self, target_id: &str) -> AssessmentResult<Arc<Target>> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id() == target_id)
            .ok_or_else(|| AssessmentError::TargetUnavailable {
                target_id: target_id.to_string(),
                reason: "not in catalog".to_string(),
            })?;

        match entry {
            CatalogEntry::Available(target) => Ok(Arc::clone(target)),
            CatalogEntry::Oversized {
                size_bytes, limit, ..
            } => Err(AssessmentError::TargetUnavailable {
                target_id: target_id.to_string(),
                reason: format!("content of {size_bytes} bytes exceeds limit of {limit}"),
            }),
            CatalogEntry::Unavailable { reason, .. } => Err(AssessmentError::TargetUnavailable {
                target_id: target_id.to_string(),
                reason: reason.clone(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.target().is_some()).count()
    }
}

async fn load_entry(
    source: &dyn TargetSource,
    descriptor: TargetDescriptor,
    limits: CatalogLimits,
) -> CatalogEntry {
    let read = source.read(&descriptor.id, limits.max_target_bytes);
    match tokio::time::timeout(limits.load_timeout, read).await {
        Ok(Ok(TargetContent::Oversized { size_bytes })) => {
            warn!(
                target_id = %descriptor.id,
                size_bytes,
                limit = limits.max_target_bytes,
                "Target exceeds size limit"
            );
            CatalogEntry::Oversized {
                size_bytes,
                limit: limits.max_target_bytes,
                descriptor,
            }
        }
        Ok(Ok(TargetContent::Loaded(content))) if content.len() > limits.max_target_bytes => {
            warn!(
                target_id = %descriptor.id,
                size_bytes = content.len(),
                limit = limits.max_target_bytes,
                "Source ignored the size limit"
            );
            CatalogEntry::Oversized {
                size_bytes: content.len(),
                limit: limits.max_target_bytes,
                descriptor,
            }
        }
        Ok(Ok(TargetContent::Loaded(content))) => {
            debug!(target_id = %descriptor.id, size_bytes = content.len(), "Target loaded");
            CatalogEntry::Available(Arc::new(Target::new(
                descriptor.id,
                descriptor.display_name,
                content,
            )))
        }
        Ok(Err(e)) => {
            warn!(target_id = %descriptor.id, error = %e, "Target could not be read");
            CatalogEntry::Unavailable {
                descriptor,
                reason: format!("{e:#}"),
            }
        }
        Err(_) => {
            warn!(
                target_id = %descriptor.id,
                timeout_ms = limits.load_timeout.as_millis(),
                "Target load timed out"
            );
            CatalogEntry::Unavailable {
                reason: format!("load timed out after {}ms", limits.load_timeout.as_millis()),
                descriptor,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sources::InMemoryTargetSource;

    fn limits(max_target_bytes: usize) -> CatalogLimits {
        CatalogLimits {
            max_target_bytes,
            load_timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn test_build_preserves_listing_order() {
        let source = InMemoryTargetSource::new()
            .with_target("b.rs", "fn b() {}")
            .with_target("a.rs", "fn a() {}");

        let catalog = TargetCatalog::build(&source, &limits(1024)).await.unwrap();
        let ids: Vec<_> = catalog.entries().iter().map(CatalogEntry::id).collect();
        assert_eq!(ids, vec!["b.rs", "a.rs"]);
        assert_eq!(catalog.available_count(), 2);
        assert_eq!(catalog.load("a.rs").unwrap().raw_content, "fn a() {}");
    }

    #[tokio::test]
    async fn test_empty_listing_is_empty_catalog() {
        let source = InMemoryTargetSource::new();
        let err = TargetCatalog::build(&source, &limits(1024)).await.unwrap_err();
        assert!(matches!(err, AssessmentError::EmptyCatalog));
    }

    #[tokio::test]
    async fn test_unreadable_target_is_kept_as_unavailable() {
        let source = InMemoryTargetSource::new()
            .with_target("ok.rs", "ok")
            .with_unreadable("gone.rs", "permission denied");

        let catalog = TargetCatalog::build(&source, &limits(1024)).await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.available_count(), 1);
        match catalog.load("gone.rs").unwrap_err() {
            AssessmentError::TargetUnavailable { target_id, reason } => {
                assert_eq!(target_id, "gone.rs");
                assert!(reason.contains("permission denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_oversized_target() {
        let source = InMemoryTargetSource::new().with_target("big.rs", "x".repeat(100));
        let catalog = TargetCatalog::build(&source, &limits(10)).await.unwrap();
        assert!(matches!(
            catalog.entries()[0],
            CatalogEntry::Oversized {
                size_bytes: 100,
                limit: 10,
                ..
            }
        ));
        assert!(catalog.list_targets().is_empty());
    }

    #[tokio::test]
    async fn test_slow_target_times_out() {
        let source = InMemoryTargetSource::new()
            .with_target("slow.rs", "slow")
            .with_read_delay(Duration::from_millis(200));
        let limits = CatalogLimits {
            max_target_bytes: 1024,
            load_timeout: Duration::from_millis(20),
        };

        let catalog = TargetCatalog::build(&source, &limits).await.unwrap();
        match &catalog.entries()[0] {
            CatalogEntry::Unavailable { reason, .. } => assert!(reason.contains("timed out")),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_duplicate_ids_keep_first() {
        let source = InMemoryTargetSource::new()
            .with_target("a.rs", "first")
            .with_target("a.rs", "second");
        let catalog = TargetCatalog::build(&source, &limits(1024)).await.unwrap();
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_missing_id() {
        let catalog = TargetCatalog::from_targets(vec![Target::new("a", "a", "x")]).unwrap();
        assert!(catalog.load("b").is_err());
        assert!(TargetCatalog::from_targets(vec![]).is_err());
    }
}
