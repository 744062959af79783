use anyhow::Result;
use async_trait::async_trait;

/// Identity of a target before its content is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub id: String,
    pub display_name: String,
}

impl TargetDescriptor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Result of a bounded read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetContent {
    Loaded(String),
    /// Content is larger than the cap and was not loaded. `size_bytes` is
    /// the known size, or at least `max_bytes + 1` when only a prefix was
    /// seen.
    Oversized { size_bytes: usize },
}

/// Port for the collaborator that supplies targets.
///
/// `list` defines catalog order; `read` may fail per target, which the
/// catalog records as an unavailable target rather than aborting.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Ordered listing of the targets to assess.
    async fn list(&self) -> Result<Vec<TargetDescriptor>>;

    /// Raw text content of one target, loading at most `max_bytes`.
    ///
    /// Implementations must not buffer more than `max_bytes + 1` bytes of a
    /// target before reporting it as oversized.
    async fn read(&self, id: &str, max_bytes: usize) -> Result<TargetContent>;
}
