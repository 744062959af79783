use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Duration;

use crate::domain::ports::{TargetContent, TargetDescriptor, TargetSource};

#[derive(Debug, Clone)]
struct Entry {
    id: String,
    content: Result<String, String>,
}

/// Targets held in memory. Used by tests and by callers that already have
/// content in hand.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTargetSource {
    entries: Vec<Entry>,
    read_delay: Option<Duration>,
    listing_error: Option<String>,
}

impl InMemoryTargetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, id: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.push(Entry {
            id: id.into(),
            content: Ok(content.into()),
        });
        self
    }

    /// A target that is listed but fails to read with `reason`.
    pub fn with_unreadable(mut self, id: impl Into<String>, reason: impl Into<String>) -> Self {
        self.entries.push(Entry {
            id: id.into(),
            content: Err(reason.into()),
        });
        self
    }

    /// Delay every read, to exercise load timeouts.
    pub const fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Make `list` fail.
    pub fn with_listing_error(mut self, reason: impl Into<String>) -> Self {
        self.listing_error = Some(reason.into());
        self
    }
}

#[async_trait]
impl TargetSource for InMemoryTargetSource {
    async fn list(&self) -> Result<Vec<TargetDescriptor>> {
        if let Some(reason) = &self.listing_error {
            return Err(anyhow!("{reason}"));
        }
        Ok(self
            .entries
            .iter()
            .map(|e| TargetDescriptor::new(e.id.clone(), e.id.clone()))
            .collect())
    }

    async fn read(&self, id: &str, max_bytes: usize) -> Result<TargetContent> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| anyhow!("unknown target: {id}"))?;
        let content = entry.content.as_ref().map_err(|reason| anyhow!("{reason}"))?;
        if content.len() > max_bytes {
            return Ok(TargetContent::Oversized {
                size_bytes: content.len(),
            });
        }
        Ok(TargetContent::Loaded(content.clone()))
    }
}
