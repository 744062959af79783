//! Notifier implementations.

pub mod webhook;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{NotifierConfig, NotifierKind};
use crate::domain::ports::{NotificationOutcome, Notifier};

pub use webhook::WebhookNotifier;

/// Emits the summary through tracing instead of an external endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> NotificationOutcome {
        info!(summary = %text, "Assessment summary");
        NotificationOutcome::delivered()
    }
}

/// Drops the summary. Counts as delivered: there was nowhere to deliver to.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

#[async_trait]
impl Notifier for DisabledNotifier {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn send(&self, text: &str) -> NotificationOutcome {
        debug!(chars = text.chars().count(), "Notifications disabled, summary dropped");
        NotificationOutcome::delivered()
    }
}

/// Build the notifier described by `config`.
pub fn build_notifier(config: &NotifierConfig) -> AssessmentResult<Arc<dyn Notifier>> {
    Ok(match config.kind {
        NotifierKind::Disabled => Arc::new(DisabledNotifier),
        NotifierKind::Log => Arc::new(LogNotifier),
        NotifierKind::Webhook => {
            let url = config
                .url
                .as_deref()
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| {
                    AssessmentError::InvalidConfig(
                        "webhook notifier requires notifier.url".to_string(),
                    )
                })?;
            Arc::new(WebhookNotifier::new(url, Duration::from_millis(config.timeout_ms))?)
        }
    })
}
