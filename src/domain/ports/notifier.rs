use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Delivery status of one notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationOutcome {
    pub const fn delivered() -> Self {
        Self {
            delivered: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            delivered: false,
            error: Some(error.into()),
        }
    }
}

/// Port for delivering the human summary to an external endpoint.
///
/// Implementations report failure through [`NotificationOutcome`] instead of
/// returning an error: a failed delivery never fails a run.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Deliver `text`.
    async fn send(&self, text: &str) -> NotificationOutcome;
}
