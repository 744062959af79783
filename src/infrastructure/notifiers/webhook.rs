use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::ports::{NotificationOutcome, Notifier};
use crate::infrastructure::logging::redact_url;

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// Posts `{"text": summary}` to a chat-style incoming webhook.
///
/// The endpoint URL usually embeds a credential, so only its redacted form
/// is ever logged.
pub struct WebhookNotifier {
    http_client: ReqwestClient,
    url: String,
    display_url: String,
}

impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &self.display_url)
            .finish_non_exhaustive()
    }
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> AssessmentResult<Self> {
        let url = url.into();
        let http_client = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AssessmentError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            display_url: redact_url(&url),
            url,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip_all, fields(endpoint = %self.display_url))]
    async fn send(&self, text: &str) -> NotificationOutcome {
        let response = match self
            .http_client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors can carry the full URL
                let reason = if e.is_timeout() {
                    "request timed out".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    "request failed".to_string()
                };
                warn!(reason = %reason, "Webhook delivery failed");
                return NotificationOutcome::failed(reason);
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "Webhook accepted summary");
            NotificationOutcome::delivered()
        } else {
            warn!(status = status.as_u16(), "Webhook rejected summary");
            NotificationOutcome::failed(format!("endpoint returned HTTP {status}"))
        }
    }
}
