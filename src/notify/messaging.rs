//! Messaging channel: posts the submission to an incoming-webhook URL
//! (Slack-compatible `{ "text": ... }` payload).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ChannelOutcome, ContactSubmission, NotificationChannel};

pub struct MessagingChannel {
    webhook_url: Option<String>,
    client: Option<reqwest::Client>,
}

impl MessagingChannel {
    pub fn new(webhook_url: Option<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| tracing::error!("Failed to create messaging HTTP client: {e}"))
            .ok();

        Self {
            webhook_url,
            client,
        }
    }
}

/// Pick the message id out of a webhook response body.
///
/// Incoming webhooks usually answer with plain `ok`, in which case a local
/// id is generated so the caller can still correlate the send.
fn message_id(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["ts", "id"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[async_trait]
impl NotificationChannel for MessagingChannel {
    fn name(&self) -> &'static str {
        "messaging"
    }

    fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    async fn send(&self, submission: &ContactSubmission) -> ChannelOutcome {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::warn!("Messaging webhook not configured, skipping");
            return ChannelOutcome::Skipped {
                reason: "messaging webhook not configured".into(),
            };
        };

        let Some(client) = &self.client else {
            return ChannelOutcome::Failed {
                reason: "HTTP client unavailable".into(),
            };
        };

        let text = format!("*{}*\n{}", submission.subject(), submission.to_text());

        let response = match client.post(url).json(&json!({ "text": text })).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Messaging webhook request failed");
                let reason = if e.is_timeout() {
                    "request timed out"
                } else {
                    "request failed"
                };
                return ChannelOutcome::Failed {
                    reason: reason.into(),
                };
            }
        };

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), detail = %body, "Messaging webhook rejected message");
            return ChannelOutcome::Failed {
                reason: format!("rejected with status {}", status.as_u16()),
            };
        }

        ChannelOutcome::Delivered {
            id: message_id(&body),
        }
    }
}
