//! Email channel: sends the submission through a Resend-compatible HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChannelOutcome, ContactSubmission, NotificationChannel};
use crate::config::EmailSettings;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

pub struct EmailChannel {
    base_url: String,
    settings: EmailSettings,
    client: Option<reqwest::Client>,
}

impl EmailChannel {
    /// Build the channel. A client that cannot be constructed leaves the
    /// channel unable to send; every send then reports a failure.
    pub fn new(settings: EmailSettings, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| tracing::error!("Failed to create email HTTP client: {e}"))
            .ok();

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            settings,
            client,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

/// Request body for POST /emails
#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    reply_to: &'a str,
    subject: String,
    text: String,
}

/// Response body from POST /emails
#[derive(Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn is_configured(&self) -> bool {
        self.settings.is_configured()
    }

    async fn send(&self, submission: &ContactSubmission) -> ChannelOutcome {
        let (Some(api_key), Some(from), Some(to)) = (
            self.settings.api_key.as_deref(),
            self.settings.from.as_deref(),
            self.settings.to.as_deref(),
        ) else {
            tracing::warn!("Email channel not configured, skipping");
            return ChannelOutcome::Skipped {
                reason: "email channel not configured".into(),
            };
        };

        let Some(client) = &self.client else {
            return ChannelOutcome::Failed {
                reason: "HTTP client unavailable".into(),
            };
        };

        let body = SendEmailRequest {
            from,
            to: [to],
            reply_to: &submission.email,
            subject: submission.subject(),
            text: submission.to_text(),
        };

        let response = match client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Email request failed");
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
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), detail = %detail, "Email API rejected message");
            return ChannelOutcome::Failed {
                reason: format!("rejected with status {}", status.as_u16()),
            };
        }

        match response.json::<SendEmailResponse>().await {
            Ok(parsed) => ChannelOutcome::Delivered { id: parsed.id },
            Err(e) => {
                tracing::error!(error = %e, "Email API response missing id");
                ChannelOutcome::Failed {
                    reason: "unexpected response".into(),
                }
            }
        }
    }
}
