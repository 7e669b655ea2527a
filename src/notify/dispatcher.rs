use std::sync::Arc;
use std::time::Instant;

use super::{ChannelOutcome, ContactSubmission, NotificationChannel};

/// Fans one submission out to the email and messaging channels.
///
/// Both sends start together and the dispatcher waits for both; neither
/// channel's result can prevent the other from running.
pub struct NotificationDispatcher {
    email: Arc<dyn NotificationChannel>,
    messaging: Arc<dyn NotificationChannel>,
}

/// Outcome of one channel within a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReport {
    pub channel: &'static str,
    pub outcome: ChannelOutcome,
}

/// Aggregate outcome of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub email: ChannelReport,
    pub messaging: ChannelReport,
}

impl DispatchReport {
    /// True when no channel failed. Skipped channels count as success.
    pub fn is_success(&self) -> bool {
        !self.email.outcome.is_failure() && !self.messaging.outcome.is_failure()
    }

    pub fn email_id(&self) -> Option<&str> {
        self.email.outcome.id()
    }

    pub fn messaging_id(&self) -> Option<&str> {
        self.messaging.outcome.id()
    }

    /// `"<channel>: <reason>"` for each failed channel, joined with `"; "`.
    pub fn failure_summary(&self) -> String {
        [&self.email, &self.messaging]
            .into_iter()
            .filter_map(|report| match &report.outcome {
                ChannelOutcome::Failed { reason } => Some(format!("{}: {reason}", report.channel)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl NotificationDispatcher {
    pub fn new(
        email: Arc<dyn NotificationChannel>,
        messaging: Arc<dyn NotificationChannel>,
    ) -> Self {
        Self { email, messaging }
    }

    /// (email, messaging) configuration flags, for health reporting.
    pub fn configured(&self) -> (bool, bool) {
        (self.email.is_configured(), self.messaging.is_configured())
    }

    pub async fn dispatch(&self, submission: &ContactSubmission) -> DispatchReport {
        let started = Instant::now();

        let (email, messaging) = tokio::join!(
            self.email.send(submission),
            self.messaging.send(submission)
        );

        let report = DispatchReport {
            email: ChannelReport {
                channel: self.email.name(),
                outcome: email,
            },
            messaging: ChannelReport {
                channel: self.messaging.name(),
                outcome: messaging,
            },
        };

        if report.is_success() {
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                email_id = report.email_id().unwrap_or_default(),
                messaging_id = report.messaging_id().unwrap_or_default(),
                "Contact notification dispatched"
            );
        } else {
            tracing::warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                failures = %report.failure_summary(),
                "Contact notification partially failed"
            );
        }

        report
    }
}
