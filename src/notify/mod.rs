//! Contact-form notifications.
//!
//! A submission is fanned out to two independent channels (email and a chat
//! webhook). Channels report a `ChannelOutcome` instead of returning errors,
//! so one broken channel can never stop the other from being attempted.

pub mod dispatcher;
pub mod email;
pub mod messaging;

pub use dispatcher::*;
pub use email::*;
pub use messaging::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Wire id reported for a channel that was skipped.
pub const SKIPPED_ID: &str = "skipped";

/// One contact-form submission. Discarded after dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub phone_country: String,
    #[serde(default)]
    pub package: String,
    pub message: String,
}

impl ContactSubmission {
    /// Build a submission from an untrusted JSON body.
    ///
    /// `name`, `email`, `phone` and `message` must be non-blank strings.
    /// `phoneCountry` and `package` pass through when they are strings.
    /// On failure, returns the names of the missing or invalid fields.
    pub fn from_json(body: &Value) -> Result<Self, Vec<&'static str>> {
        let required = |key: &'static str, missing: &mut Vec<&'static str>| {
            match body.get(key).and_then(Value::as_str).map(str::trim) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    missing.push(key);
                    String::new()
                }
            }
        };
        let optional = |key: &str| {
            body.get(key)
                .and_then(Value::as_str)
                .map(|v| v.trim().to_string())
                .unwrap_or_default()
        };

        let mut missing = Vec::new();
        let submission = Self {
            name: required("name", &mut missing),
            email: required("email", &mut missing),
            phone: required("phone", &mut missing),
            phone_country: optional("phoneCountry"),
            package: optional("package"),
            message: required("message", &mut missing),
        };

        if missing.is_empty() {
            Ok(submission)
        } else {
            Err(missing)
        }
    }

    pub fn subject(&self) -> String {
        if self.package.is_empty() {
            format!("New inquiry from {}", self.name)
        } else {
            format!("New inquiry from {} ({})", self.name, self.package)
        }
    }

    /// Plain-text rendering shared by every channel.
    pub fn to_text(&self) -> String {
        let phone = if self.phone_country.is_empty() {
            self.phone.clone()
        } else {
            format!("{} {}", self.phone_country, self.phone)
        };
        let package = if self.package.is_empty() {
            "-"
        } else {
            self.package.as_str()
        };
        format!(
            "Name: {}\nEmail: {}\nPhone: {}\nPackage: {}\n\n{}",
            self.name, self.email, phone, package, self.message
        )
    }
}

/// Result of one channel send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// Accepted by the channel, with the id it assigned.
    Delivered { id: String },
    /// Not attempted because the channel is not configured.
    Skipped { reason: String },
    /// Attempted and failed.
    Failed { reason: String },
}

impl ChannelOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ChannelOutcome::Failed { .. })
    }

    /// Identifier reported to the caller. Skipped channels report `SKIPPED_ID`.
    pub fn id(&self) -> Option<&str> {
        match self {
            ChannelOutcome::Delivered { id } => Some(id.as_str()),
            ChannelOutcome::Skipped { .. } => Some(SKIPPED_ID),
            ChannelOutcome::Failed { .. } => None,
        }
    }
}

/// An outbound notification integration.
///
/// Implementations must not panic and have no error path: every problem is
/// reported through the returned `ChannelOutcome`.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    async fn send(&self, submission: &ContactSubmission) -> ChannelOutcome;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Channel with a fixed outcome that counts sends.
    pub struct RecordingChannel {
        name: &'static str,
        outcome: ChannelOutcome,
        delay: Duration,
        sends: AtomicUsize,
    }

    impl RecordingChannel {
        pub fn new(name: &'static str, outcome: ChannelOutcome) -> Self {
            Self {
                name,
                outcome,
                delay: Duration::ZERO,
                sends: AtomicUsize::new(0),
            }
        }

        pub fn delivered(name: &'static str, id: &str) -> Self {
            Self::new(name, ChannelOutcome::Delivered { id: id.into() })
        }

        pub fn failed(name: &'static str, reason: &str) -> Self {
            Self::new(name, ChannelOutcome::Failed { reason: reason.into() })
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn sends(&self) -> usize {
            self.sends.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self) -> bool {
            !matches!(self.outcome, ChannelOutcome::Skipped { .. })
        }

        async fn send(&self, _submission: &ContactSubmission) -> ChannelOutcome {
            self.sends.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.outcome.clone()
        }
    }

    pub fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Kim Minji".into(),
            email: "minji@example.com".into(),
            phone: "010-1234-5678".into(),
            phone_country: "+82".into(),
            package: "standard".into(),
            message: "We need a landing page for our cafe.".into(),
        }
    }
}
