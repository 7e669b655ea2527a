//! Lead status updates, forwarded to the spreadsheet webhook that owns the
//! lead list. Nothing is stored locally.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("rowId is required")]
    MissingRowId,

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Spreadsheet webhook is not configured")]
    NotConfigured,

    #[error("Spreadsheet webhook request failed: {0}")]
    Transport(String),

    #[error("Spreadsheet webhook returned {status}: {body}")]
    Upstream { status: u16, body: String },
}

/// Pipeline stage of a lead, as labelled in the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "&'static str")]
pub enum LeadStatus {
    New,
    Consulting,
    QuoteSubmitted,
    Contracted,
    InProgress,
    Completed,
    Cancelled,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 7] = [
        LeadStatus::New,
        LeadStatus::Consulting,
        LeadStatus::QuoteSubmitted,
        LeadStatus::Contracted,
        LeadStatus::InProgress,
        LeadStatus::Completed,
        LeadStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::New => "신규",
            LeadStatus::Consulting => "상담중",
            LeadStatus::QuoteSubmitted => "견적제출",
            LeadStatus::Contracted => "계약완료",
            LeadStatus::InProgress => "진행중",
            LeadStatus::Completed => "완료",
            LeadStatus::Cancelled => "취소",
        }
    }

    pub fn parse(label: &str) -> Result<Self, LeadError> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == label)
            .ok_or_else(|| LeadError::InvalidStatus(label.to_string()))
    }
}

impl From<LeadStatus> for &'static str {
    fn from(status: LeadStatus) -> Self {
        status.as_str()
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// Spreadsheet row, passed through as given (string or integer).
    pub row_id: Value,
    pub status: LeadStatus,
}

impl StatusUpdate {
    pub fn from_json(body: &Value) -> Result<Self, LeadError> {
        let row_id = match body.get("rowId") {
            Some(Value::String(s)) if !s.trim().is_empty() => Value::String(s.trim().to_string()),
            Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Value::Number(n.clone()),
            _ => return Err(LeadError::MissingRowId),
        };
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| LeadError::InvalidStatus(String::new()))
            .and_then(LeadStatus::parse)?;
        Ok(Self { row_id, status })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateStatusRequest<'a> {
    action: &'static str,
    row_id: &'a Value,
    status: LeadStatus,
}

/// Client for the spreadsheet webhook.
pub struct SheetsClient {
    webhook_url: String,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(webhook_url: &str, timeout: Duration) -> Result<Self, LeadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LeadError::Transport(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            webhook_url: webhook_url.to_string(),
            client,
        })
    }

    pub async fn update_status(&self, update: &StatusUpdate) -> Result<(), LeadError> {
        let body = UpdateStatusRequest {
            action: "updateStatus",
            row_id: &update.row_id,
            status: update.status,
        };

        let response = self
            .client
            .post(&self.webhook_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| LeadError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LeadError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(row_id = %update.row_id, status = %update.status, "Lead status forwarded");
        Ok(())
    }
}
