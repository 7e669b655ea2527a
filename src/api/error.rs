//! API error types rendered as the uniform `{ success: false, error, message }`
//! failure body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::leads::LeadError;

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub message: &'static str,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Client input rejected. `error` is shown to the caller as-is.
    #[error("Invalid request: {error}")]
    BadRequest { error: String, message: &'static str },

    /// A downstream integration failed. `error` is already safe to display.
    #[error("Upstream failure: {error}")]
    Upstream { error: String, message: &'static str },

    #[error("Service unavailable: {0}")]
    Unavailable(&'static str),
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>, message: &'static str) -> Self {
        ApiError::BadRequest {
            error: error.into(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::BadRequest { error, message } => (StatusCode::BAD_REQUEST, error, message),
            ApiError::Upstream { error, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error, message)
            }
            ApiError::Unavailable(what) => (
                StatusCode::SERVICE_UNAVAILABLE,
                format!("{what} is not configured"),
                "Service unavailable",
            ),
        };

        let body = ErrorBody {
            success: false,
            error,
            message,
        };
        (status, Json(body)).into_response()
    }
}

pub const LEAD_VALIDATION_MESSAGE: &str = "Invalid status update";
pub const LEAD_FAILURE_MESSAGE: &str = "Failed to update lead status";

impl From<LeadError> for ApiError {
    fn from(err: LeadError) -> Self {
        match err {
            LeadError::MissingRowId | LeadError::InvalidStatus(_) => {
                ApiError::bad_request(err.to_string(), LEAD_VALIDATION_MESSAGE)
            }
            LeadError::NotConfigured => ApiError::Unavailable("Spreadsheet webhook"),
            LeadError::Transport(_) | LeadError::Upstream { .. } => {
                tracing::error!(error = %err, "Lead status forward failed");
                ApiError::Upstream {
                    error: "Spreadsheet update failed".into(),
                    message: LEAD_FAILURE_MESSAGE,
                }
            }
        }
    }
}
