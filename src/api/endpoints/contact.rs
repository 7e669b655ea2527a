//! `POST /api/contact`: fan an inquiry out to the notification channels.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::notify::ContactSubmission;

pub const CONTACT_VALIDATION_MESSAGE: &str = "Please fill in all required fields";
pub const CONTACT_SUCCESS_MESSAGE: &str = "Inquiry sent successfully";
pub const CONTACT_FAILURE_MESSAGE: &str = "Failed to send inquiry";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactResponse {
    pub success: bool,
    pub message: &'static str,
    pub email_id: String,
    pub messaging_id: String,
}

pub async fn submit(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ContactResponse>, ApiError> {
    let Json(body) = payload.map_err(|_| {
        ApiError::bad_request("Invalid JSON body", CONTACT_VALIDATION_MESSAGE)
    })?;

    let submission = ContactSubmission::from_json(&body).map_err(|missing| {
        ApiError::bad_request(
            format!("Missing required fields: {}", missing.join(", ")),
            CONTACT_VALIDATION_MESSAGE,
        )
    })?;

    let report = ctx.dispatcher.dispatch(&submission).await;
    if !report.is_success() {
        return Err(ApiError::Upstream {
            error: report.failure_summary(),
            message: CONTACT_FAILURE_MESSAGE,
        });
    }

    Ok(Json(ContactResponse {
        success: true,
        message: CONTACT_SUCCESS_MESSAGE,
        email_id: report.email_id().unwrap_or_default().to_string(),
        messaging_id: report.messaging_id().unwrap_or_default().to_string(),
    }))
}
