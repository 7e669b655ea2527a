//! `POST /api/leads/status`: forward a lead status change to the spreadsheet.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::api::error::{ApiError, LEAD_VALIDATION_MESSAGE};
use crate::api::types::ApiContext;
use crate::leads::{LeadError, StatusUpdate};

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

pub async fn update_status(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(body) = payload
        .map_err(|_| ApiError::bad_request("Invalid JSON body", LEAD_VALIDATION_MESSAGE))?;

    let update = StatusUpdate::from_json(&body)?;
    let sheets = ctx.sheets.as_ref().ok_or(LeadError::NotConfigured)?;
    sheets.update_status(&update).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: format!("Status updated to {}", update.status),
    }))
}
