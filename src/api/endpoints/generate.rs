//! `POST /api/generate`: turn a free-text request into a site specification.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::generation::{FailureStage, GenerationEnvelope, FAILURE_MESSAGE};

/// Body must be JSON with a non-blank string `userPrompt`; `templateSlug`
/// is optional. Bad input never reaches the model.
pub async fn generate(
    State(ctx): State<ApiContext>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerationEnvelope>), ApiError> {
    let Json(body) = payload
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e.body_text()), FAILURE_MESSAGE))?;

    let user_prompt = match body.get("userPrompt") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.as_str(),
        Some(Value::String(_)) | None | Some(Value::Null) => {
            return Err(ApiError::bad_request("userPrompt is required", FAILURE_MESSAGE))
        }
        Some(_) => {
            return Err(ApiError::bad_request("userPrompt must be a string", FAILURE_MESSAGE))
        }
    };
    let template_slug = body.get("templateSlug").and_then(Value::as_str);

    let envelope = ctx.generator.run(user_prompt, template_slug).await;
    let status = match envelope.stage {
        None => StatusCode::OK,
        Some(FailureStage::Input) => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(envelope)))
}
