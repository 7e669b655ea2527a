//! `GET /api/health`: liveness and integration status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub channels: ChannelStatus,
}

#[derive(Serialize)]
pub struct ChannelStatus {
    pub email: &'static str,
    pub messaging: &'static str,
}

fn label(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "unconfigured"
    }
}

pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let (email, messaging) = ctx.dispatcher.configured();

    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.generator.model_name().to_string(),
        channels: ChannelStatus {
            email: label(email),
            messaging: label(messaging),
        },
    })
}
