//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Access logger

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
///
/// `cors_origin` restricts browser callers to one origin; `None` allows any.
pub fn api_router(ctx: ApiContext, cors_origin: Option<&str>) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/generate", post(endpoints::generate::generate))
        .route("/contact", post(endpoints::contact::submit))
        .route("/leads/status", post(endpoints::leads::update_status))
        .with_state(ctx);

    Router::new()
        .nest("/api", routes)
        .layer(axum::middleware::from_fn(middleware::access::log_access))
        .layer(cors_layer(cors_origin))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    match origin.map(HeaderValue::from_str) {
        Some(Ok(origin)) => layer.allow_origin(origin),
        Some(Err(e)) => {
            tracing::warn!("Ignoring invalid CORS origin: {e}");
            layer.allow_origin(Any)
        }
        None => layer.allow_origin(Any),
    }
}
