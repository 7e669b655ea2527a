//! HTTP API for the site generator.
//!
//! Routes are nested under `/api/` and wrapped by CORS and access
//! logging. `api_router()` returns a `Router` that can be mounted on
//! any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_server_on, ServerError, ServerHandle, ServerSession};
pub use types::ApiContext;
