//! API middleware.
//!
//! Execution order (outermost → innermost):
//! 1. CORS (tower-http)
//! 2. Access logger: request id, method, path, status, latency

pub mod access;
